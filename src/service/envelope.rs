//! JSON response envelope shared by every service endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ServiceError, ServiceResult};

/// `{success, message?, data?, error?}` as returned by the services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// Successful envelope carrying `data`
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    /// Failed envelope carrying an error text
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Payload of a successful envelope, or the rejection it describes.
    ///
    /// `status` is the HTTP status the envelope arrived with; a non-2xx
    /// status is a rejection even if the body claims success.
    pub fn into_data(self, status: Option<u16>) -> ServiceResult<Option<Value>> {
        let http_ok = status.is_none_or(|s| (200..300).contains(&s));
        if self.success && http_ok {
            Ok(self.data)
        } else {
            Err(ServiceError::Rejected {
                status,
                message: self.error.filter(|e| !e.trim().is_empty()),
            })
        }
    }
}

/// Decode an optional payload into `T`, treating a missing payload as empty.
///
/// The services omit `data` entirely when a result list is empty.
pub fn decode_or_default<T>(data: Option<Value>) -> ServiceResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match data {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

/// Number of records reported by a transfer response.
///
/// Accepts a row array (its length) or an object with `rows_imported`;
/// anything else counts as zero.
pub fn record_count(data: Option<&Value>) -> usize {
    match data {
        Some(Value::Array(rows)) => rows.len(),
        Some(Value::Object(map)) => map
            .get("rows_imported")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(0),
        _ => 0,
    }
}
