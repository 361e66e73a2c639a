use serde::Deserialize;
use serde_json::Value;

/// Error body returned by the service on non-success responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Extracts a human readable message from a non-success response body.
///
/// An `error` string field wins. Any other JSON is echoed back compactly, and a
/// body that is not JSON at all is returned trimmed as-is.
pub fn describe_error_body(raw: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return raw.trim().to_string();
    };

    if let Ok(ErrorBody { error: Some(error) }) = ErrorBody::deserialize(&value) {
        return error;
    }

    value.to_string()
}
