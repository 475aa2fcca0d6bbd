use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;

/// Body of `POST /chat`. `message` may be missing, `null` or of the wrong type;
/// the latter is answered in the response text rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    pub message: Option<Value>,
}

impl ChatRequest {
    /// The message text, with missing and `null` treated as empty.
    ///
    /// Returns a description of the offending type when `message` is not a string.
    pub fn message_text(&self) -> Result<&str, String> {
        match &self.message {
            None | Some(Value::Null) => Ok(""),
            Some(Value::String(text)) => Ok(text),
            Some(other) => Err(format!(
                "message must be a string, got {}",
                json_type_name(other)
            )),
        }
    }
}

impl TryFrom<Value> for ChatRequest {
    type Error = AppError;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        match body {
            Value::Object(mut fields) => Ok(ChatRequest {
                message: fields.remove("message"),
            }),
            other => Err(AppError::BadRequest(anyhow::anyhow!(
                "Request body must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Response envelope returned for every chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
