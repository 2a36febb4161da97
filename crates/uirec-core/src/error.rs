//! Structured errors for machine consumers

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{code:?}] {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    WidgetNotFound,
    InvalidEvent,
    Storage,
    Config,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn widget_not_found(widget: &str) -> Self {
        Self::new(
            ErrorCode::WidgetNotFound,
            format!("Widget not found: {}", widget),
        )
    }

    pub fn invalid_event(reason: &str) -> Self {
        Self::new(ErrorCode::InvalidEvent, format!("Invalid event: {}", reason))
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Storage, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::storage(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_event(&e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code() {
        let e = Error::widget_not_found("WidgetId(3)");
        assert_eq!(e.to_string(), "[WidgetNotFound] Widget not found: WidgetId(3)");
    }

    #[test]
    fn serializes_code_in_screaming_case() {
        let e = Error::config("bad capacity").with_context(serde_json::json!({ "capacity": 0 }));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["code"], "CONFIG");
        assert_eq!(json["context"]["capacity"], 0);
    }
}
