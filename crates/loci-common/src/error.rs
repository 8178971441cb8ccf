/// Errors surfaced by page backends and the scanner protocol.
#[derive(thiserror::Error, Debug, Clone)]
pub enum BackendError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Timeout: {operation}")]
    TimeoutWithContext { operation: String },

    #[error("Scanner execution failed: {0}")]
    Scanner(String),

    #[error("Not ready")]
    NotReady,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

impl BackendError {
    /// Scanner protocol error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Navigation(_) => "NAVIGATION_ERROR",
            BackendError::SelectorInvalid { .. } => "SELECTOR_INVALID",
            BackendError::ScriptError(_) => "SCRIPT_ERROR",
            BackendError::TimeoutWithContext { .. } => "TIMEOUT",
            BackendError::Scanner(_) => "SCANNER_ERROR",
            BackendError::NotReady => "NOT_READY",
            BackendError::Io(_) => "IO_ERROR",
            BackendError::Serialization(_) => "SERIALIZATION_ERROR",
            BackendError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Rebuild an error from a scanner `error` response.
    pub fn from_scanner(code: &str, message: &str) -> Self {
        match code {
            "SELECTOR_INVALID" => BackendError::SelectorInvalid {
                selector: message.to_string(),
            },
            "SCRIPT_ERROR" => BackendError::ScriptError(message.to_string()),
            "TIMEOUT" => BackendError::TimeoutWithContext {
                operation: message.to_string(),
            },
            "NOT_READY" => BackendError::NotReady,
            _ => BackendError::Scanner(format!("{}: {}", code, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_codes_map_back_to_variants() {
        let err = BackendError::from_scanner("SELECTOR_INVALID", "css=[");
        assert!(matches!(&err, BackendError::SelectorInvalid { selector } if selector == "css=["));
        assert_eq!(err.code(), "SELECTOR_INVALID");

        let err = BackendError::from_scanner("UNKNOWN_COMMAND", "Unknown action: scan");
        assert_eq!(err.code(), "SCANNER_ERROR");
        assert_eq!(
            err.to_string(),
            "Scanner execution failed: UNKNOWN_COMMAND: Unknown action: scan"
        );
    }
}
