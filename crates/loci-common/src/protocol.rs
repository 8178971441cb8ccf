//! Wire protocol spoken with the in-page scanner.

use crate::snapshot::ElementSnapshot;
use serde::{Deserialize, Serialize};

/// Actions executed by the in-page scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScannerAction {
    Capture(CaptureRequest),
    Count(CountRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CaptureRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountRequest {
    pub selector: String,
}

/// Responses received from the scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScannerProtocolResponse {
    Ok {
        #[serde(flatten)]
        data: Box<ScannerData>,
        #[serde(default)]
        warnings: Vec<String>,
    },
    Error {
        code: String,
        message: String,
        #[serde(default)]
        details: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScannerData {
    Capture(CaptureResult),
    Count(CountResult),
    Value(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureResult {
    pub elements: Vec<ElementSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResult {
    pub count: usize,
}

impl ScannerProtocolResponse {
    pub fn ok(data: ScannerData) -> Self {
        ScannerProtocolResponse::Ok {
            data: Box::new(data),
            warnings: vec![],
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ScannerProtocolResponse::Error {
            code: code.into(),
            message: message.into(),
            details: None,
            hint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_action_serializes_with_tag() {
        let action = ScannerAction::Count(CountRequest {
            selector: "css=#login".into(),
        });
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["action"], "count");
        assert_eq!(value["selector"], "css=#login");
    }

    #[test]
    fn count_response_parses() {
        let resp: ScannerProtocolResponse =
            serde_json::from_str(r#"{"status": "ok", "count": 3}"#).unwrap();
        match resp {
            ScannerProtocolResponse::Ok { data, .. } => {
                assert!(matches!(*data, ScannerData::Count(CountResult { count: 3 })))
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn capture_response_parses_elements() {
        let resp: ScannerProtocolResponse = serde_json::from_str(
            r#"{"status": "ok", "elements": [
                {"tag": "input", "type": "email", "attrs": [["name", "email"]],
                 "ancestors": [{"depth": 0, "text": "Sign in", "tag": "form", "classes": ["login"]}]}
            ]}"#,
        )
        .unwrap();
        let ScannerProtocolResponse::Ok { data, .. } = resp else {
            panic!("expected ok");
        };
        let ScannerData::Capture(result) = *data else {
            panic!("expected capture data");
        };
        assert_eq!(result.elements.len(), 1);
        assert_eq!(result.elements[0].attr("name"), Some("email"));
        assert_eq!(result.elements[0].ancestors[0].classes, vec!["login"]);
    }

    #[test]
    fn error_response_parses() {
        let resp: ScannerProtocolResponse = serde_json::from_str(
            r#"{"status": "error", "code": "SELECTOR_INVALID", "message": "bad selector"}"#,
        )
        .unwrap();
        assert!(matches!(resp, ScannerProtocolResponse::Error { ref code, .. } if code == "SELECTOR_INVALID"));
    }
}
