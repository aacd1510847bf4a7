use super::*;

#[test]
fn test_request_serialization_skips_empty_fields() {
    let req = CdpRequest {
        id: 7,
        method: "Page.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json, serde_json::json!({"id": 7, "method": "Page.enable"}));
}

#[test]
fn test_request_session_id_renamed() {
    let req = CdpRequest {
        id: 1,
        method: "Runtime.evaluate".to_string(),
        params: Some(serde_json::json!({"expression": "1"})),
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["sessionId"], "S1");
}

#[test]
fn test_message_response_and_event() {
    let resp: CdpMessage =
        serde_json::from_str(r#"{"id": 3, "result": {"frameId": "F"}}"#).unwrap();
    assert_eq!(resp.id, Some(3));
    assert!(resp.method.is_none());

    let event: CdpMessage = serde_json::from_str(
        r#"{"method": "Network.loadingFinished", "params": {"requestId": "R1"}, "sessionId": "S"}"#,
    )
    .unwrap();
    assert!(event.id.is_none());
    assert_eq!(event.session_id.as_deref(), Some("S"));
}

#[test]
fn test_dialog_opening_event() {
    let event: DialogOpeningEvent = serde_json::from_value(serde_json::json!({
        "url": "https://example.com",
        "message": "Are you sure?",
        "type": "confirm",
        "hasBrowserHandler": false,
        "defaultPrompt": ""
    }))
    .unwrap();
    assert_eq!(event.dialog_type, "confirm");
    assert_eq!(event.message, "Are you sure?");
}

#[test]
fn test_evaluate_response_value() {
    let resp: EvaluateResponse = serde_json::from_value(serde_json::json!({
        "result": {"type": "object", "value": {"ok": true}}
    }))
    .unwrap();
    assert!(resp.exception_details.is_none());
    assert_eq!(resp.result.value["ok"], true);
}

#[test]
fn test_evaluate_response_exception_message() {
    let resp: EvaluateResponse = serde_json::from_value(serde_json::json!({
        "result": {"type": "object"},
        "exceptionDetails": {
            "text": "Uncaught",
            "exception": {"description": "TypeError: x is undefined"}
        }
    }))
    .unwrap();
    let details = resp.exception_details.unwrap();
    assert_eq!(details.message(), "TypeError: x is undefined");
}

#[test]
fn test_browser_version_pascal_case() {
    let version: BrowserVersion = serde_json::from_value(serde_json::json!({
        "Browser": "Chrome/126.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla",
        "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/abc"
    }))
    .unwrap();
    assert_eq!(version.protocol_version, "1.3");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}
