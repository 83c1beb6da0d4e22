use conduit_backend::testing::MockBackend;
use conduit_backend::{BackendResponse, BrowserCall, Coordinate, SessionConfiguration, SharedBackend};
use conduit_tools::{browser_tools, SessionRegistry, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;

struct Harness {
    backend: Arc<MockBackend>,
    sessions: Arc<SessionRegistry>,
    registry: ToolRegistry,
}

fn harness(backend: MockBackend) -> Harness {
    let backend = Arc::new(backend);
    let sessions = Arc::new(SessionRegistry::new());
    let shared: SharedBackend = backend.clone();
    let registry = browser_tools(shared, sessions.clone()).unwrap();
    Harness {
        backend,
        sessions,
        registry,
    }
}

fn id_after(text: &str, prefix: &str) -> String {
    text.strip_prefix(prefix)
        .unwrap_or_else(|| panic!("unexpected text: {}", text))
        .to_string()
}

#[tokio::test]
async fn test_session_window_lifecycle() {
    let h = harness(MockBackend::new());

    let created = h.registry.invoke("createSession", json!({})).await.unwrap();
    assert!(!created.is_error);
    let session_id = id_after(created.as_text().unwrap(), "Session created with ID: ");
    assert!(h.sessions.lookup(&session_id).await.is_none());

    let window = h
        .registry
        .invoke(
            "createWindow",
            json!({"sessionId": session_id, "url": "https://example.com"}),
        )
        .await
        .unwrap();
    assert!(!window.is_error);
    assert!(window.as_text().unwrap().starts_with("Window created with ID: win_"));

    let terminated = h
        .registry
        .invoke("terminateSession", json!({"sessionId": session_id}))
        .await
        .unwrap();
    assert_eq!(
        terminated.as_text(),
        Some(format!("Session {} terminated", session_id).as_str())
    );
    assert!(h.sessions.lookup(&session_id).await.is_none());
    assert_eq!(
        h.backend.call_names(),
        vec!["create_session", "create_window", "terminate_session"]
    );
}

#[tokio::test]
async fn test_profile_saved_only_when_tracked() {
    let h = harness(MockBackend::new());

    let created = h
        .registry
        .invoke(
            "createSession",
            json!({"configuration": {"profileName": "work", "timeoutMinutes": 5}}),
        )
        .await
        .unwrap();
    let session_id = id_after(created.as_text().unwrap(), "Session created with ID: ");
    assert_eq!(
        h.sessions.lookup(&session_id).await.and_then(|m| m.profile_name),
        Some("work".to_string())
    );

    h.registry
        .invoke("terminateSession", json!({"sessionId": session_id}))
        .await
        .unwrap();

    let calls = h.backend.calls();
    assert_eq!(
        calls[0],
        BrowserCall::CreateSession {
            configuration: SessionConfiguration {
                profile_name: Some("work".to_string()),
                timeout_minutes: Some(5),
                ..Default::default()
            }
        }
    );
    assert_eq!(
        calls[1],
        BrowserCall::SaveProfileOnTermination {
            session_id: session_id.clone(),
            profile_name: "work".to_string(),
        }
    );
    assert_eq!(calls[2].name(), "terminate_session");
    assert!(h.sessions.is_empty().await);
}

#[tokio::test]
async fn test_failed_creation_tracks_nothing() {
    let h = harness(MockBackend::new().respond_with(
        "create_session",
        BackendResponse::with_errors(vec![json!({"message": "quota exceeded"})]),
    ));

    let result = h
        .registry
        .invoke("createSession", json!({"configuration": {"profileName": "work"}}))
        .await
        .unwrap();

    assert!(result.is_error);
    assert_eq!(result.as_text(), Some("Errors from the API:\nquota exceeded"));
    assert!(h.sessions.is_empty().await);
}

#[tokio::test]
async fn test_terminate_releases_even_when_backend_fails() {
    let h = harness(MockBackend::new().fail_with("terminate_session", "connection reset"));
    h.sessions.track("s1", Some("work".to_string())).await;

    let result = h
        .registry
        .invoke("terminateSession", json!({"sessionId": "s1"}))
        .await
        .unwrap();

    assert!(result.is_error);
    assert!(result.as_text().unwrap().starts_with("Internal error:"));
    assert!(h.sessions.lookup("s1").await.is_none());
}

#[tokio::test]
async fn test_profile_save_failure_still_terminates() {
    let h = harness(MockBackend::new().respond_with(
        "save_profile_on_termination",
        BackendResponse::with_errors(vec![json!("profile locked")]),
    ));
    h.sessions.track("s1", Some("work".to_string())).await;

    let result = h
        .registry
        .invoke("terminateSession", json!({"sessionId": "s1"}))
        .await
        .unwrap();

    assert!(!result.is_error);
    assert_eq!(result.as_text(), Some("Session s1 terminated"));
    assert!(result.joined_text().contains("Profile 'work' was not saved"));
    assert_eq!(
        h.backend.call_names(),
        vec!["save_profile_on_termination", "terminate_session"]
    );
}

#[tokio::test]
async fn test_invalid_input_never_reaches_backend() {
    let h = harness(MockBackend::new());

    let cases = [
        ("createWindow", json!({"sessionId": "s1"})),
        ("click", json!({"sessionId": "s1", "windowId": "w1"})),
        ("click", json!({"sessionId": "s1", "windowId": "w1", "elementDescription": "b", "coordinate": {"x": 1}})),
        ("monitorForCondition", json!({"sessionId": "s1", "windowId": "w1", "condition": "x", "timeoutSeconds": "soon"})),
        ("createSession", json!({"configuration": {"timeoutMinutes": 0}})),
        ("scrape", json!({"sessionId": "s1", "windowId": "w1", "extra": 1})),
    ];

    for (tool, input) in cases {
        let result = h.registry.invoke(tool, input.clone()).await.unwrap();
        assert!(result.is_error, "{} accepted {}", tool, input);
    }
    assert_eq!(h.backend.call_count(), 0);
}

#[tokio::test]
async fn test_window_tools_forward_arguments() {
    let h = harness(MockBackend::new());

    h.registry
        .invoke(
            "click",
            json!({
                "sessionId": "s1",
                "windowId": "w1",
                "elementDescription": "Submit",
                "coordinate": {"x": 3, "y": 4.5}
            }),
        )
        .await
        .unwrap();
    h.registry
        .invoke(
            "monitorForCondition",
            json!({"sessionId": "s1", "windowId": "w1", "condition": "cart updated"}),
        )
        .await
        .unwrap();
    h.registry
        .invoke("scroll", json!({"sessionId": "s1", "windowId": "w1"}))
        .await
        .unwrap();

    let calls = h.backend.calls();
    assert_eq!(
        calls[0],
        BrowserCall::Click {
            session_id: "s1".to_string(),
            window_id: "w1".to_string(),
            element_description: "Submit".to_string(),
            coordinate: Some(Coordinate { x: 3.0, y: 4.5 }),
        }
    );
    assert_eq!(
        calls[1],
        BrowserCall::Monitor {
            session_id: "s1".to_string(),
            window_id: "w1".to_string(),
            condition: "cart updated".to_string(),
            timeout_seconds: 30,
        }
    );
    assert_eq!(
        calls[2],
        BrowserCall::Scroll {
            session_id: "s1".to_string(),
            window_id: "w1".to_string(),
            element_description: None,
        }
    );
}

#[tokio::test]
async fn test_every_tool_returns_content_for_valid_input() {
    let h = harness(MockBackend::new().respond_with(
        "page_query",
        BackendResponse::with_data(json!({"modelResponse": "The title is Example"})),
    ));

    let window = json!({"sessionId": "s1", "windowId": "w1"});
    let with = |extra: Value| {
        let mut input = window.clone();
        if let (Some(target), Some(source)) = (input.as_object_mut(), extra.as_object()) {
            target.extend(source.clone());
        }
        input
    };

    let cases = vec![
        ("createSession", json!({})),
        ("createWindow", json!({"sessionId": "s1", "url": "https://example.com"})),
        ("getWindowInfo", window.clone()),
        ("pageQuery", with(json!({"prompt": "What is the title?"}))),
        ("paginatedExtraction", with(json!({"prompt": "all rows", "outputSchema": {"type": "array"}}))),
        ("click", with(json!({"elementDescription": "Login"}))),
        ("scroll", with(json!({"elementDescription": "footer"}))),
        ("type", with(json!({"text": "hello"}))),
        ("scrape", window.clone()),
        ("fileInput", with(json!({"elementDescription": "upload", "filePath": "/tmp/a.txt"}))),
        ("monitorForCondition", with(json!({"condition": "done", "timeoutSeconds": 5}))),
        ("terminateSession", json!({"sessionId": "s1"})),
    ];
    assert_eq!(cases.len(), h.registry.len());

    for (tool, input) in cases {
        let result = h.registry.invoke(tool, input).await.unwrap();
        assert!(!result.is_error, "{} failed: {:?}", tool, result);
        assert!(!result.content.is_empty());
        assert!(!result.joined_text().is_empty());
        if tool == "pageQuery" {
            assert_eq!(result.as_text(), Some("The title is Example"));
        }
    }
}
