use n8n_relay::{Conversation, Message, Progress, Relay, Role, StatusEvent, StatusLevel, User};
use serde_json::json;

#[test]
fn test_in_progress_event_envelope() {
    let event = StatusEvent::info("Calling n8n workflow...", false);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(
        json,
        json!({
            "type": "status",
            "data": {
                "status": "in_progress",
                "level": "info",
                "description": "Calling n8n workflow...",
                "done": false
            }
        })
    );
}

#[test]
fn test_error_event_is_complete() {
    let event = StatusEvent::error("Error calling n8n: 500: server error");
    assert_eq!(event.progress(), Progress::Complete);

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["data"]["status"], "complete");
    assert_eq!(json["data"]["level"], "error");
    assert_eq!(json["data"]["done"], true);
}

#[test]
fn test_event_deserializes_from_envelope() {
    let parsed: StatusEvent = serde_json::from_value(json!({
        "type": "status",
        "data": {"status": "complete", "level": "info", "description": "Complete", "done": true}
    }))
    .unwrap();
    assert_eq!(parsed, StatusEvent::new(StatusLevel::Info, "Complete", true));
}

#[test]
fn test_event_rejects_inconsistent_status() {
    let result: Result<StatusEvent, _> = serde_json::from_value(json!({
        "type": "status",
        "data": {"status": "complete", "level": "info", "description": "x", "done": false}
    }));
    assert!(result.is_err());
}

#[test]
fn test_conversation_parses_host_body() {
    let conversation: Conversation = serde_json::from_value(json!({
        "messages": [
            {"role": "system", "content": "be brief"},
            {"role": "user", "content": "hello"}
        ],
        "model": "n8n_pipe"
    }))
    .unwrap();

    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.messages[0].role, Role::System);
    assert_eq!(conversation.latest_content(), Some("hello"));
    assert_eq!(conversation.extra["model"], "n8n_pipe");
}

#[test]
fn test_conversation_without_messages_key_is_empty() {
    let conversation: Conversation = serde_json::from_value(json!({"model": "x"})).unwrap();
    assert!(conversation.is_empty());
    assert_eq!(conversation.latest_content(), None);
}

#[test]
fn test_unknown_role_is_rejected() {
    let result: Result<Message, _> =
        serde_json::from_value(json!({"role": "tool", "content": "x"}));
    assert!(result.is_err());
}

#[test]
fn test_user_parses_host_user() {
    let user: User = serde_json::from_value(json!({
        "id": "u1",
        "name": "Ada",
        "email": "ada@example.com",
        "role": "admin"
    }))
    .unwrap();
    assert_eq!(user.id.as_deref(), Some("u1"));
    assert_eq!(n8n_relay::conversation::session_id_for(Some(&user)), "u1");
    assert_eq!(n8n_relay::conversation::session_id_for(None), "anonymous");
}

#[test]
fn test_manifest_matches_host_registration() {
    let manifest = serde_json::to_value(Relay::manifest()).unwrap();
    assert_eq!(
        manifest,
        json!({"type": "pipe", "id": "n8n_pipe", "name": "N8N Pipe"})
    );
}

#[test]
fn test_message_keeps_host_fields() {
    let body = json!({
        "messages": [
            {"role": "user", "content": "hello", "id": "m-1", "timestamp": 1718000000}
        ]
    });
    let mut conversation: Conversation = serde_json::from_value(body).unwrap();
    assert_eq!(conversation.messages[0].extra["id"], "m-1");

    conversation.push(Message::assistant("hi"));
    let round_tripped = serde_json::to_value(&conversation).unwrap();
    assert_eq!(
        round_tripped["messages"],
        json!([
            {"role": "user", "content": "hello", "id": "m-1", "timestamp": 1718000000},
            {"role": "assistant", "content": "hi"}
        ])
    );
}
