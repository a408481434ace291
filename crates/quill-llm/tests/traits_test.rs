use quill_llm::{ChatOptions, ChatRequest, Content, Message, ResponseFormat};

#[test]
fn test_chat_request_creation() {
    let messages = vec![Message::human("Hello")];
    let request = ChatRequest::new("gpt-4o", messages);
    
    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.options.temperature, None);
}

#[test]
fn test_chat_options_builder() {
    let options = ChatOptions::new()
        .temperature(0.5)
        .max_tokens(200)
        .response_format(ResponseFormat::JsonObject);
    
    assert_eq!(options.temperature, Some(0.5));
    assert_eq!(options.max_tokens, Some(200));
    assert_eq!(options.response_format, Some(ResponseFormat::JsonObject));
}

#[test]
fn test_json_schema_wire_format() {
    let schema = serde_json::json!({
        "type": "object",
        "properties": { "intent": { "type": "string", "enum": ["edit", "draft"] } },
        "required": ["intent"],
        "additionalProperties": false
    });
    let value = ResponseFormat::json_schema("intent_label", schema.clone()).to_value();

    assert_eq!(value["type"], "json_schema");
    assert_eq!(value["json_schema"]["name"], "intent_label");
    assert_eq!(value["json_schema"]["schema"], schema);
}

#[test]
fn test_message_roles_and_serialization() {
    let msg = Message::ai("Sure, here's a draft");
    assert_eq!(msg.role(), "assistant");
    assert_eq!(msg.content().as_text(), Some("Sure, here's a draft"));

    let json = serde_json::to_value(Message::human("hi")).unwrap();
    assert_eq!(json["role"], "user");
    assert_eq!(json["content"], "hi");
}

#[test]
fn test_content_parts_to_plain_text() {
    let content: Content = serde_json::from_value(serde_json::json!([
        { "type": "text", "text": "Hello " },
        { "type": "text", "text": "there" }
    ]))
    .unwrap();

    assert_eq!(content.as_text(), None);
    assert_eq!(content.to_plain_text(), "Hello there");
}
