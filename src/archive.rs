/// Type definitions for the exported chat archive.
///
/// An archive is a JSON array of conversation records. Each record looks like:
///
/// ```json
/// {
///   "uuid": "…",
///   "name": "Conversation title",
///   "created_at": "2024-05-01T10:00:00.000000Z",
///   "chat_messages": [
///     {
///       "sender": "human",
///       "created_at": "2024-05-01T10:00:00.000000Z",
///       "content": [{ "type": "text", "text": "…" }]
///     }
///   ]
/// }
/// ```
///
/// Only a handful of fields are read. Everything else is ignored, and missing
/// fields degrade to defaults instead of failing the whole record.
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// One conversation record from the archive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chat_messages: Option<Vec<ChatMessage>>,
}

impl Conversation {
    /// Parse one conversation from JSON text.
    ///
    /// `None` for malformed JSON, for anything that is not an object, and for
    /// objects without `chat_messages`.
    pub fn from_json(json: &str) -> Option<Self> {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Conversation JSON is malformed");
                return None;
            }
        };
        if value.get("chat_messages").is_none() {
            tracing::warn!("Conversation has no chat_messages");
            return None;
        }
        match serde_json::from_value(value) {
            Ok(conversation) => Some(conversation),
            Err(e) => {
                tracing::warn!(error = %e, "Conversation does not match the archive schema");
                None
            }
        }
    }

    /// Display title, falling back to "Untitled" when the name is absent.
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled")
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.chat_messages.as_deref().unwrap_or_default()
    }

    /// Messages in chronological order.
    ///
    /// The sort only happens when every message carries a parseable timestamp;
    /// otherwise the archive order is kept.
    pub fn sorted_messages(&self) -> Vec<&ChatMessage> {
        let mut messages: Vec<&ChatMessage> = self.messages().iter().collect();
        let stamps: Option<Vec<DateTime<FixedOffset>>> =
            messages.iter().map(|m| m.timestamp()).collect();
        match stamps {
            Some(stamps) => {
                let mut keyed: Vec<_> = stamps.into_iter().zip(messages).collect();
                keyed.sort_by_key(|(ts, _)| *ts);
                messages = keyed.into_iter().map(|(_, m)| m).collect();
            }
            None => {
                tracing::warn!(
                    conversation = self.title(),
                    "Could not sort chat messages due to missing or invalid timestamps"
                );
            }
        }
        messages
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Who sent a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Human,
    Assistant,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::Human => "human",
            Sender::Assistant => "assistant",
            Sender::Unknown => "unknown",
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentUnit>,
    /// Older exports carry the whole message as a flat string with no `content`.
    #[serde(default)]
    pub text: Option<String>,
    /// Files uploaded with the message; `null` in some exports.
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

/// A file uploaded alongside a message, with the text extracted from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub extracted_content: Option<String>,
}

impl Attachment {
    pub fn name(&self) -> &str {
        self.file_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("Attachment")
    }

    pub fn content(&self) -> &str {
        self.extracted_content.as_deref().unwrap_or_default()
    }
}

impl ChatMessage {
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    /// Content units to render. Falls back to the legacy `text` field.
    pub fn units(&self) -> Vec<ContentUnit> {
        if self.content.is_empty()
            && let Some(text) = self.text.as_ref().filter(|t| !t.is_empty())
        {
            return vec![ContentUnit::Text(text.clone())];
        }
        self.content.clone()
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.attachments.as_deref().unwrap_or_default()
    }
}

/// Parse an ISO-8601 timestamp, accepting a `Z` suffix.
///
/// Offsets are kept as written, not converted to local time. A timestamp with
/// no offset at all is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

// ---------------------------------------------------------------------------
// Content units
// ---------------------------------------------------------------------------

/// One element of a message's `content` array.
///
/// Custom deserializer classifies raw objects:
/// - `{"type": "tool_use", "name": "repl", "id": …, "input": {"code": …}}` → `ToolInvocation`
/// - `{"type": "tool_use", "name": "artifacts", "input": {…}}` → `ArtifactTool`
/// - any object with a non-empty `text` string → `Text`
/// - anything else → `Other`, kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub enum ContentUnit {
    Text(String),
    ToolInvocation { id: String, code: String },
    ArtifactTool(ArtifactCall),
    Other(serde_json::Value),
}

/// The `input` of an `artifacts` tool call: the newer way of creating and
/// editing artifacts, in place of inline `<antArtifact>` tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactCall {
    /// `create`, `rewrite` or `update`.
    pub command: String,
    pub id: String,
    pub title: Option<String>,
    pub language: Option<String>,
    /// MIME type, e.g. `application/vnd.ant.react`.
    pub kind: Option<String>,
    pub content: Option<String>,
    pub old_str: String,
    pub new_str: String,
}

impl ArtifactCall {
    fn from_input(input: &serde_json::Map<String, serde_json::Value>) -> Self {
        let text = |name: &str| {
            input
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Self {
            command: text("command").unwrap_or_default(),
            id: text("id").unwrap_or_default(),
            title: text("title"),
            language: text("language"),
            kind: text("type"),
            content: text("content"),
            old_str: text("old_str").unwrap_or_default(),
            new_str: text("new_str").unwrap_or_default(),
        }
    }
}

impl<'de> Deserialize<'de> for ContentUnit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

impl ContentUnit {
    pub fn from_value(value: serde_json::Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Other(value);
        };

        let field = |name: &str| obj.get(name).and_then(|v| v.as_str());

        if field("type") == Some("tool_use") && field("name") == Some("repl") {
            let id = match obj.get("id") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            let code = obj
                .get("input")
                .and_then(|input| input.get("code"))
                .and_then(|c| c.as_str())
                .unwrap_or_default()
                .to_owned();
            return Self::ToolInvocation { id, code };
        }

        if field("type") == Some("tool_use")
            && field("name") == Some("artifacts")
            && let Some(input) = obj.get("input").and_then(|i| i.as_object())
        {
            return Self::ArtifactTool(ArtifactCall::from_input(input));
        }

        if let Some(text) = field("text").filter(|t| !t.is_empty()) {
            return Self::Text(text.to_owned());
        }

        Self::Other(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_unit_classification() {
        let text = ContentUnit::from_value(json!({"type": "text", "text": "hi"}));
        assert_eq!(text, ContentUnit::Text("hi".into()));

        let repl = ContentUnit::from_value(json!({
            "type": "tool_use", "name": "repl", "id": "abc", "input": {"code": " x "}
        }));
        assert_eq!(
            repl,
            ContentUnit::ToolInvocation {
                id: "abc".into(),
                code: " x ".into()
            }
        );

        // Other tools and empty text are not special
        let other_tool = ContentUnit::from_value(json!({"type": "tool_use", "name": "web_search"}));
        assert!(matches!(other_tool, ContentUnit::Other(_)));
        let empty = ContentUnit::from_value(json!({"type": "text", "text": ""}));
        assert!(matches!(empty, ContentUnit::Other(_)));
    }

    #[test]
    fn test_repl_without_input_degrades_to_empty_code() {
        let repl = ContentUnit::from_value(json!({"type": "tool_use", "name": "repl", "id": 7}));
        assert_eq!(
            repl,
            ContentUnit::ToolInvocation {
                id: "7".into(),
                code: String::new()
            }
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let msg: ChatMessage = serde_json::from_value(json!({})).unwrap();
        assert_eq!(msg.sender, Sender::Unknown);
        assert!(msg.timestamp().is_none());
        assert!(msg.units().is_empty());

        let msg: ChatMessage = serde_json::from_value(json!({"sender": "robot"})).unwrap();
        assert_eq!(msg.sender, Sender::Unknown);
    }

    #[test]
    fn test_legacy_text_field() {
        let msg: ChatMessage =
            serde_json::from_value(json!({"sender": "human", "text": "hello", "content": []}))
                .unwrap();
        assert_eq!(msg.units(), vec![ContentUnit::Text("hello".into())]);
    }

    #[test]
    fn test_artifacts_tool_call() {
        let unit = ContentUnit::from_value(json!({
            "type": "tool_use",
            "name": "artifacts",
            "input": {
                "command": "create",
                "id": "chart",
                "title": "",
                "type": "application/vnd.ant.react",
                "content": "export default () => null;"
            }
        }));
        let ContentUnit::ArtifactTool(call) = unit else {
            panic!("expected an artifacts call");
        };
        assert_eq!(call.command, "create");
        assert_eq!(call.id, "chart");
        assert_eq!(call.title, None);
        assert_eq!(call.kind.as_deref(), Some("application/vnd.ant.react"));
        assert_eq!(call.content.as_deref(), Some("export default () => null;"));

        // No input object: nothing to render from
        let bare = ContentUnit::from_value(json!({"type": "tool_use", "name": "artifacts"}));
        assert!(matches!(bare, ContentUnit::Other(_)));
    }

    #[test]
    fn test_attachments() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "sender": "human",
            "attachments": [
                {"file_name": "notes.txt", "extracted_content": "line 1"},
                {"file_size": 3}
            ]
        }))
        .unwrap();
        let attachments = msg.attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].name(), "notes.txt");
        assert_eq!(attachments[0].content(), "line 1");
        assert_eq!(attachments[1].name(), "Attachment");
        assert_eq!(attachments[1].content(), "");

        let null: ChatMessage = serde_json::from_value(json!({"attachments": null})).unwrap();
        assert!(null.attachments().is_empty());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let z = parse_timestamp("2024-03-05T14:07:00.123456Z").unwrap();
        assert_eq!(z.offset().local_minus_utc(), 0);
        let offset = parse_timestamp("2024-03-05T14:07:00+02:00").unwrap();
        assert_eq!(offset.offset().local_minus_utc(), 7200);
        assert!(parse_timestamp("2024-03-05T14:07:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_sorted_messages() {
        let conv: Conversation = serde_json::from_value(json!({
            "name": "t",
            "chat_messages": [
                {"sender": "assistant", "created_at": "2024-01-01T10:05:00Z", "text": "b"},
                {"sender": "human", "created_at": "2024-01-01T10:00:00Z", "text": "a"},
            ]
        }))
        .unwrap();
        let sorted = conv.sorted_messages();
        assert_eq!(sorted[0].sender, Sender::Human);
        assert_eq!(sorted[1].sender, Sender::Assistant);
    }

    #[test]
    fn test_unsortable_messages_keep_archive_order() {
        let conv: Conversation = serde_json::from_value(json!({
            "chat_messages": [
                {"sender": "assistant", "created_at": "2024-01-01T10:05:00Z"},
                {"sender": "human"},
            ]
        }))
        .unwrap();
        let sorted = conv.sorted_messages();
        assert_eq!(sorted[0].sender, Sender::Assistant);
        assert_eq!(conv.title(), "Untitled");
    }
}
