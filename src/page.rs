//! One conversation → one self-contained HTML page.
//!
//! For each content unit the artifact pass runs first, then the markup pass.
//! Panels collected along the way land in the page's `artifact-container`.

use std::time::Instant;

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::archive::{Attachment, ChatMessage, ContentUnit, Conversation};
use crate::artifact::{self, ArtifactCounter, Panel};
use crate::assets::{CONVERSATION_CSS, CONVERSATION_JS};
use crate::markup;
use crate::utils::escape_html;

/// Display format for message timestamps, e.g. `Mar 05, 2024 02:07 PM`.
pub const MESSAGE_TIME_FORMAT: &str = "%b %d, %Y %I:%M %p";

/// Renders conversation pages.
///
/// Owns the artifact counter, so one renderer used across an export run never
/// repeats an artifact id. Rendering takes `&mut self`; a renderer is not meant
/// to be shared between threads.
#[derive(Debug, Default)]
pub struct Renderer {
    print_artifacts: bool,
    counter: ArtifactCounter,
}

impl Renderer {
    pub fn new(print_artifacts: bool) -> Self {
        Self {
            print_artifacts,
            counter: ArtifactCounter::new(),
        }
    }

    /// Number of artifact ids handed out so far.
    pub fn artifacts_issued(&self) -> usize {
        self.counter.issued()
    }

    /// Render a conversation straight from its JSON text.
    ///
    /// Returns an empty string for malformed JSON, for anything that is not an
    /// object, and for objects without `chat_messages`.
    pub fn render_json(&mut self, json: &str) -> String {
        Conversation::from_json(json)
            .map(|conversation| self.render(&conversation))
            .unwrap_or_default()
    }

    /// Render a full HTML document for `conversation`.
    pub fn render(&mut self, conversation: &Conversation) -> String {
        let messages = conversation.sorted_messages();
        self.render_page(conversation.title(), &messages)
    }

    /// Render a full HTML document from messages already in display order.
    pub fn render_page(&mut self, title: &str, messages: &[&ChatMessage]) -> String {
        let start = Instant::now();
        let mut panels: Vec<Panel> = Vec::new();

        let messages: Vec<String> = messages
            .iter()
            .map(|message| self.render_message(message, &mut panels))
            .collect();

        let panel_html: String = panels.iter().map(|p| p.html.as_str()).collect();

        debug!(
            component = "page",
            title,
            messages = messages.len(),
            panels = panels.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Rendered conversation"
        );

        let title = escape_html(title);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{CONVERSATION_CSS}</style>
</head>
<body>
<div class="container">
  <div class="chat-container">
    <div class="conversation-title">{title}</div>
{messages}
  </div>
  <div class="artifact-container">
{panel_html}
  </div>
</div>
<script>{CONVERSATION_JS}</script>
</body>
</html>
"#,
            messages = messages.join("\n"),
        )
    }

    /// Render one message block, pushing its panels onto `panels`.
    pub fn render_message(&mut self, message: &ChatMessage, panels: &mut Vec<Panel>) -> String {
        let mut content: String = message
            .units()
            .iter()
            .map(|unit| self.render_unit(unit, panels))
            .collect();
        for attachment in message.attachments() {
            content.push_str(&render_attachment(attachment));
        }
        let sender = message.sender.as_str();

        format!(
            r#"<div class="message {sender}">
  <div class="message-header">
    <span class="sender">{label}</span>
    <span class="timestamp">{timestamp}</span>
  </div>
  <div class="message-content">
{content}
  </div>
</div>"#,
            label = escape_html(sender),
            timestamp = format_timestamp(message.timestamp()),
        )
    }

    fn render_unit(&mut self, unit: &ContentUnit, panels: &mut Vec<Panel>) -> String {
        match unit {
            ContentUnit::Text(text) => {
                let text = artifact::replace_artifact_tags(
                    text,
                    panels,
                    &mut self.counter,
                    self.print_artifacts,
                );
                markup::render_markup(&text)
            }
            ContentUnit::ToolInvocation { id, code } => {
                artifact::render_tool_invocation(id, code, panels, self.print_artifacts)
            }
            ContentUnit::ArtifactTool(call) => artifact::render_artifact_call(call),
            ContentUnit::Other(value) => escape_html(&value.to_string()),
        }
    }
}

/// A collapsed block holding the text extracted from an uploaded file.
fn render_attachment(attachment: &Attachment) -> String {
    format!(
        r#"
<details class="attachment">
  <summary>{}</summary>
  <pre class="attachment-content">{}</pre>
</details>
"#,
        escape_html(attachment.name()),
        escape_html(attachment.content())
    )
}

/// Format a message timestamp for display; empty when unknown.
pub fn format_timestamp(ts: Option<DateTime<FixedOffset>>) -> String {
    ts.map(|t| t.format(MESSAGE_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conversation_json(messages: serde_json::Value) -> String {
        json!({ "name": "Test <Chat>", "chat_messages": messages }).to_string()
    }

    #[test]
    fn test_malformed_input_renders_empty() {
        let mut renderer = Renderer::new(false);
        assert_eq!(renderer.render_json("{not json"), "");
        assert_eq!(renderer.render_json("[]"), "");
        assert_eq!(renderer.render_json(r#"{"name": "x"}"#), "");
        assert_eq!(renderer.render_json("null"), "");
    }

    #[test]
    fn test_page_structure() {
        let mut renderer = Renderer::new(false);
        let html = renderer.render_json(&conversation_json(json!([
            {
                "sender": "human",
                "created_at": "2024-03-05T14:07:00Z",
                "content": [{"type": "text", "text": "Hello `there`"}]
            },
            {
                "sender": "assistant",
                "created_at": "2024-03-05T14:08:00Z",
                "content": [{"type": "text", "text": "Hi!"}]
            }
        ])));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test &lt;Chat&gt;</title>"));
        assert!(html.contains(r#"<div class="conversation-title">Test &lt;Chat&gt;</div>"#));
        assert!(html.contains(r#"<div class="message human">"#));
        assert!(html.contains(r#"<span class="sender">assistant</span>"#));
        assert!(html.contains(r#"<span class="timestamp">Mar 05, 2024 02:07 PM</span>"#));
        assert!(html.contains(r#"<code class="inline-code">there</code>"#));
        assert!(html.contains(r#"<div class="artifact-container">"#));
        assert!(html.contains("hideAllPanels"));
        assert!(html.find("message human").unwrap() < html.find("message assistant").unwrap());
    }

    #[test]
    fn test_messages_sorted_by_timestamp() {
        let mut renderer = Renderer::new(false);
        let html = renderer.render_json(&conversation_json(json!([
            {"sender": "assistant", "created_at": "2024-03-05T14:08:00Z", "content": [{"type": "text", "text": "second"}]},
            {"sender": "human", "created_at": "2024-03-05T14:07:00Z", "content": [{"type": "text", "text": "first"}]}
        ])));
        assert!(html.find("first").unwrap() < html.find("second").unwrap());
    }

    #[test]
    fn test_panels_collected_in_container() {
        let mut renderer = Renderer::new(true);
        let html = renderer.render_json(&conversation_json(json!([
            {
                "sender": "assistant",
                "created_at": "2024-03-05T14:08:00Z",
                "content": [
                    {"type": "text", "text": "<antArtifact title=\"A\">a</antArtifact>"},
                    {"type": "tool_use", "name": "repl", "id": "abc", "input": {"code": "  1 < 2  "}},
                    {"type": "text", "text": "<antArtifact title=\"B\">b</antArtifact>"}
                ]
            }
        ])));

        let container = &html[html.find(r#"<div class="artifact-container">"#).unwrap()..];
        let a = container.find(r#"id="artifact-0""#).unwrap();
        let repl = container.find(r#"id="repl-abc""#).unwrap();
        let b = container.find(r#"id="artifact-1""#).unwrap();
        assert!(a < repl && repl < b);
        assert!(container.contains(r#"<pre class="code-block javascript">1 &lt; 2</pre>"#));
        assert!(html.contains(r#"class="artifact-inline print-enabled""#));
        assert_eq!(renderer.artifacts_issued(), 2);
    }

    #[test]
    fn test_artifact_ids_continue_across_conversations() {
        let mut renderer = Renderer::new(false);
        let json = conversation_json(json!([
            {"sender": "assistant", "content": [{"type": "text", "text": "<antArtifact>x</antArtifact>"}]}
        ]));
        let first = renderer.render_json(&json);
        let second = renderer.render_json(&json);
        assert!(first.contains(r#"id="artifact-0""#));
        assert!(second.contains(r#"id="artifact-1""#));
        assert!(!second.contains(r#"id="artifact-0""#));
    }

    #[test]
    fn test_missing_fields_degrade() {
        let mut renderer = Renderer::new(false);
        let html = renderer.render_json(r#"{"chat_messages": [{"content": [{"type": "image", "url": "<x>"}]}]}"#);
        assert!(html.contains("<title>Untitled</title>"));
        assert!(html.contains(r#"<div class="message unknown">"#));
        assert!(html.contains(r#"<span class="timestamp"></span>"#));
        assert!(html.contains("&quot;url&quot;:&quot;&lt;x&gt;&quot;"));
    }

    #[test]
    fn test_artifact_calls_and_attachments() {
        let mut renderer = Renderer::new(false);
        let html = renderer.render_json(&conversation_json(json!([
            {
                "sender": "human",
                "content": [{"type": "text", "text": "see file"}],
                "attachments": [{"file_name": "data<1>.csv", "extracted_content": "a,b\n1,2"}]
            },
            {
                "sender": "assistant",
                "content": [{
                    "type": "tool_use",
                    "name": "artifacts",
                    "input": {"command": "create", "title": "Chart", "language": "python", "content": "plot()"}
                }]
            }
        ])));
        assert!(html.contains(r#"<details class="attachment">"#));
        assert!(html.contains("<summary>data&lt;1&gt;.csv</summary>"));
        assert!(html.contains("a,b\n1,2</pre>"));
        assert!(html.contains("<h4>Chart</h4>"));
        assert!(html.contains(r#"<pre class="code-block python">plot()</pre>"#));
        assert!(!html.contains("&quot;artifacts&quot;"));
        assert_eq!(renderer.artifacts_issued(), 0);
    }

    #[test]
    fn test_format_timestamp_keeps_offset() {
        let ts = crate::archive::parse_timestamp("2024-12-31T23:59:00-05:00");
        assert_eq!(format_timestamp(ts), "Dec 31, 2024 11:59 PM");
        assert_eq!(format_timestamp(None), "");
    }
}
