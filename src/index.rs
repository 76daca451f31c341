//! Table of contents linking every exported conversation.

use chrono::{DateTime, FixedOffset};

use crate::archive::{ChatMessage, ContentUnit, Conversation, Sender};
use crate::assets::INDEX_CSS;
use crate::utils::escape_html;

pub const INDEX_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub title: String,
    /// Relative link target, e.g. `My chat.html`.
    pub filename: String,
    /// Timestamp of the first message as stored in the archive.
    pub started_at: Option<DateTime<FixedOffset>>,
    pub description: String,
}

impl IndexEntry {
    /// `sorted` is the conversation's messages in display order. The description
    /// comes from the first of those, the timestamp from the first message in
    /// archive order.
    pub fn from_conversation(
        conversation: &Conversation,
        sorted: &[&ChatMessage],
        title: &str,
        filename: &str,
    ) -> Self {
        let description = match sorted.first() {
            None => "No chat messages in conversation.".to_string(),
            Some(m) if m.sender == Sender::Human && !m.units().is_empty() => {
                match &m.units()[0] {
                    ContentUnit::Text(text) => text.clone(),
                    _ => String::new(),
                }
            }
            Some(_) => "No initial human message found.".to_string(),
        };
        Self {
            title: title.to_string(),
            filename: filename.to_string(),
            started_at: conversation.messages().first().and_then(ChatMessage::timestamp),
            description,
        }
    }

    /// Display timestamp and description; placeholders when undated.
    fn labels(&self) -> (String, &str) {
        match self.started_at {
            Some(ts) => (
                ts.format(INDEX_TIME_FORMAT).to_string(),
                self.description.as_str(),
            ),
            None => (
                "Timestamp Unavailable".to_string(),
                "Description Unavailable",
            ),
        }
    }
}

/// Oldest first; entries without a timestamp go last, in the order given.
fn ordered(entries: &[IndexEntry]) -> Vec<&IndexEntry> {
    let mut sorted: Vec<&IndexEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| (e.started_at.is_none(), e.started_at));
    sorted
}

/// Render the index page. Entries are listed oldest first; entries without a
/// timestamp go last, in the order given.
pub fn render_index(entries: &[IndexEntry]) -> String {
    let mut items = String::new();
    for entry in ordered(entries) {
        let title = escape_html(&entry.title);
        let href = escape_html(&entry.filename);
        let (timestamp, description) = entry.labels();
        let description = escape_html(description);
        items.push_str(&format!(
            "<li><span class=\"timestamp\">[{timestamp}]</span> <a href=\"{href}\">{title}</a><br><span class=\"description\">{description}</span></li>\n"
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Conversations</title>
<style>{INDEX_CSS}</style>
</head>
<body>
<h1>Conversations</h1>
<ul>
{items}</ul>
</body>
</html>
"#
    )
}

/// The same listing as [`render_index`], as a Markdown document.
pub fn render_index_markdown(entries: &[IndexEntry]) -> String {
    let mut out = String::from("# Conversations\n\n");
    for entry in ordered(entries) {
        let (timestamp, description) = entry.labels();
        out.push_str(&format!(
            "- [{}] [{}](<{}>)\n",
            timestamp,
            entry.title.replace(['[', ']'], ""),
            entry.filename
        ));
        if let Some(first_line) = description.lines().find(|l| !l.trim().is_empty()) {
            out.push_str(&format!("  {}\n", first_line.trim()));
        }
    }
    out
}
