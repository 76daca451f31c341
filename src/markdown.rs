//! One conversation → one Markdown document.
//!
//! Blocks are separated by a blank line: the title, then for each message a
//! `**sender** (time)` header followed by its content and attachments.
//! Inline `<antArtifact>` tags become a heading plus a fenced code block, and
//! tool calls become fenced blocks. Nothing is escaped.

use std::io::{self, Write};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;

use crate::archive::{ArtifactCall, Attachment, ChatMessage, ContentUnit, Conversation};
use crate::artifact::{parse_attributes, resolve_language, resolve_title};
use crate::page::MESSAGE_TIME_FORMAT;

static OPENING_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<antArtifact[^>]*>").expect("opening tag regex"));

const FENCE: &str = "```";
/// Longer than any fence likely to occur in extracted file text.
const ATTACHMENT_FENCE: &str = "`````";

pub fn write_conversation_markdown<W: Write>(
    writer: &mut W,
    title: &str,
    messages: &[&ChatMessage],
) -> io::Result<()> {
    write!(writer, "# {}", title)?;
    for message in messages {
        write!(writer, "\n\n")?;
        write_message(writer, message)?;
    }
    writeln!(writer)
}

fn write_message<W: Write>(writer: &mut W, message: &ChatMessage) -> io::Result<()> {
    let sender = message.sender.as_str();
    match message.timestamp() {
        Some(ts) => write!(writer, "**{}** ({})", sender, ts.format(MESSAGE_TIME_FORMAT))?,
        None => write!(writer, "**{}**", sender)?,
    }

    for unit in message.units() {
        let block = unit_markdown(&unit);
        if !block.is_empty() {
            write!(writer, "\n\n{}", block)?;
        }
    }
    for attachment in message.attachments() {
        write!(writer, "\n\n{}", attachment_markdown(attachment))?;
    }
    Ok(())
}

/// Render a conversation to a Markdown string, messages in display order.
pub fn render(conversation: &Conversation) -> String {
    let messages = conversation.sorted_messages();
    let mut buf = Vec::new();
    if let Err(e) = write_conversation_markdown(&mut buf, conversation.title(), &messages) {
        warn!(error = %e, "Failed to render Markdown");
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Markdown counterpart of [`crate::page::Renderer::render_json`]: empty for
/// input that holds no conversation.
pub fn render_json(json: &str) -> String {
    Conversation::from_json(json)
        .map(|conversation| render(&conversation))
        .unwrap_or_default()
}

pub fn unit_markdown(unit: &ContentUnit) -> String {
    match unit {
        ContentUnit::Text(text) => replace_artifact_tags(text),
        ContentUnit::ToolInvocation { code, .. } => {
            format!("**Analysis**\n{FENCE}javascript\n{}\n{FENCE}", code.trim())
        }
        ContentUnit::ArtifactTool(call) => artifact_call_markdown(call),
        ContentUnit::Other(value) => value.to_string(),
    }
}

/// Opening tags become `### Title` plus an opening fence; closing tags close it.
/// An unclosed artifact leaves its fence open.
pub fn replace_artifact_tags(text: &str) -> String {
    let text = text.replace("</antArtifact>", &format!("\n{FENCE}"));
    OPENING_TAG_RE
        .replace_all(&text, |caps: &Captures| {
            let attributes = parse_attributes(&caps[0]);
            let attribute = |name: &str| attributes.get(name).map(String::as_str);
            format!(
                "### {}\n\n{FENCE}{}",
                resolve_title(attribute("title")),
                resolve_language(attribute("language"), attribute("type"))
            )
        })
        .into_owned()
}

fn artifact_call_markdown(call: &ArtifactCall) -> String {
    let language = resolve_language(call.language.as_deref(), call.kind.as_deref());
    match call.command.as_str() {
        "create" | "rewrite" => format!(
            "#### {} {}\n\n{FENCE}{}\n{}\n{FENCE}",
            call.command,
            resolve_title(call.title.as_deref()),
            language,
            call.content.as_deref().unwrap_or_default()
        ),
        "update" => format!(
            "#### update {}\n\nFind this:\n{FENCE}\n{}\n{FENCE}\nReplace with this:\n{FENCE}\n{}\n{FENCE}",
            call.id, call.old_str, call.new_str
        ),
        _ => String::new(),
    }
}

fn attachment_markdown(attachment: &Attachment) -> String {
    format!(
        "<details><summary>{}</summary>\n\n{ATTACHMENT_FENCE}\n{}\n{ATTACHMENT_FENCE}\n</details>",
        attachment.name(),
        attachment.content()
    )
}
