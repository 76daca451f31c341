//! # chat-archive-html
//!
//! Turns an exported chat archive (`conversations.json`) into static HTML pages.
//!
//! ## What it does
//!
//! The archive is a JSON array of conversations. Each conversation with content
//! is rendered as a standalone HTML page with the messages in chronological
//! order, and an `index.html` links them all, oldest first, with the opening
//! prompt as a description. Conversations without messages are counted as
//! deleted and skipped.
//!
//! Message text goes through two passes:
//!
//! - `<antArtifact …>` blocks are lifted into side panels that a button next to
//!   the message toggles. Unclosed blocks are kept and marked incomplete.
//! - A small markdown subset is converted: fenced and inline code, and nested
//!   numbered and bulleted lists.
//!
//! `repl` tool calls become "Analysis" panels the same way; `artifacts` tool
//! calls are shown inline. Text extracted from uploaded files is shown in a
//! collapsed block under its message.
//!
//! With `--format markdown` the same archive is written as Markdown documents
//! with an `index.md` instead.
//!
//! ## Usage
//!
//! ```sh
//! # Export every conversation into ./site
//! chat-archive-html conversations.json site
//!
//! # Show artifact contents inline when printing, and keep per-conversation JSON
//! chat-archive-html conversations.json site --print-artifacts --split-json
//!
//! # Markdown instead of HTML
//! chat-archive-html conversations.json notes --format markdown
//!
//! # Render a single conversation object
//! chat-archive-html one-chat.json site
//! ```
//!
//! Preferences can be persisted in `~/.config/chat-archive-html/config.toml`.
//!
//! ## Safety
//!
//! Code and artifact contents are HTML-escaped. Ordinary prose is not: pages are
//! meant for viewing your own archive, not for publishing untrusted text.

pub mod archive;
pub mod artifact;
pub mod assets;
pub mod export;
pub mod index;
pub mod markdown;
pub mod markup;
pub mod page;
pub mod utils;

pub use export::{ExportSummary, execute};
pub use page::Renderer;
pub use utils::{ExportConfig, FilenameStyle, OutputFormat};
