//! Extraction of `<antArtifact …>…</antArtifact>` blocks into side panels.
//!
//! Every tag occurrence is replaced in the message text by an inline wrapper (a
//! button that toggles the panel plus a hidden copy used when printing) and the
//! full content is pushed to a caller-owned list of [`Panel`]s that the page
//! renders in its aside.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use crate::archive::ArtifactCall;
use crate::utils::escape_html;

/// Appended to artifacts whose closing tag never arrived.
pub const TRUNCATION_NOTICE: &str =
    "\n\n\n THIS ARTIFACT IS INCOMPLETE BECAUSE THE MAX MESSAGE LENGTH WAS EXCEEDED.";

const DEFAULT_TITLE: &str = "Untitled";
const TOOL_ARTIFACT_TITLE: &str = "Artifact";
const ANALYSIS_TITLE: &str = "Analysis";
const ANALYSIS_LANGUAGE: &str = "javascript";

const ARTIFACT_ICON: &str = r#"<svg class="artifact-icon" width="16" height="16" viewBox="0 0 16 16"><path fill="currentColor" d="M14 4.5V14a2 2 0 0 1-2 2H4a2 2 0 0 1-2-2V2a2 2 0 0 1 2-2h5.5L14 4.5zm-3 0A1.5 1.5 0 0 1 9.5 3V1H4a1 1 0 0 0-1 1v12a1 1 0 0 0 1 1h8a1 1 0 0 0 1-1V4.5h-2z"/></svg>"#;

// Opening tag, lazily captured body, then the closing tag or end of input. A
// single trailing newline after an unclosed body is not part of the body.
static ARTIFACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<antArtifact[^>]*>)(.*?)(</antArtifact>|\n?\z)").expect("artifact regex")
});

const CLOSING_TAG: &str = "</antArtifact>";

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)=(?:"([^"]*)"|'([^']*)')"#).expect("attribute regex")
});

/// Maps an artifact MIME `type` to a code-block language.
fn language_for_type(mime: &str) -> Option<&'static str> {
    match mime {
        "application/vnd.ant.react" => Some("jsx"),
        "text/html" => Some("html"),
        _ => None,
    }
}

/// An explicit non-empty `language`, else the language for `kind`, else empty.
pub fn resolve_language(language: Option<&str>, kind: Option<&str>) -> String {
    language
        .filter(|l| !l.is_empty())
        .or_else(|| kind.and_then(language_for_type))
        .unwrap_or_default()
        .to_string()
}

/// Title of an artifact; a missing or empty one becomes "Untitled".
pub fn resolve_title(title: Option<&str>) -> String {
    title
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Source of artifact ids.
///
/// Ids start at 0 and only ever grow. Keep one counter for a whole export run
/// so that ids stay unique across every conversation rendered by it.
#[derive(Debug, Default, Clone)]
pub struct ArtifactCounter {
    next: usize,
}

impl ArtifactCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}

// ---------------------------------------------------------------------------
// Artifacts and panels
// ---------------------------------------------------------------------------

/// One extracted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: usize,
    pub title: String,
    pub language: String,
    pub content: String,
    /// False when the closing tag was missing.
    pub complete: bool,
}

impl Artifact {
    pub fn key(&self) -> String {
        format!("artifact-{}", self.id)
    }

    fn from_match(id: usize, opening_tag: &str, body: &str, closed: bool) -> Self {
        let attributes = parse_attributes(opening_tag);
        let attribute = |name: &str| attributes.get(name).map(String::as_str);
        let language = resolve_language(attribute("language"), attribute("type"));
        let title = resolve_title(attribute("title"));
        let mut content = body.to_string();
        if !closed {
            content.push_str(TRUNCATION_NOTICE);
        }
        Self {
            id,
            title,
            language,
            content,
            complete: closed,
        }
    }
}

/// A deferred, initially hidden fragment holding an artifact's full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// The element id the inline button refers to, e.g. `artifact-3` or `repl-abc`.
    pub key: String,
    pub html: String,
}

/// Parse `key="value"` and `key='value'` pairs out of an opening tag.
/// Later duplicates win; anything malformed is ignored.
pub fn parse_attributes(tag: &str) -> HashMap<String, String> {
    ATTRIBUTE_RE
        .captures_iter(tag)
        .map(|caps| {
            let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            (caps[1].to_string(), value.to_string())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Replace every artifact tag in `text` with its inline wrapper and push one
/// panel per artifact onto `panels`, in left-to-right order.
pub fn replace_artifact_tags(
    text: &str,
    panels: &mut Vec<Panel>,
    counter: &mut ArtifactCounter,
    print_artifacts: bool,
) -> String {
    ARTIFACT_RE
        .replace_all(text, |caps: &Captures| {
            let ending = &caps[3];
            let closed = ending == CLOSING_TAG;
            let artifact = Artifact::from_match(counter.next_id(), &caps[1], &caps[2], closed);
            trace!(
                component = "artifact",
                key = %artifact.key(),
                title = %artifact.title,
                language = %artifact.language,
                complete = artifact.complete,
                content_len = artifact.content.len(),
                "Extracted artifact"
            );
            let mut html = emit(
                &artifact.key(),
                &artifact.title,
                &artifact.language,
                &artifact.content,
                panels,
                print_artifacts,
            );
            // Keep the newline the unclosed body stopped short of.
            if !closed {
                html.push_str(ending);
            }
            html
        })
        .into_owned()
}

/// Render a `repl` tool invocation as an "Analysis" panel keyed `repl-{id}`.
/// Does not consume an artifact id.
pub fn render_tool_invocation(
    id: &str,
    code: &str,
    panels: &mut Vec<Panel>,
    print_artifacts: bool,
) -> String {
    let key = format!("repl-{}", id);
    trace!(component = "artifact", key = %key, "Rendering tool invocation");
    emit(
        &key,
        ANALYSIS_TITLE,
        ANALYSIS_LANGUAGE,
        code.trim(),
        panels,
        print_artifacts,
    )
}

/// Render an `artifacts` tool call inline, without a panel.
///
/// A call carrying content shows it as a titled code block. An `update` shows
/// the text it replaces and its replacement. Anything else renders as nothing.
pub fn render_artifact_call(call: &ArtifactCall) -> String {
    let language = escape_html(&resolve_language(
        call.language.as_deref(),
        call.kind.as_deref(),
    ));
    if let Some(content) = &call.content {
        let title = call.title.as_deref().unwrap_or(TOOL_ARTIFACT_TITLE);
        trace!(component = "artifact", command = %call.command, title, "Rendering artifact call");
        return format!(
            r#"
<div class="artifact-inline-block">
  <h4>{}</h4>
  <pre class="code-block {}">{}</pre>
</div>
"#,
            escape_html(title),
            language,
            escape_html(content.trim())
        );
    }
    if call.command == "update" {
        return format!(
            r#"
<div class="artifact-inline-block">
  <h4>update {}</h4>
  <p>Find this:</p>
  <pre class="code-block">{}</pre>
  <p>Replace with this:</p>
  <pre class="code-block">{}</pre>
</div>
"#,
            escape_html(&call.id),
            escape_html(&call.old_str),
            escape_html(&call.new_str)
        );
    }
    String::new()
}

/// Push the panel for `key` and return the inline wrapper that points at it.
fn emit(
    key: &str,
    title: &str,
    language: &str,
    content: &str,
    panels: &mut Vec<Panel>,
    print_artifacts: bool,
) -> String {
    let key = escape_html(key);
    let title = escape_html(title);
    let language = escape_html(language);
    let content = escape_html(content);

    panels.push(Panel {
        key: key.clone(),
        html: panel_html(&key, &title, &language, &content),
    });
    inline_html(&key, &title, &language, &content, print_artifacts)
}

// Arguments are already escaped.
fn panel_html(key: &str, title: &str, language: &str, content: &str) -> String {
    format!(
        r#"
<div class="artifact-panel" id="{key}">
  <div class="artifact-panel-header">
    <h3>{title}</h3>
    <button class="close-panel" aria-label="Close panel">&times;</button>
  </div>
  <div class="artifact-panel-content">
    <pre class="code-block {language}">{content}</pre>
  </div>
</div>
"#
    )
}

// Arguments are already escaped.
fn inline_html(
    key: &str,
    title: &str,
    language: &str,
    content: &str,
    print_artifacts: bool,
) -> String {
    let print_class = if print_artifacts { " print-enabled" } else { "" };
    format!(
        r#"
<div class="artifact-wrapper">
  <p class="artifact-button-wrapper{print_class}">
    <button class="artifact-button" data-artifact-id="{key}">
      {ARTIFACT_ICON}
      <span class="artifact-title">{title}</span>
    </button>
  </p>
  <div class="artifact-inline{print_class}">
    <h4>{title}</h4>
    <pre class="code-block {language}">{content}</pre>
  </div>
</div>
"#
    )
}
