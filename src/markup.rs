//! Markdown-ish text to HTML.
//!
//! Four global rewrite passes run in a fixed order over the whole text:
//!
//! 1. fenced code blocks (```` ```lang … ``` ````) → `<pre class="code-block lang">`
//! 2. inline code (`` `…` ``) → `<code class="inline-code">`
//! 3. numbered list runs → nested `<ol class="numbered-list">`
//! 4. bulleted list runs → nested `<ul class="bulleted-list">`
//!
//! Code content is escaped. Surrounding prose is passed through as-is, so the
//! output is only as safe as the text handed in.
//!
//! The two list passes find their runs differently. Numbered runs are matched
//! line by line and stop at the first line that is neither blank nor a
//! numbered item. A bulleted run starts at a line beginning with `-` or `*`
//! and, because its pattern lets `.` cross newlines, extends to the end of the
//! text. Lines inside a run that are not well-formed items are dropped.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use crate::utils::escape_html;

static FENCED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w*)\n([\s\S]*?)```").expect("fenced code regex"));

static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code regex"));

static NUMBERED_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|\n)(?:\s*\d+\.\s+.+(?:\n|$))+").expect("numbered run regex")
});

static BULLETED_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:^|\n)(?:[-*]\s+.+\n?)+").expect("bulleted run regex")
});

static NUMBERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(\d+)\.\s+(.+)$").expect("numbered item regex"));

static BULLETED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*])\s+(.+)$").expect("bulleted item regex"));

/// Run every pass over `text`.
pub fn render_markup(text: &str) -> String {
    let text = render_fenced_code(text);
    let text = render_inline_code(&text);
    let text = render_numbered_lists(&text);
    render_bulleted_lists(&text)
}

/// ```` ```lang\n…``` ```` → `<pre class="code-block lang">escaped</pre>`. The
/// language token may be empty.
pub fn render_fenced_code(text: &str) -> String {
    FENCED_CODE_RE
        .replace_all(text, |caps: &Captures| {
            trace!(
                component = "markup",
                operation = "fenced_code",
                language = &caps[1],
                content_len = caps[2].len(),
                "Rendering code block"
            );
            format!(
                r#"<pre class="code-block {}">{}</pre>"#,
                &caps[1],
                escape_html(&caps[2])
            )
        })
        .into_owned()
}

/// `` `code` `` → `<code class="inline-code">escaped</code>`.
pub fn render_inline_code(text: &str) -> String {
    INLINE_CODE_RE
        .replace_all(text, |caps: &Captures| {
            format!(r#"<code class="inline-code">{}</code>"#, escape_html(&caps[1]))
        })
        .into_owned()
}

pub fn render_numbered_lists(text: &str) -> String {
    render_list_runs(text, ListKind::Numbered)
}

pub fn render_bulleted_lists(text: &str) -> String {
    render_list_runs(text, ListKind::Bulleted)
}

fn render_list_runs(text: &str, kind: ListKind) -> String {
    kind.run_re()
        .replace_all(text, |caps: &Captures| {
            let run = caps[0].trim();
            trace!(
                component = "markup",
                operation = "list_run",
                kind = ?kind,
                lines = run.lines().count(),
                "Rendering list run"
            );
            format!("\n{}\n", build_list(kind, run).to_html())
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// List tree
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListKind {
    Numbered,
    Bulleted,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Numbered => "ol",
            ListKind::Bulleted => "ul",
        }
    }

    fn class(self) -> &'static str {
        match self {
            ListKind::Numbered => "numbered-list",
            ListKind::Bulleted => "bulleted-list",
        }
    }

    /// Leading whitespace characters per nesting level.
    fn indent_width(self) -> usize {
        match self {
            ListKind::Numbered => 3,
            ListKind::Bulleted => 2,
        }
    }

    fn run_re(self) -> &'static Regex {
        match self {
            ListKind::Numbered => &*NUMBERED_RUN_RE,
            ListKind::Bulleted => &*BULLETED_RUN_RE,
        }
    }

    fn item_re(self) -> &'static Regex {
        match self {
            ListKind::Numbered => &*NUMBERED_ITEM_RE,
            ListKind::Bulleted => &*BULLETED_ITEM_RE,
        }
    }

    /// Opening markup of an item; the closing `</li>` is added on render.
    fn open_item(self, marker: &str, content: &str) -> String {
        match self {
            ListKind::Numbered => format!(r#"<li value="{}">{}"#, marker, content),
            ListKind::Bulleted => format!("<li>{}", content),
        }
    }
}

#[derive(Debug)]
struct ListBlock {
    kind: ListKind,
    nodes: Vec<ListNode>,
}

#[derive(Debug)]
enum ListNode {
    /// Rendered `<li …>content` plus the list nested under it, if any.
    Item {
        open: String,
        nested: Option<ListBlock>,
    },
    /// A nested list with no item to hang it from.
    List(ListBlock),
}

impl ListBlock {
    fn new(kind: ListKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
        }
    }

    fn push_item(&mut self, open: String) {
        self.nodes.push(ListNode::Item { open, nested: None });
    }

    /// Hang a finished child list under the last item.
    fn attach(&mut self, child: ListBlock) {
        match self.nodes.last_mut() {
            Some(ListNode::Item { nested: slot @ None, .. }) => *slot = Some(child),
            _ => self.nodes.push(ListNode::List(child)),
        }
    }

    fn to_html(&self) -> String {
        let items: Vec<String> = self.nodes.iter().map(ListNode::to_html).collect();
        format!(
            r#"<{tag} class="{class}">{items}</{tag}>"#,
            tag = self.kind.tag(),
            class = self.kind.class(),
            items = items.join("\n"),
        )
    }
}

impl ListNode {
    fn to_html(&self) -> String {
        match self {
            ListNode::Item { open, nested: None } => format!("{}</li>", open),
            ListNode::Item {
                open,
                nested: Some(list),
            } => format!("{}\n{}\n</li>", open, list.to_html()),
            ListNode::List(list) => list.to_html(),
        }
    }
}

/// Build the nested list for one run of list-like lines.
///
/// The stack holds the open lists, outermost first. A deeper line opens one new
/// list whatever the size of the jump; a shallower line closes one list per
/// level of difference, never the outermost one.
fn build_list(kind: ListKind, run: &str) -> ListBlock {
    let mut stack = vec![ListBlock::new(kind)];
    let mut current_level = 0usize;

    for line in run.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        let Some(caps) = kind.item_re().captures(line) else {
            trace!(component = "markup", kind = ?kind, line, "Dropping malformed list line");
            continue;
        };
        let level = caps[1].chars().count() / kind.indent_width();
        let open = kind.open_item(&caps[2], caps[3].trim());

        if level > current_level {
            let mut nested = ListBlock::new(kind);
            nested.push_item(open);
            stack.push(nested);
        } else {
            while current_level > level && stack.len() > 1 {
                close_innermost(&mut stack);
                current_level -= 1;
            }
            if let Some(top) = stack.last_mut() {
                top.push_item(open);
            }
        }
        current_level = level;
    }

    while stack.len() > 1 {
        close_innermost(&mut stack);
    }
    stack.pop().unwrap_or_else(|| ListBlock::new(kind))
}

fn close_innermost(stack: &mut Vec<ListBlock>) {
    if let Some(done) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.attach(done),
            None => stack.push(done),
        }
    }
}
