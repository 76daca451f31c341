use chat_archive_html::{ExportConfig, FilenameStyle, OutputFormat, execute};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config(input: &Path, target_dir: &Path) -> ExportConfig {
    ExportConfig {
        input: input.to_path_buf(),
        target_dir: target_dir.to_path_buf(),
        print_artifacts: false,
        split_json: false,
        filename_style: FilenameStyle::Sanitized,
        format: OutputFormat::Html,
        verbose: false,
        quiet: true,
    }
}

fn message(sender: &str, at: &str, text: &str) -> serde_json::Value {
    json!({
        "sender": sender,
        "created_at": at,
        "content": [{"type": "text", "text": text}]
    })
}

fn archive() -> serde_json::Value {
    json!([
        {
            "name": "Second: chat?",
            "chat_messages": [
                message("human", "2024-02-01T09:00:00Z", "Make a page"),
                message("assistant", "2024-02-01T09:01:00Z",
                    "Sure <antArtifact title=\"Page\" type=\"text/html\"><h1>x</h1></antArtifact>")
            ]
        },
        {
            "name": "First",
            "chat_messages": [
                message("human", "2024-01-01T09:00:00Z", "Hello"),
                message("assistant", "2024-01-01T09:01:00Z",
                    "<antArtifact title=\"A\">a</antArtifact>")
            ]
        },
        { "name": "Deleted", "chat_messages": [] },
        { "name": "", "chat_messages": [message("human", "2024-01-01T09:00:00Z", "x")] },
        "not a conversation",
        {
            "name": "First",
            "chat_messages": [message("human", "2024-03-01T09:00:00Z", "again")]
        },
        {
            "chat_messages": [message("human", "2024-04-01T09:00:00Z", "nameless")]
        }
    ])
}

#[test]
fn exports_batch_with_index() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("conversations.json");
    let out = dir.path().join("site");
    fs::write(&input, archive().to_string()).unwrap();

    let summary = execute(&config(&input, &out)).unwrap();
    assert_eq!(summary.written, 4);
    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors, 0);

    assert!(out.join("Second chat.html").exists());
    assert!(out.join("First.html").exists());
    assert!(out.join("First-2.html").exists());
    assert!(out.join("conversation_7.html").exists());
    assert!(!out.join("Deleted.html").exists());

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    let first = index.find(r#"href="First.html""#).unwrap();
    let second = index.find(r#"href="Second chat.html""#).unwrap();
    let again = index.find(r#"href="First-2.html""#).unwrap();
    assert!(first < second && second < again);
    assert!(index.contains("[2024-02-01 09:00]"));
    assert!(index.contains("Make a page"));
    assert!(index.contains(">conversation_7</a>"));
}

#[test]
fn artifact_ids_are_unique_across_pages() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("conversations.json");
    let out = dir.path().join("site");
    fs::write(&input, archive().to_string()).unwrap();
    execute(&config(&input, &out)).unwrap();

    // Pages are rendered in archive order
    let second = fs::read_to_string(out.join("Second chat.html")).unwrap();
    let first = fs::read_to_string(out.join("First.html")).unwrap();
    assert!(second.contains(r#"id="artifact-0""#));
    assert!(second.contains("&lt;h1&gt;x&lt;/h1&gt;"));
    assert!(first.contains(r#"id="artifact-1""#));
    assert!(!first.contains(r#"id="artifact-0""#));
}

#[test]
fn split_json_and_print_artifacts() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("conversations.json");
    let out = dir.path().join("site");
    fs::write(&input, archive().to_string()).unwrap();

    let mut cfg = config(&input, &out);
    cfg.split_json = true;
    cfg.print_artifacts = true;
    cfg.filename_style = FilenameStyle::Slug;
    execute(&cfg).unwrap();

    let json_text = fs::read_to_string(out.join("second-chat.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json_text).unwrap();
    assert_eq!(value["name"], "Second: chat?");
    assert!(json_text.contains("\n  \"chat_messages\""));

    let page = fs::read_to_string(out.join("second-chat.html")).unwrap();
    assert!(page.contains(r#"class="artifact-inline print-enabled""#));
}

#[test]
fn failing_record_is_counted_and_batch_continues() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("conversations.json");
    let out = dir.path().join("site");
    let archive = json!([
        {"name": "Bad", "chat_messages": [{"sender": "human", "content": 5}]},
        {"name": "Good", "chat_messages": [message("human", "2024-01-01T09:00:00Z", "fine")]}
    ]);
    fs::write(&input, archive.to_string()).unwrap();

    let summary = execute(&config(&input, &out)).unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.deleted, 0);
    assert_eq!(summary.skipped, 0);
    assert!(!out.join("Bad.html").exists());
    assert!(out.join("Good.html").exists());

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains(r#"href="Good.html""#));
    assert!(!index.contains("Bad.html"));
    assert!(summary.to_string().ends_with("Completed with 1 error(s)."));
}

#[test]
fn exports_markdown_with_index() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("conversations.json");
    let out = dir.path().join("notes");
    fs::write(&input, archive().to_string()).unwrap();

    let mut cfg = config(&input, &out);
    cfg.format = OutputFormat::Markdown;
    let summary = execute(&cfg).unwrap();
    assert_eq!(summary.written, 4);

    assert!(!out.join("First.html").exists());
    let page = fs::read_to_string(out.join("Second chat.md")).unwrap();
    assert!(page.starts_with("# Second: chat?\n\n**human** (Feb 01, 2024 09:00 AM)\n\nMake a page"));
    assert!(page.contains("### Page\n\n```html<h1>x</h1>\n```"));

    let index = fs::read_to_string(out.join("index.md")).unwrap();
    assert!(index.starts_with("# Conversations\n\n- [2024-01-01 09:00] [First](<First.md>)\n  Hello\n"));
    assert!(index.contains("[First](<First-2.md>)"));
    assert!(!out.join("index.html").exists());
}

#[test]
fn renders_single_conversation_object() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("one chat.json");
    let out = dir.path().join("site");
    fs::write(
        &input,
        json!({
            "name": "Solo",
            "chat_messages": [message("human", "2024-01-01T09:00:00Z", "1. a\n2. b")]
        })
        .to_string(),
    )
    .unwrap();

    let summary = execute(&config(&input, &out)).unwrap();
    assert_eq!(summary.written, 1);
    let page = fs::read_to_string(out.join("one chat.html")).unwrap();
    assert!(page.contains(r#"<li value="2">b</li>"#));
    assert!(!out.join("index.html").exists());
}

#[test]
fn invalid_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(&input, "[{").unwrap();
    assert!(execute(&config(&input, &dir.path().join("site"))).is_err());

    fs::write(&input, "42").unwrap();
    assert!(execute(&config(&input, &dir.path().join("site"))).is_err());
}
