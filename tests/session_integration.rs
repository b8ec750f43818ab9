use std::io::Cursor;

use rhed::app::{App, SessionEnd, Target};
use rhed::ed::EdConfig;
use rhed::palette::SourceMode;

fn verbose() -> EdConfig {
    EdConfig {
        show_prompt: true,
        verbose_errors: true,
    }
}

fn run(app: &App, script: &str) -> (SessionEnd, String) {
    let mut palette = app.open().unwrap();
    let mut out = Vec::new();
    let end = app
        .run_with(&mut palette, Cursor::new(script.as_bytes()), &mut out)
        .unwrap();
    (end, String::from_utf8(out).unwrap())
}

#[test]
fn test_write_saves_edited_text_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "one\ntwo\nthree").unwrap();

    let app = App::new(Target::File(path.clone())).with_config(verbose());
    let (end, out) = run(&app, "2d\n1a\ninserted\n.\n,s/e/E/g\nw\n");

    assert_eq!(end, SessionEnd::Written);
    assert!(out.contains("Buffer written."));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "onE\ninsErtEd\nthrEE"
    );
}

#[test]
fn test_end_of_input_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "keep me").unwrap();

    let app = App::new(Target::File(path.clone())).with_config(verbose());
    let (end, out) = run(&app, "Q\n,p\n");

    assert_eq!(end, SessionEnd::EndOfInput);
    assert!(out.contains("Buffer reset."));
    assert!(out.contains("? empty buffer"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
}

#[test]
fn test_prompt_and_output_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "alpha\nbeta").unwrap();

    let app = App::new(Target::File(path)).with_config(verbose());
    let (_, out) = run(&app, "1p\nP\n2p\n");
    assert_eq!(out, "*alpha\n*beta\n");
}

#[test]
fn test_editable_source_round_trips_markup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    std::fs::write(&path, "<div>first</div><div>a &amp; b</div>").unwrap();

    let app = App::new(Target::File(path.clone()))
        .with_source(SourceMode::Editable)
        .with_config(verbose());
    let (end, out) = run(&app, ",p\n$a\n<new>\n.\nw\n");

    assert_eq!(end, SessionEnd::Written);
    assert!(out.contains("first\na & b"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "first<br>a &amp; b<br>&lt;new&gt;"
    );
}

#[test]
fn test_json_mode_prints_result_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "x").unwrap();

    let app = App::new(Target::File(path))
        .with_config(verbose())
        .with_json(true);
    let (_, out) = run(&app, "a\ny\n.\n9p\nw\n");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        [
            r#"{"status":"input"}"#,
            r#"{"output":"","status":"input"}"#,
            r#"{"output":""}"#,
            r#"{"error":"? invalid address"}"#,
            r#"{"output":"Buffer written.","buffer":["x","y"]}"#,
        ]
    );
}

#[test]
fn test_highlight_request_ends_session_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "key=value\nother=thing").unwrap();

    let app = App::new(Target::File(path.clone()))
        .with_config(verbose())
        .with_json(true);
    let (end, out) = run(&app, "/(\\w+)=/H\n");

    assert_eq!(end, SessionEnd::Highlighted);
    let last = out.lines().last().unwrap();
    let value: serde_json::Value = serde_json::from_str(last).unwrap();
    let highlights = value["highlights"].as_array().unwrap();
    assert_eq!(highlights.len(), 2);
    assert_eq!(highlights[0]["start"], 0);
    assert_eq!(highlights[0]["end"], 3);
    assert_eq!(highlights[1]["className"], "rh-highlight-span rh-highlight-g1");
    assert_eq!(highlights[1]["start"], 10);
    assert_eq!(
        highlights[1]["from"],
        serde_json::json!({"line": 2, "column": 0})
    );
    assert_eq!(highlights[1]["to"], serde_json::json!({"line": 2, "column": 5}));
    assert_eq!(highlights[0]["to"], serde_json::json!({"line": 1, "column": 3}));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "key=value\nother=thing"
    );
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::new(Target::File(dir.path().join("missing.txt")));
    assert!(app.open().is_err());
}
