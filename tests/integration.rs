use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn dm_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dm");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("alpha.md"),
        "# Alpha Document\n\nThis is the alpha document about Rust programming.\n\nIt contains information about cargo and crates.",
    ).unwrap();
    fs::write(
        files_dir.join("beta.md"),
        "# Beta Document\n\nThis document discusses Python and machine learning.\n\nDeep learning frameworks like PyTorch are covered.",
    ).unwrap();
    fs::write(
        files_dir.join("gamma.txt"),
        "Gamma plain text file.\n\nContains notes about deployment and infrastructure.\n\nKubernetes and Docker are mentioned here.",
    ).unwrap();
    fs::write(files_dir.join("logo.png"), "not text").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/deskmate.sqlite"

[chunking]
chunk_size = 500
chunk_overlap = 50

[retrieval]
top_k = 3

[ingest]
include_globs = ["**/*.md", "**/*.txt"]
"#,
        root.display()
    );

    let config_path = config_dir.join("deskmate.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_dm(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = dm_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run dm binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Init, create a knowledge base named `docs`, and add the test files.
fn setup_populated_kb() -> (TempDir, PathBuf, String) {
    let (tmp, config_path) = setup_test_env();
    run_dm(&config_path, &["init"]);
    run_dm(&config_path, &["kb", "create", "docs", "--description", "test docs"]);

    let files = tmp.path().join("files");
    let (stdout, stderr, success) =
        run_dm(&config_path, &["kb", "add", "docs", files.to_str().unwrap()]);
    assert!(success, "kb add failed: stdout={}, stderr={}", stdout, stderr);
    (tmp, config_path, stdout)
}

/// Document id printed by `kb add` for `file_name`.
fn added_doc_id(add_output: &str, file_name: &str) -> String {
    let line = add_output
        .lines()
        .find(|l| l.trim_start().starts_with(&format!("+ {} (", file_name)))
        .unwrap_or_else(|| panic!("{} not in output: {}", file_name, add_output));
    let start = line.find('(').unwrap() + 1;
    let end = line.rfind(')').unwrap();
    line[start..end].to_string()
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_dm(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/deskmate.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_dm(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_dm(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_kb_create_and_list() {
    let (_tmp, config_path) = setup_test_env();
    run_dm(&config_path, &["init"]);

    let (stdout, _, success) = run_dm(&config_path, &["kb", "list"]);
    assert!(success);
    assert!(stdout.contains("No knowledge bases."));

    let (stdout, stderr, success) = run_dm(&config_path, &["kb", "create", "handbook"]);
    assert!(success, "create failed: {}", stderr);
    assert!(stdout.contains("Created knowledge base: handbook"));

    let (stdout, _, _) = run_dm(&config_path, &["kb", "list"]);
    assert!(stdout.contains("handbook"));
}

#[test]
fn test_kb_add_directory() {
    let (_tmp, _config_path, stdout) = setup_populated_kb();
    assert!(stdout.contains("+ alpha.md"));
    assert!(stdout.contains("+ gamma.txt"));
    assert!(!stdout.contains("logo.png"));
    assert!(stdout.contains("Added 3 document(s), skipped 0 duplicate(s), 0 failed."));
}

#[test]
fn test_kb_add_skips_duplicates() {
    let (tmp, config_path, _) = setup_populated_kb();

    let files = tmp.path().join("files");
    let (stdout, _, success) =
        run_dm(&config_path, &["kb", "add", "docs", files.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("Added 0 document(s), skipped 3 duplicate(s), 0 failed."));
}

#[test]
fn test_kb_add_reports_unsupported_file() {
    let (tmp, config_path) = setup_test_env();
    run_dm(&config_path, &["init"]);
    run_dm(&config_path, &["kb", "create", "docs"]);

    let png = tmp.path().join("files/logo.png");
    let (stdout, _, success) = run_dm(&config_path, &["kb", "add", "docs", png.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("unsupported file type"));
    assert!(stdout.contains("1 failed."));
}

#[test]
fn test_kb_show_lists_documents() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (stdout, _, success) = run_dm(&config_path, &["kb", "show", "docs"]);
    assert!(success);
    assert!(stdout.contains("name:        docs"));
    assert!(stdout.contains("description: test docs"));
    assert!(stdout.contains("--- Documents (3) ---"));
    assert!(stdout.contains("beta.md"));
}

#[test]
fn test_search_keyword() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (stdout, stderr, success) = run_dm(&config_path, &["search", "docs", "cargo crates"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("alpha.md #1/1"));
    assert!(!stdout.contains("beta.md"));
}

#[test]
fn test_search_deterministic() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (first, _, _) = run_dm(&config_path, &["search", "docs", "document about"]);
    let (second, _, _) = run_dm(&config_path, &["search", "docs", "document about"]);
    assert_eq!(first, second);
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (stdout, _, success) = run_dm(&config_path, &["search", "docs", "zzzyyyxxx"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_single_char_query() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (stdout, _, success) = run_dm(&config_path, &["search", "docs", "a b c"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_missing_kb() {
    let (_tmp, config_path) = setup_test_env();
    run_dm(&config_path, &["init"]);

    let (_, stderr, success) = run_dm(&config_path, &["search", "nope", "query"]);
    assert!(!success);
    assert!(stderr.contains("knowledge base not found"));
}

#[test]
fn test_kb_remove_document() {
    let (_tmp, config_path, add_output) = setup_populated_kb();
    let doc_id = added_doc_id(&add_output, "alpha.md");

    let (stdout, stderr, success) = run_dm(&config_path, &["kb", "remove", "docs", &doc_id]);
    assert!(success, "remove failed: {}", stderr);
    assert!(stdout.contains("Removed document"));

    let (stdout, _, _) = run_dm(&config_path, &["search", "docs", "cargo"]);
    assert!(stdout.contains("No results."));

    let (_, stderr, success) = run_dm(&config_path, &["kb", "remove", "docs", &doc_id]);
    assert!(!success);
    assert!(stderr.contains("document not found"));
}

#[test]
fn test_kb_update_and_delete() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (_, stderr, success) = run_dm(&config_path, &["kb", "update", "docs"]);
    assert!(!success);
    assert!(stderr.contains("Nothing to update"));

    let (stdout, _, success) =
        run_dm(&config_path, &["kb", "update", "docs", "--name", "manuals"]);
    assert!(success);
    assert!(stdout.contains("Updated knowledge base: manuals"));

    let (_, _, success) = run_dm(&config_path, &["kb", "show", "docs"]);
    assert!(!success);

    let (_, _, success) = run_dm(&config_path, &["kb", "delete", "manuals"]);
    assert!(success);
    let (stdout, _, _) = run_dm(&config_path, &["kb", "list"]);
    assert!(stdout.contains("No knowledge bases."));
}

#[test]
fn test_kb_reindex() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (stdout, stderr, success) = run_dm(&config_path, &["kb", "reindex", "docs"]);
    assert!(success, "reindex failed: {}", stderr);
    assert!(stdout.contains(": 3 chunks"));
}

#[test]
fn test_ask_dry_run_includes_context() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (stdout, stderr, success) = run_dm(
        &config_path,
        &["ask", "docs", "how do cargo crates work", "--dry-run"],
    );
    assert!(success, "ask failed: {}", stderr);
    assert!(stdout.contains("--- System ---"));
    assert!(stdout.contains("[alpha.md #1]"));
    assert!(stdout.contains("--- User ---\nhow do cargo crates work"));
}

#[test]
fn test_ask_dry_run_falls_back_to_preview() {
    let (_tmp, config_path, _) = setup_populated_kb();

    let (stdout, _, success) = run_dm(&config_path, &["ask", "docs", "zzzyyyxxx", "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("[alpha.md]"));
    assert!(stdout.contains("[beta.md]"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_dm(&tmp.path().join("missing.toml"), &["kb", "list"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

fn write_json(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

const WEEK: &str = r#"[
  [{"project":"A","content":"设计接口","progress":30,"category":"progress"},
   {"project":"B","content":"排查告警","category":"issue"}],
  [{"project":"A","content":"联调完成","progress":80,"category":"progress"}],
  [{"project":"C","content":"上线","progress":100,"category":"completed"}]
]"#;

#[test]
fn test_report_weekly_text_without_config() {
    let tmp = TempDir::new().unwrap();
    let file = write_json(tmp.path(), "week.json", WEEK);

    // Report commands never read the config file.
    let (stdout, stderr, success) = run_dm(
        &tmp.path().join("missing.toml"),
        &["report", "weekly", file.to_str().unwrap()],
    );
    assert!(success, "report failed: {}", stderr);
    assert!(stdout.starts_with("本周共推进3个项目，完成1个，其余项目按计划推进中。"));
    assert!(stdout.contains("1. A（进行中，进度 80%）\n   本周推进50%（当前进度80%）。联调完成"));
    assert!(stdout.contains("3. C（已完成，进度 100%）\n   本周完成。主要工作：上线"));
}

#[test]
fn test_report_weekly_json() {
    let tmp = TempDir::new().unwrap();
    let file = write_json(tmp.path(), "week.json", WEEK);

    let (stdout, _, success) = run_dm(
        &tmp.path().join("missing.toml"),
        &["report", "weekly", file.to_str().unwrap(), "--json"],
    );
    assert!(success);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let items = report["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1]["project"], "B");
    assert_eq!(items[1]["category"], "issue");
    assert_eq!(items[1]["progress"], 0);
}

#[test]
fn test_report_monthly_from_weekly() {
    let tmp = TempDir::new().unwrap();
    let file = write_json(
        tmp.path(),
        "month.json",
        r#"[
  {"items":[{"project":"A","content":"c1","progress":40,"category":"progress"}],"summary":"w1"},
  {"items":[{"project":"A","content":"c2","progress":80,"category":"progress"},
            {"project":"B","content":"done","progress":100,"category":"completed"}],"summary":"w2"}
]"#,
    );

    let (stdout, _, success) = run_dm(
        &tmp.path().join("missing.toml"),
        &["report", "monthly", file.to_str().unwrap(), "--json"],
    );
    assert!(success);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["items"][0]["content"], "当前进度80%。本月工作：c1；c2");
    assert_eq!(report["items"][1]["content"], "本月已完成。累计工作：done");
    assert_eq!(
        report["summary"],
        "本月共涉及2个项目：已完成1个，进行中1个。整体工作进展顺利，各项目按计划推进。"
    );
}

#[test]
fn test_report_monthly_from_daily() {
    let tmp = TempDir::new().unwrap();
    let file = write_json(tmp.path(), "days.json", WEEK);

    let (stdout, _, success) = run_dm(
        &tmp.path().join("missing.toml"),
        &["report", "monthly", file.to_str().unwrap(), "--from-daily"],
    );
    assert!(success);
    assert!(stdout.starts_with("本月共涉及3个项目：已完成1个，进行中1个。"));
    assert!(stdout.contains("当前进度80%。本月工作：设计接口；联调完成"));
}

#[test]
fn test_report_rejects_out_of_range_progress() {
    let tmp = TempDir::new().unwrap();
    let file = write_json(
        tmp.path(),
        "bad.json",
        r#"[[{"project":"A","content":"x","progress":150,"category":"progress"}]]"#,
    );

    let (_, stderr, success) = run_dm(
        &tmp.path().join("missing.toml"),
        &["report", "weekly", file.to_str().unwrap()],
    );
    assert!(!success);
    assert!(stderr.contains("0..=100"));
}
