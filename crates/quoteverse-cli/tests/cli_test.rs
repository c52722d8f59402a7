use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

const CORPUS: &str = r#"[
    {"id": 1, "text": "Hope springs eternal", "author": "Alexander Pope", "book": "An Essay on Man", "coords": [0.1, 0.2]},
    {"id": 2, "text": "To be or not to be", "author": "William Shakespeare", "book": "Hamlet", "coords": [-0.4, 0.3]},
    {"id": "q-3", "text": "The only thing we have to fear is fear itself", "author": "Franklin D. Roosevelt"},
    {"id": 4, "text": "Hope is the thing with feathers", "author": "Emily Dickinson", "coords": [0.2, -0.1]}
]"#;

fn quoteverse(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_quoteverse"))
        .args(args)
        .current_dir(dir)
        .env_remove("QUOTEVERSE_BASE_URL")
        .env_remove("QUOTEVERSE_MAX_DISTANCE")
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run quoteverse")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn corpus_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("corpus.json"), CORPUS).unwrap();
    dir
}

#[test]
fn test_config_json_reports_sources() {
    let dir = tempfile::tempdir().unwrap();
    let output = quoteverse(&["config", "--json", "--base-url", "http://quotes.test"], dir.path());
    let json = json_stdout(&output);

    assert_eq!(json["status"], "success");
    let base_url = &json["data"]["values"]["base_url"];
    assert_eq!(base_url["value"], "http://quotes.test");
    assert_eq!(base_url["source"], "Cli");
    assert_eq!(json["data"]["values"]["max_distance"]["source"], "Default");
}

#[test]
fn test_config_file_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("quoteverse.toml"), "max_distance = 0.3\n").unwrap();

    let json = json_stdout(&quoteverse(&["config", "--json"], dir.path()));
    assert_eq!(json["data"]["values"]["max_distance"]["value"], "0.3");
    assert_eq!(json["data"]["values"]["max_distance"]["source"], "File");
}

#[test]
fn test_offline_load() {
    let dir = corpus_dir();
    let json = json_stdout(&quoteverse(&["--offline", "corpus.json", "load", "--json"], dir.path()));

    let data = &json["data"];
    assert_eq!(data["loaded"], 4);
    assert_eq!(data["plotted"], 3);
    assert_eq!(data["unplaced"], 1);
    assert_eq!(data["points"].as_array().unwrap().len(), 3);
}

#[test]
fn test_offline_search_ranks_by_distance() {
    let dir = corpus_dir();
    let json = json_stdout(&quoteverse(
        &["--offline", "corpus.json", "search", "hope springs", "--json"],
        dir.path(),
    ));

    let data = &json["data"];
    assert_eq!(data["mode"], "quote");
    assert_eq!(data["query"], "hope springs");
    let results = data["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0]["id"], "1");
    assert_eq!(results[0]["rank"], 1);
}

#[test]
fn test_offline_author_search() {
    let dir = corpus_dir();
    let json = json_stdout(&quoteverse(
        &["--offline", "corpus.json", "search", "dickinson", "-m", "author", "--json"],
        dir.path(),
    ));

    let results = json["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["author"], "Emily Dickinson");
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = quoteverse(&["--config", "nope.toml", "config"], dir.path());
    assert!(!output.status.success());
}

#[test]
fn test_blank_search_exits_with_hint() {
    let dir = corpus_dir();
    let mut child = Command::new(env!("CARGO_BIN_EXE_quoteverse"))
        .args(["--offline", "corpus.json", "search", "   ", "--json"])
        .current_dir(dir.path())
        .env("RUST_LOG", "error")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let started = Instant::now();
    while child.try_wait().unwrap().is_none() {
        if started.elapsed() > Duration::from_secs(10) {
            child.kill().unwrap();
            panic!("blank search did not exit");
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let json = json_stdout(&child.wait_with_output().unwrap());
    let data = &json["data"];
    assert_eq!(data["added"], 0);
    assert!(data["results"].as_array().unwrap().is_empty());
    assert_eq!(
        data["message"],
        "Type in the search bar to look for quotes. Press Enter to submit."
    );
}
