// CLI integration tests: JSON output envelopes and exit codes.
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

const CONFIG: &str = "\
[evalvals]
val1 = 42
val10 = [1, 5, \"hello\"]

[listvals]
val5 = 1, 2, 3, None, no, yes

[command: foo]
dir = bar

[Command: bar]
dir = baz

[results: hello]
type = add
";

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_cfgparser");
    Command::new(exe)
}

fn write_config(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).expect("write config");
    path.to_str().expect("utf8 path").to_string()
}

fn run(args: &[&str]) -> Output {
    cmd().args(args).output().expect("run cfgparser")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn stderr_json(output: &Output) -> Value {
    let text = String::from_utf8_lossy(&output.stderr);
    let line = text.lines().last().expect("error line");
    serde_json::from_str(line).expect("valid json")
}

#[test]
fn lists_categories_and_sections() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_config(temp.path(), "app.ini", CONFIG);

    let categories = stdout_json(&run(&["-f", &file, "categories"]));
    assert_eq!(categories["categories"], serde_json::json!(["command", "results"]));

    let sections = stdout_json(&run(&["-f", &file, "sections", "--category", "command"]));
    assert_eq!(sections["category"], "command");
    assert_eq!(sections["sections"], serde_json::json!(["foo", "bar"]));

    let all = stdout_json(&run(&["-f", &file, "sections"]));
    assert_eq!(all["sections"].as_array().unwrap().len(), 5);
}

#[test]
fn get_supports_eval_list_and_category() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_config(temp.path(), "app.ini", CONFIG);

    let value = stdout_json(&run(&["-f", &file, "get", "evalvals", "val1", "--eval"]));
    assert_eq!(value["value"], 42);

    let value = stdout_json(&run(&["-f", &file, "get", "evalvals", "val10", "--eval"]));
    assert_eq!(value["value"], serde_json::json!([1, 5, "hello"]));

    let value = stdout_json(&run(&[
        "-f", &file, "get", "listvals", "val5", "--list", "--eval",
    ]));
    assert_eq!(value["value"], serde_json::json!([1, 2, 3, null, false, true]));

    let value = stdout_json(&run(&[
        "-f", &file, "get", "BAR", "dir", "--category", "COMMAND",
    ]));
    assert_eq!(value["value"], "baz");

    let items = stdout_json(&run(&["-f", &file, "items", "hello", "--category", "results"]));
    assert_eq!(
        items["items"],
        serde_json::json!([{"option": "type", "value": "add"}])
    );
}

#[test]
fn missing_lookups_report_kind_and_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = write_config(temp.path(), "app.ini", CONFIG);

    let output = run(&["-f", &file, "get", "evalvals", "nope"]);
    assert_eq!(output.status.code(), Some(4));
    let err = stderr_json(&output);
    assert_eq!(err["error"]["kind"], "OptionNotFound");
    assert_eq!(err["error"]["option"], "nope");

    let output = run(&["-f", &file, "get", "zzz", "dir", "--category", "command"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stderr_json(&output)["error"]["kind"], "SectionNotFound");

    let value = stdout_json(&run(&[
        "-f", &file, "get", "evalvals", "nope", "--default", "7", "--eval",
    ]));
    assert_eq!(value["value"], 7);
}

#[test]
fn later_files_override_earlier_ones() {
    let temp = tempfile::tempdir().expect("tempdir");
    let base = write_config(temp.path(), "base.ini", CONFIG);
    let local = write_config(temp.path(), "local.ini", "[evalvals]\nval1 = 43\n");

    let value = stdout_json(&run(&[
        "-f", &base, "-f", &local, "get", "evalvals", "val1", "--eval",
    ]));
    assert_eq!(value["value"], 43);
}

#[test]
fn parse_and_io_errors() {
    let temp = tempfile::tempdir().expect("tempdir");
    let bad = write_config(temp.path(), "bad.ini", "orphan = 1\n");

    let output = run(&["-f", &bad, "categories"]);
    assert_eq!(output.status.code(), Some(5));
    let err = stderr_json(&output);
    assert_eq!(err["error"]["kind"], "Parse");
    assert_eq!(err["error"]["line"], 1);

    let missing = temp.path().join("missing.ini");
    let output = run(&["-f", missing.to_str().unwrap(), "categories"]);
    assert_eq!(output.status.code(), Some(6));
    let err = stderr_json(&output);
    assert_eq!(err["error"]["kind"], "Io");
    assert!(err["error"]["causes"].as_array().is_some());
}

#[test]
fn usage_errors_exit_two() {
    let output = run(&["categories"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr_json(&output)["error"]["kind"], "Usage");
}
