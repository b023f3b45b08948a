use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        seed_fixtures(&xdg_data.join("copilot-insights"));

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn write_config(&self, content: &str) {
        let dir = self.xdg_config.join("copilot-insights");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), content).expect("failed to write config");
    }
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../copilot-insights-core/tests/fixtures")
        .join(name)
}

/// Copy the core fixtures to the default data directory.
fn seed_fixtures(data_dir: &Path) {
    fs::create_dir_all(data_dir).expect("failed to create data dir");
    for name in ["metrics.json", "seats.json"] {
        fs::copy(fixture(name), data_dir.join(name)).expect("failed to copy fixture");
    }
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("copilot-insights"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute copilot-insights: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    assert!(
        output.status.success(),
        "copilot-insights {:?} failed\nstdout:\n{}\nstderr:\n{}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

const MARCH: [&str; 8] = [
    "--from",
    "2024-03-01",
    "--to",
    "2024-03-31",
    "--now",
    "2024-03-31T12:00:00Z",
    "--organization",
    "acme",
];

fn run_json(env: &CliTestEnv, extra: &[&str]) -> Value {
    let mut args: Vec<&str> = MARCH.to_vec();
    args.extend_from_slice(extra);
    args.extend_from_slice(&["--export", "json"]);

    let output = run_bin(env, &args);
    assert_success(&args, &output);
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn json_export_reads_default_data_dir() {
    let env = CliTestEnv::new();
    let report = run_json(&env, &["--frame", "weekly"]);

    assert_eq!(report["time_frame"], "weekly");
    assert_eq!(report["range"]["start"], "2024-03-01");
    assert_eq!(report["series"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["series"][0]["date"], "2024-03-04");
    assert_eq!(report["series"][0]["total_code_suggestions"], 270);
    assert_eq!(report["summary"]["total_suggestions"], 290);
    assert_eq!(report["summary"]["active_seats"], 2);
    assert_eq!(report["summary"]["adoption_rate"], 50.0);
    assert_eq!(report["summary"]["most_used_model"], "Claude Sonnet 4");
    assert_eq!(report["languages"][0]["name"], "rust");
}

#[test]
fn explicit_paths_and_language_filter() {
    let env = CliTestEnv::new();
    let metrics = fixture("metrics.json");
    let seats = fixture("seats.json");
    let report = run_json(
        &env,
        &[
            "--metrics",
            metrics.to_str().expect("utf-8 path"),
            "--seats",
            seats.to_str().expect("utf-8 path"),
            "--language",
            "python",
        ],
    );

    // the language filter narrows the series, not the headline or breakdowns
    let series_total: u64 = report["series"]
        .as_array()
        .expect("series array")
        .iter()
        .filter_map(|row| row["total_code_suggestions"].as_u64())
        .sum();
    assert_eq!(series_total, 70);
    assert_eq!(report["summary"]["total_suggestions"], 290);
    assert_eq!(report["languages"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["languages"][1]["name"], "python");
    assert_eq!(report["languages"][1]["percentage"], 35.29);
}

#[test]
fn json_includes_latest_user_changes_and_roster() {
    let env = CliTestEnv::new();
    let report = run_json(
        &env,
        &["--seat-team", "Platform", "--seat-sort", "login", "--seat-order", "asc"],
    );

    let user = &report["latest_changes"]["user_initiated_changes"];
    assert_eq!(user["by_mode"][0]["mode"], "Edit");
    assert_eq!(user["by_model"][0]["model"], "Claude Sonnet 4");
    assert_eq!(user["by_language"][0]["added"], 30);

    let seats = &report["seats"];
    assert_eq!(seats["teams"], serde_json::json!(["Platform", "Tools"]));
    assert_eq!(seats["editors"], serde_json::json!(["jetbrains", "vscode"]));
    let roster: Vec<&str> = seats["roster"]
        .as_array()
        .expect("roster array")
        .iter()
        .filter_map(|seat| seat["assignee"]["login"].as_str())
        .collect();
    assert_eq!(roster, vec!["newhire", "octocat"]);
}

#[test]
fn seat_search_and_editor_filters() {
    let env = CliTestEnv::new();
    let report = run_json(&env, &["--seat-editor", "vscode", "--seat-search", "DEPEND"]);

    let roster = report["seats"]["roster"].as_array().expect("roster array");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["assignee"]["login"], "dependabot");
}

#[test]
fn list_values_prints_filter_choices() {
    let env = CliTestEnv::new();

    let mut args: Vec<&str> = MARCH.to_vec();
    args.extend_from_slice(&["--list-values", "--export", "json"]);
    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    let values: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(values["languages"], serde_json::json!(["python", "rust"]));
    assert_eq!(values["editors"], serde_json::json!(["jetbrains", "vscode"]));

    let mut args: Vec<&str> = MARCH.to_vec();
    args.push("--list-values");
    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("LANGUAGES"));
    assert!(stdout.contains("   jetbrains"));
}

#[test]
fn config_file_sets_default_frame() {
    let env = CliTestEnv::new();
    env.write_config("[insights]\ndefault_time_frame = \"monthly\"\n");

    let report = run_json(&env, &[]);

    assert_eq!(report["time_frame"], "monthly");
    assert_eq!(report["series"][0]["date"], "2024-03");
}

#[test]
fn markdown_and_terminal_output() {
    let env = CliTestEnv::new();

    let mut args: Vec<&str> = MARCH.to_vec();
    args.extend_from_slice(&["--export", "md"]);
    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Copilot Insights"));
    assert!(stdout.contains("| Acceptance Rate | 36.21% |"));
    assert!(stdout.contains("- **Latest agent changes:** +40 / -10"));
    assert!(stdout.contains("## User-Initiated Changes"));
    assert!(stdout.contains("| Mode | Edit | 40 | 30 |"));
    assert!(stdout.contains("| Language | rust | 40 | 30 |"));
    assert!(stdout.contains("## Seats"));
    assert!(stdout.contains("| octocat | Platform | vscode/1.88.0 | 2024-01-02 |"));

    let args = MARCH.to_vec();
    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SUMMARY"));
    assert!(stdout.contains("octocat"));
}

#[test]
fn rejects_bad_arguments() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, &["--range", "fortnight"]);
    assert!(!output.status.success());

    let output = run_bin(&env, &["--from", "2024-03-10", "--to", "2024-03-01"]);
    assert!(!output.status.success());

    let mut args: Vec<&str> = MARCH.to_vec();
    args.extend_from_slice(&["--export", "xlsx"]);
    let output = run_bin(&env, &args);
    assert!(!output.status.success());

    let mut args: Vec<&str> = MARCH.to_vec();
    args.extend_from_slice(&["--seat-sort", "age"]);
    let output = run_bin(&env, &args);
    assert!(!output.status.success());
}

#[test]
fn missing_metrics_file_fails() {
    let env = CliTestEnv::new();
    fs::remove_file(env.xdg_data.join("copilot-insights/metrics.json"))
        .expect("failed to remove fixture");

    let args = MARCH.to_vec();
    let output = run_bin(&env, &args);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load insights"));
}
