use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;
use tidylist_core::{Database, TaskFilter, TaskStatus};

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

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("tidylist/data.db")
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("tidylist");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(PathBuf::from(assert_cmd::cargo::cargo_bin!("tidylist")))
            .args(args)
            .env("HOME", &self.home)
            .env("XDG_DATA_HOME", &self.xdg_data)
            .env("XDG_CONFIG_HOME", &self.xdg_config)
            .env("XDG_STATE_HOME", &self.xdg_state)
            .env_remove("RUST_LOG")
            .env_remove("GEMINI_API_KEY")
            .output()
            .unwrap_or_else(|e| panic!("failed to execute tidylist: {e}"))
    }

    /// Run and require success, returning stdout.
    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert_success(args, &output);
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let mut full = vec!["--format", "json"];
        full.extend_from_slice(args);
        let stdout = self.ok(&full);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("invalid JSON from {args:?}: {e}\n{stdout}"))
    }
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "tidylist {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn id_of(value: &serde_json::Value) -> String {
    value["id"]
        .as_str()
        .expect("record should carry an id")
        .to_string()
}

#[test]
fn task_lifecycle_records_history() {
    let env = CliTestEnv::new();

    let work = id_of(&env.json(&["category", "add", "Work", "--color", "#10B981"]));
    let task = id_of(&env.json(&[
        "task",
        "add",
        "Write report",
        "--category",
        &work[..8],
        "--priority",
        "high",
        "--estimate",
        "60",
    ]));

    let started = env.json(&["task", "start", &task[..8]]);
    assert_eq!(started["status"], "IN_PROGRESS");

    let done = env.json(&[
        "task",
        "done",
        &task[..8],
        "--actual",
        "45",
        "--note",
        "smooth",
    ]);
    assert_eq!(done["status"], "COMPLETED");
    assert!(done["completed_at"].is_string());

    let history = env.json(&["history"]);
    assert_eq!(history["pagination"]["total"], 1);
    let record = &history["records"][0];
    assert_eq!(record["task"]["title"], "Write report");
    assert_eq!(record["category"]["name"], "Work");
    assert_eq!(record["entry"]["note"], "smooth");
    assert_eq!(record["comparison"]["kind"], "FASTER");
    assert_eq!(record["comparison"]["minutes"], 15);

    let text = env.ok(&["history"]);
    assert!(text.contains("15 min faster than estimated"), "{text}");

    // The database file lives under XDG_DATA_HOME
    let db = Database::open(&env.db_path()).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    let rows = db
        .list_tasks("local", &TaskFilter::default())
        .expect("failed to list tasks");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].task.status, TaskStatus::Completed);
}

#[test]
fn reopen_clears_completion() {
    let env = CliTestEnv::new();
    let home = id_of(&env.json(&["category", "add", "Home"]));
    let task = id_of(&env.json(&["task", "add", "Laundry", "-c", &home]));

    env.ok(&["task", "done", &task]);
    let reopened = env.json(&["task", "reopen", &task]);
    assert_eq!(reopened["status"], "PENDING");
    assert!(reopened["completed_at"].is_null());

    // No actual duration, so nothing was recorded
    assert_eq!(env.json(&["history"])["pagination"]["total"], 0);
}

#[test]
fn category_with_tasks_cannot_be_deleted() {
    let env = CliTestEnv::new();
    let work = id_of(&env.json(&["category", "add", "Work"]));
    let task = id_of(&env.json(&["task", "add", "Plan sprint", "-c", &work]));

    let output = env.run(&["category", "delete", &work]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("still has 1 task(s)"), "{stderr}");

    env.ok(&["task", "delete", &task]);
    env.ok(&["category", "delete", &work]);
    let categories = env.json(&["category", "list"]);
    assert_eq!(categories.as_array().map(Vec::len), Some(0));
}

#[test]
fn task_list_orders_open_work_first() {
    let env = CliTestEnv::new();
    let work = id_of(&env.json(&["category", "add", "Work"]));
    let low = id_of(&env.json(&["task", "add", "Low", "-c", &work, "-p", "low"]));
    env.json(&["task", "add", "Urgent", "-c", &work, "-p", "urgent"]);
    env.ok(&["task", "done", &low]);

    let rows = env.json(&["task", "list"]);
    let titles: Vec<_> = rows
        .as_array()
        .expect("task list should be an array")
        .iter()
        .map(|r| r["task"]["title"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(titles, ["Urgent", "Low"]);

    let pending = env.json(&["task", "list", "--status", "pending"]);
    assert_eq!(pending.as_array().map(Vec::len), Some(1));
}

#[test]
fn reports_work_on_empty_database() {
    let env = CliTestEnv::new();

    let dashboard = env.json(&["dashboard"]);
    assert_eq!(dashboard["total_tasks"], 0);
    assert_eq!(dashboard["total_minutes"], 0);

    let insights = env.json(&["insights"]);
    assert_eq!(insights["recommendations"][0], "LOW_COMPLETION");
    assert_eq!(insights["burnout"]["risk"], "LOW");

    let suggestions = env.json(&["suggestions"]);
    assert_eq!(suggestions[0]["key"], "IMPROVE_PRODUCTIVITY");
    assert_eq!(suggestions[0]["title"], "Improve your productivity");

    let patterns = env.json(&["patterns"]);
    assert!(patterns["peak_hour"].is_null());

    assert!(env.ok(&["dashboard"]).contains("Total tasks:      0"));
}

#[test]
fn status_reports_paths_and_counts() {
    let env = CliTestEnv::new();
    let work = id_of(&env.json(&["category", "add", "Work"]));
    let task = id_of(&env.json(&["task", "add", "Report", "-c", &work]));
    env.ok(&["task", "done", &task, "--actual", "20"]);

    let status = env.json(&["status"]);
    assert_eq!(status["user_id"], "local");
    assert_eq!(status["categories"], 1);
    assert_eq!(status["tasks"], 1);
    assert_eq!(status["history_entries"], 1);
    assert_eq!(status["tidybot_exchanges"], 0);
    assert!(status["database_size_bytes"].as_u64().unwrap_or(0) > 0);
    assert_eq!(
        status["database_path"].as_str().map(PathBuf::from),
        Some(env.db_path())
    );

    let text = env.ok(&["status"]);
    assert!(text.contains("History entries:  1"), "{text}");
}

#[test]
fn users_are_isolated() {
    let env = CliTestEnv::new();
    let work = id_of(&env.json(&["category", "add", "Work"]));
    env.json(&["task", "add", "Mine", "-c", &work]);

    let theirs = env.json(&["--user", "someone-else", "task", "list"]);
    assert_eq!(theirs.as_array().map(Vec::len), Some(0));

    let output = env.run(&["--user", "someone-else", "task", "add", "Sneaky", "-c", &work]);
    assert!(!output.status.success());
}

#[test]
fn locale_from_config_localizes_text() {
    let env = CliTestEnv::new();
    env.write_config("[profile]\nlocale = \"id\"\n");

    let text = env.ok(&["insights"]);
    assert!(
        text.contains("Fokus pada tugas dengan prioritas tinggi"),
        "expected Indonesian recommendation, got:\n{text}"
    );
}

#[test]
fn ask_validates_before_contacting_provider() {
    let env = CliTestEnv::new();

    let output = env.run(&["ask"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("message is required"), "{stderr}");

    let output = env.run(&["ask", "--kind", "fortune-telling"]);
    assert!(!output.status.success());

    // Gemini without a key is a configuration error, not a crash
    let output = env.run(&["ask", "--kind", "weekly-insight"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("GEMINI_API_KEY"), "{stderr}");

    assert!(env
        .ok(&["ask", "--recent", "5"])
        .contains("No TidyBot conversations yet."));
}

#[test]
fn invalid_config_is_reported() {
    let env = CliTestEnv::new();
    env.write_config("[analytics.burnout.overdue]\nmedium = 9\nhigh = 2\n");

    let output = env.run(&["dashboard"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "{stderr}");
}
