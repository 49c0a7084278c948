use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const SCENARIO: [&str; 6] = [
    "--question",
    "这次面试能过吗",
    "--at",
    "2024-01-01 09:00",
    "--entropy",
    "0x12345678",
];

struct TestEnv {
    home: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("create temp home"),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("gua");
        cmd.env("HOME", self.home.path())
            .env_remove("GUA_LOG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn json(&self, extra: &[&str]) -> Value {
        let out = self
            .cmd()
            .args(SCENARIO)
            .arg("--json")
            .args(extra)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("stdout is JSON")
    }

    fn write_config(&self, content: &str) -> std::path::PathBuf {
        let path = self.home.path().join("custom.toml");
        std::fs::write(&path, content).expect("write config");
        path
    }
}

#[test]
fn scenario_prints_pillars_and_poem() {
    let env = TestEnv::new();
    env.cmd()
        .args(SCENARIO)
        .assert()
        .success()
        .stdout(contains("癸卯 甲子 甲子 己巳"))
        .stdout(contains("诗  "))
        .stdout(contains("entropy 12345678"));
}

#[test]
fn json_output_is_deterministic() {
    let env = TestEnv::new();
    let a = env.json(&[]);
    let b = env.json(&[]);
    assert_eq!(a, b);
    let score = a["result"]["score"].as_u64().unwrap();
    assert!(score <= 100);
    assert!(a["result"]["verdict"].is_string());
    assert_eq!(a["entropy"], 0x1234_5678);
    assert!(a.get("trace").is_none());
}

#[test]
fn hex_and_decimal_entropy_agree() {
    let env = TestEnv::new();
    let hex = env.json(&[]);
    let out = env
        .cmd()
        .args(["-q", "这次面试能过吗", "--at", "2024-01-01T09:00:00"])
        .args(["--entropy", "305419896", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let dec: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(hex, dec);
}

#[test]
fn trace_and_verify_in_json() {
    let env = TestEnv::new();
    let out = env.json(&["--trace", "--verify"]);
    let trace = out["trace"].as_array().unwrap();
    assert_eq!(trace[0]["kind"], "group_start");
    assert_eq!(out["verify"]["events"].as_u64().unwrap() as usize, trace.len());
    assert_eq!(out["verify"]["root"], trace[0]["rootDigest"]);
}

#[test]
fn text_trace_lists_phases() {
    let env = TestEnv::new();
    env.cmd()
        .args(SCENARIO)
        .args(["--trace", "--verify"])
        .assert()
        .success()
        .stdout(contains("[天机] 多学科因子注入"))
        .stdout(contains("签名链校验 ok:"));
}

#[test]
fn empty_question_is_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--question", "   ", "--entropy", "1"])
        .assert()
        .failure()
        .stderr(contains("question must not be empty"));
}

#[test]
fn bad_entropy_is_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["--question", "问", "--entropy", "0xZZ"])
        .assert()
        .failure()
        .stderr(contains("0x hex"));
}

#[test]
fn config_typo_names_the_file() {
    let env = TestEnv::new();
    let path = env.write_config("[weights]\nichng = 0.3\n");
    env.cmd()
        .args(SCENARIO)
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("custom.toml"));
}

#[test]
fn extreme_thresholds_from_config_change_the_band() {
    let env = TestEnv::new();
    let path = env.write_config("[thresholds]\ngreat_good = 0.0\ngood = 0.0\nflat = 0.0\n");
    let out = env
        .cmd()
        .args(SCENARIO)
        .arg("--json")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&out).unwrap();
    let verdict = value["result"]["verdict"].as_str().unwrap();
    assert!(verdict.starts_with("大吉"), "{verdict}");
}

#[test]
fn default_config_is_read_from_home() {
    let env = TestEnv::new();
    let dir = env.home.path().join(".gua");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[playback]\nspeed = 2\n").unwrap();
    env.cmd()
        .args(SCENARIO)
        .assert()
        .failure()
        .stderr(contains("config.toml"));
}
