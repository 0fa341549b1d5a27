use std::process::Command;

fn fixture_path() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/tests/fixtures/smart-home/")
}

fn umlgen_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_umlgen"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_analyze_sample_project() {
    let output = umlgen_cmd()
        .args(["analyze", &fixture_path()])
        .output()
        .expect("failed to run umlgen analyze");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "umlgen analyze failed: stdout={stdout}, stderr={stderr}"
    );
    assert!(
        stdout.contains("7 entities (0 external), 5 relationships"),
        "unexpected summary: {stdout}"
    );
    assert!(stdout.contains("home.SmartHomeController -[composition]-> home.Logger [1] (logger)"));
    assert!(stdout.contains("home.SmartHomeController -[aggregation]-> home.Room [0..*] (rooms)"));
    assert!(stdout.contains("home.Room -[association]-> home.Thermostat [1] (thermostat)"));
    assert!(stdout.contains("home.Light -[inheritance]-> home.ADevice"));
    assert!(stdout.contains("home.Light -[realization]-> home.Switchable"));
}

#[test]
fn test_json_output() {
    let output = umlgen_cmd()
        .args(["analyze", &fixture_path(), "--format", "json"])
        .output()
        .expect("failed to run umlgen analyze");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON");
    assert_eq!(json["entities"].as_array().map(Vec::len), Some(7));
    let relationships = json["relationships"].as_array().expect("relationships array");
    assert_eq!(relationships.len(), 5);
    assert!(relationships.iter().any(|r| r["source"] == "home.SmartHomeController"
        && r["target"] == "home.Logger"
        && r["kind"] == "composition"
        && r["multiplicity"] == "1"));
    assert!(json["failures"].as_array().is_some_and(Vec::is_empty));
}

#[test]
fn test_glsp_output() {
    let output = umlgen_cmd()
        .args(["analyze", &fixture_path(), "--format", "glsp", "--compact"])
        .output()
        .expect("failed to run umlgen analyze");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end().lines().count(), 1, "compact output is one line");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(7));
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(5));
}

#[test]
fn test_mermaid_and_dot_output() {
    let mermaid = umlgen_cmd()
        .args(["analyze", &fixture_path(), "--format", "mermaid"])
        .output()
        .expect("failed to run umlgen analyze");
    let stdout = String::from_utf8_lossy(&mermaid.stdout);
    assert!(stdout.starts_with("classDiagram\n"));
    assert!(stdout.contains("home_SmartHomeController *-- \"1\" home_Logger : logger"));

    let dot = umlgen_cmd()
        .args(["analyze", &fixture_path(), "--format", "dot"])
        .output()
        .expect("failed to run umlgen analyze");
    let stdout = String::from_utf8_lossy(&dot.stdout);
    assert!(stdout.starts_with("digraph classes {"));
    assert!(stdout.contains("home_Light -> home_ADevice [arrowhead=empty];"));
}

#[test]
fn test_external_policy_keeps_unknown_types() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::write(
        dir.path().join("Panel.java"),
        "package ui;\n\npublic class Panel {\n    private Widget widget;\n}\n",
    )
    .unwrap();

    let output = umlgen_cmd()
        .args(["analyze", dir.path().to_str().unwrap()])
        .args(["--unknown-types", "external"])
        .output()
        .expect("failed to run umlgen analyze");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout={stdout}");
    assert!(stdout.contains("2 entities (1 external), 1 relationships"));
    assert!(stdout.contains("ui.Panel -[association]-> Widget [0..1] (widget)"));
}

#[test]
fn test_strict_mode_reports_unresolved_types() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::write(
        dir.path().join("Panel.java"),
        "package ui;\n\npublic class Panel {\n    private Widget widget;\n}\n",
    )
    .unwrap();

    let output = umlgen_cmd()
        .args(["analyze", dir.path().to_str().unwrap(), "--strict"])
        .output()
        .expect("failed to run umlgen analyze");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "stderr={stderr}");
    assert!(
        stderr.contains("unresolved type `Widget` referenced from `ui.Panel`"),
        "stderr={stderr}"
    );
}

#[test]
fn test_missing_directory_is_an_error() {
    let output = umlgen_cmd()
        .args(["analyze", "/definitely/not/here"])
        .output()
        .expect("failed to run umlgen analyze");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("is not a directory"));
}

#[test]
fn test_config_excludes_files() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::create_dir_all(dir.path().join("gen")).unwrap();
    std::fs::write(dir.path().join("A.java"), "class A { private B b; }\n").unwrap();
    std::fs::write(dir.path().join("gen/B.java"), "class B {}\n").unwrap();
    std::fs::write(
        dir.path().join(".umlgen.toml"),
        "[project]\nexclude_patterns = [\"gen/**\"]\n",
    )
    .unwrap();

    let output = umlgen_cmd()
        .args(["analyze", dir.path().to_str().unwrap()])
        .output()
        .expect("failed to run umlgen analyze");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout={stdout}");
    assert!(stdout.contains("1 entities (0 external), 0 relationships"));
}

#[test]
fn test_init_creates_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = umlgen_cmd()
        .args(["init"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run umlgen init");

    assert!(output.status.success(), "init should succeed");

    let config_path = dir.path().join(".umlgen.toml");
    assert!(config_path.exists(), ".umlgen.toml should be created");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[resolver]"), "should contain [resolver]");
    assert!(content.contains("[output]"), "should contain [output]");

    let again = umlgen_cmd()
        .args(["init"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run umlgen init");
    assert_eq!(again.status.code(), Some(2), "init without --force refuses");
}

#[test]
fn test_mock_java_scenarios() {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let output = umlgen_cmd()
        .args(["analyze", &format!("{manifest_dir}/tests/fixtures/mock-java/")])
        .args(["--unknown-types", "external"])
        .output()
        .expect("failed to run umlgen analyze");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout={stdout}");

    assert!(stdout.contains("7 entities (5 external), 7 relationships"), "{stdout}");
    for edge in [
        "mock.java.IntegrationTest -[composition]-> Logger [1] (logger)",
        // `room` is only handed to `logger.log`, so it stays a dependency
        "mock.java.IntegrationTest -[dependency]-> Room (room)",
        "mock.java.IntegrationTest -[association]-> Thermostat [1] (thermostat)",
        "mock.java.SmartHomeController -[aggregation]-> ADevice [0..*] (devices)",
        "mock.java.SmartHomeController -[aggregation]-> Room [0..*] (rooms)",
        "mock.java.SmartHomeController -[aggregation]-> Light [0..*] (lightThermostatMap)",
        "mock.java.SmartHomeController -[aggregation]-> Thermostat [0..*] (lightThermostatMap)",
    ] {
        assert!(stdout.contains(edge), "missing `{edge}` in {stdout}");
    }
}

#[test]
fn test_broken_file_does_not_fail_the_run() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::write(
        dir.path().join("Good.java"),
        "package home;\n\npublic class Good {\n    private Room room;\n}\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("Bad.java"),
        "package home;\n\npublic class Bad {\n    private Room ;\n    public void (int x) {}\n}\n",
    )
    .unwrap();

    let output = umlgen_cmd()
        .args(["analyze", dir.path().to_str().unwrap()])
        .output()
        .expect("failed to run umlgen analyze");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stdout={stdout}, stderr={stderr}");
    assert!(stdout.contains("home.Good"), "{stdout}");
}

#[test]
fn test_strict_mode_accepts_imported_library_types() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    std::fs::write(
        dir.path().join("Hub.java"),
        "package home;\n\nimport java.util.concurrent.atomic.AtomicInteger;\n\n\
         public class Hub {\n    private AtomicInteger counter;\n}\n",
    )
    .unwrap();

    let output = umlgen_cmd()
        .args(["analyze", dir.path().to_str().unwrap(), "--strict"])
        .output()
        .expect("failed to run umlgen analyze");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr={stderr}");
}
