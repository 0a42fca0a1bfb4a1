// Integration testing can be done either by calling library functions directly or by invoking your CLI as a subprocess.
use predicates::prelude::*;
use std::fs;

fn cfgenerator() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("cfgenerator").unwrap()
}

#[test]
fn renders_jsonnet_from_stdin_to_stdout() {
    let volume = tempfile::tempdir().unwrap();
    fs::write(volume.path().join("PORT"), "8080").unwrap();
    let mut cmd = cfgenerator();

    cmd.arg(volume.path())
        .write_stdin(r#"{"port": std.extVar("PORT")}"#);

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value, serde_json::json!({"port": "8080"}));
}

#[test]
fn renders_plain_template() {
    let volume = tempfile::tempdir().unwrap();
    let name = volume.path().join("NAME");
    fs::write(&name, "World").unwrap();
    let mut cmd = cfgenerator();

    cmd.arg("-interpreter=plain")
        .arg(&name)
        .write_stdin("Hello {{.NAME}}");

    cmd.assert().success().stdout("Hello World").stderr("");
}

#[test]
fn writes_every_output() {
    let dir = tempfile::tempdir().unwrap();
    let volume = dir.path().join("configmap");
    fs::create_dir(&volume).unwrap();
    fs::write(volume.join("API_PORT"), "80").unwrap();
    let template = dir.path().join("config.jsonnet");
    fs::write(&template, "{ address: '0.0.0.0:' + std.extVar('API_PORT') }").unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    let mut cmd = cfgenerator();

    cmd.arg("-in")
        .arg(&template)
        .arg(format!("-out={}", first.display()))
        .arg("--out")
        .arg(&second)
        .arg(&volume);

    cmd.assert().success().stdout("");

    let first = fs::read_to_string(first).unwrap();
    let second = fs::read_to_string(second).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("0.0.0.0:80"));
}

#[test]
fn missing_volume_fails_without_creating_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("config.json");
    let missing = dir.path().join("secrets");
    let mut cmd = cfgenerator();

    cmd.arg(format!("-out={}", output.display()))
        .arg(&missing)
        .write_stdin("{}");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("secrets"));
    assert!(!output.exists());
}

#[test]
fn unknown_interpreter_fails() {
    let mut cmd = cfgenerator();

    cmd.arg("-interpreter=yaml").arg("/does/not/exist");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unsupported interpreter 'yaml'"));
}

#[test]
fn undefined_variable_fails() {
    let mut cmd = cfgenerator();

    cmd.write_stdin(r#"std.extVar("DATABASE_PASSWORD")"#);

    cmd.assert().failure().code(1).stdout("");
}
