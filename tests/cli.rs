//! 命令行集成测试

mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use common::SAMPLE_PAGE;

const DICTIONARY: &str = r#"{
    "Solutions": "Çözümler",
    "Industries": "Sektörler",
    "Home": "Ana Sayfa",
    "About": ""
}"#;

/// 在隔离的临时目录中运行，避免读到工作目录里的配置文件与区域变量
fn langmark(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("langmark").unwrap();
    cmd.current_dir(dir)
        .env_remove("LANG")
        .env_remove("LANGMARK_LOCALE")
        .env("LANGMARK_LOG_LEVEL", "error");
    cmd
}

fn write_fixtures(dir: &Path) {
    fs::write(dir.join("index.html"), SAMPLE_PAGE).unwrap();
    fs::write(dir.join("dict.json"), DICTIONARY).unwrap();
}

#[test]
fn test_extract_writes_json_skeleton() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    langmark(dir.path())
        .args(["extract", "index.html", "-o", "strings.json"])
        .assert()
        .success();

    let json = fs::read_to_string(dir.path().join("strings.json")).unwrap();
    let strings: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(strings["Solutions"], "");
    assert_eq!(strings["Our Industries"], "");
    assert!(strings.get("Toggle theme").is_some());
}

#[test]
fn test_extract_writes_script_global() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    langmark(dir.path())
        .args(["extract", "index.html", "-o", "strings.js", "--variable", "site_strings"])
        .assert()
        .success();

    let js = fs::read_to_string(dir.path().join("strings.js")).unwrap();
    assert!(js.starts_with("const site_strings = {\n"));
    assert!(js.contains("    \"Solutions\": \"\",\n"));
    assert!(js.ends_with("};\n"));
}

#[test]
fn test_extract_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    let output = langmark(dir.path())
        .args(["extract", "index.html"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"Industries\": \"\""));
}

#[test]
fn test_translate_follows_locale_signal() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    let output = langmark(dir.path())
        .env("LANGMARK_LOCALE", "tr_TR.UTF-8")
        .args(["translate", "index.html", "-d", "dict.json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).unwrap();
    assert!(html.contains("<h1>Çözümler</h1>"));
    assert!(html.contains("id=\"lang-toggle-btn\""));
    assert!(html.contains("<code>Solutions</code>"));
}

#[test]
fn test_translate_with_explicit_language() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    langmark(dir.path())
        .env("LANGMARK_LOCALE", "en-US")
        .args(["translate", "index.html", "-d", "dict.json", "--lang", "tr", "-o", "out.html"])
        .assert()
        .success();

    let html = fs::read_to_string(dir.path().join("out.html")).unwrap();
    assert!(html.contains("<a href=\"/\">Ana Sayfa</a>"));
    assert!(html.contains("class=\"lang-tr-active\""));
}

#[test]
fn test_translate_persists_preference_in_state_file() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    langmark(dir.path())
        .env("LANGMARK_LOCALE", "en-US")
        .args(["translate", "index.html", "-d", "dict.json", "--state", "state.redb"])
        .args(["--lang", "tr", "-o", "first.html"])
        .assert()
        .success();

    // 第二次运行不指定语言，区域信号为英文，仍然沿用保存的偏好
    langmark(dir.path())
        .env("LANGMARK_LOCALE", "en-US")
        .args(["translate", "index.html", "-d", "dict.json", "--state", "state.redb"])
        .args(["-o", "second.html"])
        .assert()
        .success();

    let html = fs::read_to_string(dir.path().join("second.html")).unwrap();
    assert!(html.contains("<h1>Çözümler</h1>"));
}

#[test]
fn test_translate_accepts_script_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    fs::write(
        dir.path().join("dict.js"),
        "const tr_translations = {\n    \"Industries\": \"Sektörler\",\n};\n",
    )
    .unwrap();

    let output = langmark(dir.path())
        .args(["translate", "index.html", "-d", "dict.js", "--lang", "tr"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).unwrap();
    assert!(html.contains("<a href=\"/industries\">Sektörler</a>"));
}

#[test]
fn test_unknown_language_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    let output = langmark(dir.path())
        .args(["translate", "index.html", "-d", "dict.json", "--lang", "de"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("de"));
}

#[test]
fn test_missing_dictionary_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());

    langmark(dir.path())
        .args(["translate", "index.html", "-d", "missing.json"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    fs::write(dir.path().join("langmark.toml"), "alt_locale = \"tr\"\ndebounce_ms = 0\n").unwrap();

    // 工作目录中的配置会被自动加载并校验
    langmark(dir.path())
        .args(["translate", "index.html", "-d", "dict.json"])
        .assert()
        .failure();
}

#[test]
fn test_env_variable_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    fs::write(dir.path().join("langmark.toml"), "alt_locale = \"tr\"\ndebounce_ms = 0\n").unwrap();

    // 已设置的变量覆盖文件中的无效值，校验通过
    langmark(dir.path())
        .env("LANGMARK_DEBOUNCE_MS", "50")
        .args(["translate", "index.html", "-d", "dict.json"])
        .assert()
        .success();
}

#[test]
fn test_env_lists_variables() {
    let dir = tempfile::tempdir().unwrap();

    let output = langmark(dir.path()).arg("env").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("LANGMARK_DEBOUNCE_MS"));
    assert!(stdout.contains("LANGMARK_LOCALE"));
}
