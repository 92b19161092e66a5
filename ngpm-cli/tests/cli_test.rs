//! End-to-end tests for the `ngpm` binary
//!
//! Every test runs in its own temporary directory with an empty config file
//! and a registry URL nothing listens on, so no test touches the network.

use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

struct TestEnv {
    _temp_dir: TempDir,
    root: PathBuf,
    registry_url: String,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let root = temp_dir.path().to_path_buf();
        fs::write(root.join("config.yaml"), "").expect("write config");

        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let registry_url = format!("http://{}/packages", listener.local_addr().unwrap());
        drop(listener);

        Self {
            _temp_dir: temp_dir,
            root,
            registry_url,
        }
    }

    fn packages(&self) -> PathBuf {
        self.root.join("packages")
    }

    fn installed(&self) -> PathBuf {
        self.root.join("installed")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ngpm"));
        cmd.current_dir(&self.root)
            .env_remove("RUST_LOG")
            .env_remove("NGPM_PACKAGES_DIR")
            .env_remove("NGPM_INSTALLED_DIR")
            .env_remove("NGPM_REGISTRY_URL")
            .arg("--config")
            .arg(self.root.join("config.yaml"))
            .arg("--registry-url")
            .arg(&self.registry_url);
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("run ngpm")
    }

    fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = self
            .cmd()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn ngpm");
        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(stdin.as_bytes())
            .expect("write stdin");
        child.wait_with_output().expect("wait ngpm")
    }

    /// Create `packages/<name>@v-<version>/` with the given files
    fn seed_fetched(&self, key: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.packages().join(key);
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        dir
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn code(output: &Output) -> i32 {
    output.status.code().expect("exit code")
}

fn manifest(build: Option<&str>) -> String {
    match build {
        Some(cmd) => {
            format!(r#"{{"name":"demo","version":"1.0.0","scripts":{{"build":"{cmd}"}}}}"#)
        }
        None => r#"{"name":"demo","version":"1.0.0"}"#.to_string(),
    }
}

#[test]
fn test_startup_creates_installed_dir() {
    let env = TestEnv::new();
    let output = env.run(&["list"]);

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(env.installed().exists());
    assert!(stdout(&output).contains("No packages found"));
}

#[test]
fn test_list_json_reports_manifest_packages_only() {
    let env = TestEnv::new();
    env.seed_fetched("demo@v-1.0.0", &[("package.json", manifest(None).as_str())]);
    env.seed_fetched("bare@v-2.0.0", &[("package.zip", "PK")]);

    let output = env.run(&["list", "--json"]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    let listed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "demo");
    assert_eq!(listed[0]["version"], "1.0.0");
}

#[test]
fn test_list_table() {
    let env = TestEnv::new();
    env.seed_fetched("demo@v-1.0.0", &[("package.json", manifest(None).as_str())]);

    let output = env.run(&["list"]);
    let out = stdout(&output);
    assert!(out.contains("Name"));
    assert!(out.contains("demo"));
    assert!(out.contains("1.0.0"));
}

#[test]
fn test_install_uses_already_fetched_package() {
    let env = TestEnv::new();
    env.seed_fetched("demo@v-1.0.0", &[("package.zip", "PK")]);

    let output = env.run(&["install", "demo", "1.0.0"]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Package demo@1.0.0 is already downloaded.\nPackage demo@1.0.0 installed.\n"
    );
    assert_eq!(
        fs::read(env.installed().join("demo@v-1.0.0/package.zip")).unwrap(),
        b"PK"
    );

    let again = env.run(&["install", "demo", "1.0.0"]);
    assert_eq!(code(&again), 3);
    assert!(stdout(&again).contains("Package demo@1.0.0 is already installed."));
}

#[test]
fn test_install_with_unreachable_registry_is_transport_error() {
    let env = TestEnv::new();

    let output = env.run(&["install", "demo", "1.0.0"]);

    assert_eq!(code(&output), 10);
    assert!(stderr(&output).contains("fetch failed for demo@1.0.0"));
    assert!(!env.packages().join("demo@v-1.0.0").exists());
    assert!(!env.installed().join("demo@v-1.0.0").exists());
}

#[test]
fn test_fetch_into_unusable_packages_area_is_storage_error() {
    let env = TestEnv::new();
    fs::write(env.packages(), "not a dir").unwrap();

    let output = env.run(&["fetch", "demo", "1.0.0"]);

    assert_eq!(code(&output), 11, "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("fetch failed for demo@1.0.0"));
    assert!(env.packages().is_file());
}

#[test]
fn test_package_shorthand() {
    let env = TestEnv::new();
    env.seed_fetched("demo@v-1.0.0", &[("package.zip", "PK")]);

    let output = env.run(&["install", "demo@1.0.0"]);
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(env.installed().join("demo@v-1.0.0/package.zip").exists());

    let output = env.run(&["build", "demo"]);
    assert_eq!(code(&output), 5);
    assert!(stderr(&output).contains("not of the form <name>@<version>"));
}

#[test]
fn test_invalid_identifier_is_rejected() {
    let env = TestEnv::new();

    let output = env.run(&["fetch", "../escape", "1.0.0"]);

    assert_eq!(code(&output), 5);
    assert!(stderr(&output).contains("contains '/'"));
    assert!(!env.packages().exists());
}

#[test]
fn test_build_not_installed_and_no_script() {
    let env = TestEnv::new();

    let output = env.run(&["build", "demo", "1.0.0"]);
    assert_eq!(code(&output), 4);
    assert_eq!(stdout(&output), "Package demo@1.0.0 is not installed.\n");

    env.seed_fetched("demo@v-1.0.0", &[("package.json", manifest(None).as_str())]);
    env.run(&["install", "demo", "1.0.0"]);

    let output = env.run(&["build", "demo", "1.0.0"]);
    assert_eq!(code(&output), 4);
    assert_eq!(
        stdout(&output),
        "No build script found for package demo@1.0.0.\n"
    );
}

#[cfg(unix)]
#[test]
fn test_build_exit_status_sets_exit_code() {
    let env = TestEnv::new();
    env.seed_fetched("demo@v-1.0.0", &[("package.json", manifest(Some("exit 0")).as_str())]);
    env.seed_fetched("fail@v-1.0.0", &[("package.json", manifest(Some("exit 1")).as_str())]);
    env.run(&["install", "demo", "1.0.0"]);
    env.run(&["install", "fail", "1.0.0"]);

    let ok = env.run(&["build", "demo", "1.0.0"]);
    assert_eq!(code(&ok), 0, "stderr: {}", stderr(&ok));
    assert_eq!(stdout(&ok), "Package demo@1.0.0 built.\n");

    let failed = env.run(&["build", "fail", "1.0.0"]);
    assert_eq!(code(&failed), 12);
    assert!(stderr(&failed).contains("exited with status 1"));
}

#[test]
fn test_menu_invalid_option_exits_normally() {
    let env = TestEnv::new();

    let output = env.run_with_stdin(&[], "7\n");

    assert_eq!(code(&output), 0);
    assert!(stdout(&output).contains("Invalid option."));
}

#[test]
fn test_menu_install() {
    let env = TestEnv::new();
    env.seed_fetched("demo@v-1.0.0", &[("package.zip", "PK")]);

    let output = env.run_with_stdin(&["menu"], "2\ndemo\n1.0.0\n");

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Package demo@1.0.0 installed."));
    assert!(env.installed().join("demo@v-1.0.0/package.zip").exists());
}
