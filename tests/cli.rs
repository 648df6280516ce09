//! End-to-end tests for the `ci-actions` binary.
//!
//! These run the compiled binary with an isolated environment: no config
//! file, no CI inputs, and outputs redirected into a temp file.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a command for running ci-actions with a clean environment.
fn ci_actions(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ci-actions").unwrap();
    cmd.env_clear()
        .env("PATH", std::env::var_os("PATH").unwrap_or_default())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path());
    cmd
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    ci_actions(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ci-actions"));
}

#[test]
fn help_lists_both_commands() {
    let home = TempDir::new().unwrap();
    ci_actions(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("php-versions"))
        .stdout(predicate::str::contains("push-manifest"));
}

#[test]
fn completion_generates_script() {
    let home = TempDir::new().unwrap();
    ci_actions(&home)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ci-actions"));
}

mod push_manifest {
    use super::*;

    #[test]
    fn dry_run_prints_command() {
        let home = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        metadata
            .child("amd64.json")
            .write_str(r#"{"image": "app", "tags": ["v1"], "digests": ["sha256:a"]}"#)
            .unwrap();

        ci_actions(&home)
            .arg("push-manifest")
            .arg("--metadata-path")
            .arg(metadata.path())
            .args(["--repository", "ghcr.io/acme", "--tag", "latest", "--dry-run"])
            .assert()
            .success()
            .stderr(predicate::str::contains("toolCmd.command: docker"))
            .stderr(predicate::str::contains(
                r#"toolCmd.args: ["buildx","imagetools","create","--tag","v1","--tag","latest","ghcr.io/acme/app@sha256:a"]"#,
            ));
    }

    #[test]
    fn inputs_are_read_from_environment() {
        let home = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        metadata
            .child("build.json")
            .write_str(r#"{"digests": ["sha256:b"]}"#)
            .unwrap();

        ci_actions(&home)
            .args(["push-manifest", "--dry-run"])
            .env("INPUT_METADATA-PATH", metadata.path())
            .env("INPUT_REPOSITORY", "docker.io/acme")
            .env("INPUT_IMAGE-NAME", "php")
            .assert()
            .success()
            .stderr(predicate::str::contains("docker.io/acme/php@sha256:b"));
    }

    /// A workspace where `sh buildx ...` runs a scripted stand-in for buildx.
    ///
    /// The config points `program` at `sh`, so the script is read by the
    /// shell rather than executed directly.
    fn scripted_buildx(script: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        dir.child("buildx")
            .write_str(&format!(
                "if [ \"$1\" = version ]; then exit 0; fi\n{}\n",
                script
            ))
            .unwrap();
        dir.child("config.toml")
            .write_str("[buildx]\nprogram = \"sh\"\n")
            .unwrap();
        dir.child("metadata").create_dir_all().unwrap();
        dir.child("metadata/amd64.json")
            .write_str(r#"{"image": "app", "digests": ["sha256:a"]}"#)
            .unwrap();
        dir
    }

    #[cfg(unix)]
    #[test]
    fn buildx_stderr_reaches_the_log_on_success() {
        let home = TempDir::new().unwrap();
        let work = scripted_buildx(
            "echo 'WARNING: provenance attestation missing' >&2\necho pushed",
        );

        ci_actions(&home)
            .current_dir(work.path())
            .args(["--config", "config.toml", "push-manifest"])
            .args(["--metadata-path", "metadata", "--repository", "r"])
            .assert()
            .success()
            .stderr(predicate::str::contains(
                "WARNING: provenance attestation missing",
            ))
            .stderr(predicate::str::contains("pushed"))
            .stderr(predicate::str::contains("Manifest published"));
    }

    #[cfg(unix)]
    #[test]
    fn buildx_failure_shows_all_stderr() {
        let home = TempDir::new().unwrap();
        let work = scripted_buildx(
            "echo 'resolving r/app' >&2\necho 'layer mismatch' >&2\nexit 1",
        );

        ci_actions(&home)
            .current_dir(work.path())
            .args(["--config", "config.toml", "push-manifest"])
            .args(["--metadata-path", "metadata", "--repository", "r"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("resolving r/app"))
            .stderr(predicate::str::contains("buildx failed with: layer mismatch"));
    }

    #[test]
    fn missing_metadata_path_fails() {
        let home = TempDir::new().unwrap();
        ci_actions(&home)
            .args(["push-manifest", "--repository", "r"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("metadata path is required"));
    }

    #[test]
    fn malformed_fragment_fails() {
        let home = TempDir::new().unwrap();
        let metadata = TempDir::new().unwrap();
        metadata.child("bad.json").write_str("{oops").unwrap();

        ci_actions(&home)
            .arg("push-manifest")
            .arg("--metadata-path")
            .arg(metadata.path())
            .arg("--dry-run")
            .assert()
            .failure()
            .stderr(predicate::str::contains("bad.json"));
    }
}

mod php_versions {
    use super::*;

    #[test]
    fn invalid_constraint_fails_before_fetching() {
        let home = TempDir::new().unwrap();
        ci_actions(&home)
            .args(["php-versions", "--version-constraint", ">=banana"])
            .args(["--api-base", "http://127.0.0.1:9"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("banana"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn writes_outputs_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/releases/states"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "7": {"7.3": {"state": "eol"}, "7.4": {"state": "eol"}},
                "8": {"8.2": {"state": "security"}, "8.3": {"state": "stable"}}
            })))
            .mount(&server)
            .await;
        for (branch, version) in [("7.4", "7.4.33"), ("8.2", "8.2.27"), ("8.3", "8.3.15")] {
            Mock::given(method("GET"))
                .and(path("/releases/"))
                .and(query_param("version", branch))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": version})))
                .mount(&server)
                .await;
        }

        let home = TempDir::new().unwrap();
        let output = home.child("github_output");
        output.touch().unwrap();

        let mut cmd = ci_actions(&home);
        cmd.args(["php-versions", "--api-base", server.uri().as_str()])
            .env("GITHUB_OUTPUT", output.path())
            .env("INPUT_VERSION-CONSTRAINT", ">=7.4");
        // The binary blocks this worker; the mock server keeps serving on the other.
        let assert = tokio::task::block_in_place(|| cmd.assert());
        assert
            .success()
            .stderr(predicate::str::contains("Version constraint: >=7.4"));

        output.assert(predicate::str::contains(
            r#"{"major":["7.4"],"minor":["7.4.33"]}"#,
        ));
        output.assert(predicate::str::contains(
            r#"{"major":["8.2"],"minor":["8.2.27"]}"#,
        ));
        output.assert(predicate::str::contains("php_stable_versions<<ghadelimiter_"));
    }
}
