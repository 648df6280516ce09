//! manifest::tools
//!
//! Image tooling that publishes a manifest.
//!
//! # Design
//!
//! `ImageTools` is the seam between aggregation and process execution.
//! [`BuildxImageTools`] shells out to `docker buildx imagetools`; tests
//! use [`super::mock::MockImageTools`].
//!
//! The child environment is the inherited environment with the command's
//! override map applied on top. The parent process environment is never
//! modified.

use std::process::{Command, Stdio};

use super::aggregate::PublishCommand;
use super::ManifestError;

/// Fallback message when a failing publish wrote nothing to stderr.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Captured output of a successful publish.
///
/// buildx writes progress and metadata warnings to stderr even when it
/// succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Something that can publish a multi-arch manifest.
pub trait ImageTools {
    /// Program and leading arguments, for display.
    fn command_line(&self, command: &PublishCommand) -> (String, Vec<String>);

    /// Check whether the tooling is installed and usable.
    fn is_available(&self) -> bool;

    /// Run the publish command.
    ///
    /// # Errors
    ///
    /// - `ManifestError::Spawn` if the process cannot be started
    /// - `ManifestError::PublishFailed` on a non-zero exit
    fn publish(&self, command: &PublishCommand) -> Result<PublishOutput, ManifestError>;
}

/// `docker buildx imagetools` (or standalone `buildx imagetools`).
#[derive(Debug, Clone)]
pub struct BuildxImageTools {
    program: String,
    standalone: bool,
}

impl Default for BuildxImageTools {
    fn default() -> Self {
        Self::new("docker", false)
    }
}

impl BuildxImageTools {
    /// Create a runner.
    ///
    /// With `standalone`, `program` is the buildx binary itself and is
    /// invoked as `<program> imagetools ...`; otherwise it is the docker
    /// CLI and invoked as `<program> buildx imagetools ...`.
    pub fn new(program: impl Into<String>, standalone: bool) -> Self {
        Self {
            program: program.into(),
            standalone,
        }
    }

    fn buildx_args(&self) -> Vec<String> {
        if self.standalone {
            Vec::new()
        } else {
            vec!["buildx".to_string()]
        }
    }
}

impl ImageTools for BuildxImageTools {
    fn command_line(&self, command: &PublishCommand) -> (String, Vec<String>) {
        let mut args = self.buildx_args();
        args.push("imagetools".to_string());
        args.extend(command.args.iter().cloned());
        (self.program.clone(), args)
    }

    fn is_available(&self) -> bool {
        let mut args = self.buildx_args();
        args.push("version".to_string());
        Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn publish(&self, command: &PublishCommand) -> Result<PublishOutput, ManifestError> {
        let (program, args) = self.command_line(command);
        let output = Command::new(&program)
            .args(&args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ManifestError::Spawn {
                program: program.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ManifestError::PublishFailed {
                message: last_error_line(&stderr),
                stderr,
            });
        }
        Ok(PublishOutput { stdout, stderr })
    }
}

/// Last non-empty line of a process's stderr, trimmed.
///
/// Returns [`UNKNOWN_ERROR`] if there is none.
pub fn last_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    /// Writing a script and executing it while another test thread forks
    /// can fail with ETXTBSY, so tests that spawn run one at a time.
    static EXEC_LOCK: Mutex<()> = Mutex::new(());

    fn exec_lock() -> MutexGuard<'static, ()> {
        EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    mod last_error_line {
        use super::*;

        #[test]
        fn trailing_newline() {
            assert_eq!(last_error_line("layer mismatch\n"), "layer mismatch");
        }

        #[test]
        fn picks_last_line() {
            let stderr = "#1 resolving\n#2 pushing\nERROR: failed to push: denied\n\n  \n";
            assert_eq!(last_error_line(stderr), "ERROR: failed to push: denied");
        }

        #[test]
        fn empty_falls_back() {
            assert_eq!(last_error_line(""), UNKNOWN_ERROR);
            assert_eq!(last_error_line("\n \r\n"), UNKNOWN_ERROR);
        }
    }

    #[test]
    fn docker_command_line() {
        let tools = BuildxImageTools::default();
        let command = PublishCommand::new(vec!["create".into(), "r/app@sha256:a".into()]);
        let (program, args) = tools.command_line(&command);
        assert_eq!(program, "docker");
        assert_eq!(args, ["buildx", "imagetools", "create", "r/app@sha256:a"]);
    }

    #[test]
    fn standalone_command_line() {
        let tools = BuildxImageTools::new("/usr/local/bin/buildx", true);
        let (program, args) = tools.command_line(&PublishCommand::new(vec!["create".into()]));
        assert_eq!(program, "/usr/local/bin/buildx");
        assert_eq!(args, ["imagetools", "create"]);
    }

    #[test]
    fn missing_program_is_unavailable() {
        let _guard = exec_lock();
        let tools = BuildxImageTools::new("ci-actions-no-such-program", false);
        assert!(!tools.is_available());
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let _guard = exec_lock();
        let tools = BuildxImageTools::new("ci-actions-no-such-program", true);
        let err = tools
            .publish(&PublishCommand::new(vec!["create".into()]))
            .unwrap_err();
        assert!(matches!(err, ManifestError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// Write an executable shell script standing in for buildx.
        fn fake_buildx(dir: &TempDir, body: &str) -> String {
            let path = dir.path().join("buildx");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[test]
        fn non_zero_exit_reports_last_stderr_line() {
            let _guard = exec_lock();
            let dir = TempDir::new().unwrap();
            let program = fake_buildx(&dir, "echo 'layer mismatch' >&2\nexit 1");
            let tools = BuildxImageTools::new(program, true);

            let err = tools
                .publish(&PublishCommand::new(vec!["create".into()]))
                .unwrap_err();
            assert!(err.to_string().contains("layer mismatch"));
            assert_eq!(err.to_string(), "buildx failed with: layer mismatch");
        }

        #[test]
        fn silent_failure_uses_fallback() {
            let _guard = exec_lock();
            let dir = TempDir::new().unwrap();
            let program = fake_buildx(&dir, "exit 3");
            let tools = BuildxImageTools::new(program, true);

            let err = tools
                .publish(&PublishCommand::new(vec!["create".into()]))
                .unwrap_err();
            assert_eq!(err.to_string(), "buildx failed with: unknown error");
        }

        #[test]
        fn success_keeps_stderr() {
            let _guard = exec_lock();
            let dir = TempDir::new().unwrap();
            let program = fake_buildx(
                &dir,
                "echo 'WARNING: provenance attestation missing' >&2\necho pushed",
            );
            let tools = BuildxImageTools::new(program, true);

            let output = tools
                .publish(&PublishCommand::new(vec!["create".into()]))
                .unwrap();
            assert_eq!(output.stdout.trim(), "pushed");
            assert_eq!(
                output.stderr.trim(),
                "WARNING: provenance attestation missing"
            );
        }

        #[test]
        fn failure_keeps_full_stderr() {
            let _guard = exec_lock();
            let dir = TempDir::new().unwrap();
            let program = fake_buildx(&dir, "echo 'resolving ghcr.io/acme' >&2\necho 'layer mismatch' >&2\nexit 1");
            let tools = BuildxImageTools::new(program, true);

            let err = tools
                .publish(&PublishCommand::new(vec!["create".into()]))
                .unwrap_err();
            match err {
                ManifestError::PublishFailed { message, stderr } => {
                    assert_eq!(message, "layer mismatch");
                    assert_eq!(stderr, "resolving ghcr.io/acme\nlayer mismatch\n");
                }
                other => panic!("expected publish failure, got {other:?}"),
            }
        }

        #[test]
        fn child_sees_args_and_env_override() {
            let _guard = exec_lock();
            let dir = TempDir::new().unwrap();
            let program = fake_buildx(&dir, r#"echo "$BUILDX_METADATA_WARNINGS $*""#);
            let tools = BuildxImageTools::new(program, true);

            let output = tools
                .publish(&PublishCommand::new(vec![
                    "create".into(),
                    "--tag".into(),
                    "v1".into(),
                ]))
                .unwrap();
            assert_eq!(output.stdout.trim(), "true imagetools create --tag v1");
        }

        #[test]
        fn available_when_version_succeeds() {
            let _guard = exec_lock();
            let dir = TempDir::new().unwrap();
            let program = fake_buildx(&dir, "exit 0");
            assert!(BuildxImageTools::new(program, true).is_available());
        }
    }
}
