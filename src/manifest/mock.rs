//! manifest::mock
//!
//! Mock image tooling for deterministic testing.
//!
//! # Example
//!
//! ```
//! use ci_actions::manifest::mock::MockImageTools;
//! use ci_actions::manifest::{ImageTools, PublishCommand};
//!
//! let tools = MockImageTools::new();
//! tools.publish(&PublishCommand::new(vec!["create".into()])).unwrap();
//! assert_eq!(tools.published().len(), 1);
//!
//! tools.fail_with("layer mismatch\n");
//! let err = tools.publish(&PublishCommand::new(vec!["create".into()])).unwrap_err();
//! assert!(err.to_string().contains("layer mismatch"));
//! ```

use std::sync::{Arc, Mutex};

use super::aggregate::PublishCommand;
use super::tools::{last_error_line, ImageTools, PublishOutput};
use super::ManifestError;

/// Mock image tooling that records published commands.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockImageTools {
    inner: Arc<Mutex<MockToolsInner>>,
}

#[derive(Debug)]
struct MockToolsInner {
    available: bool,
    /// Stderr of a failing exit; `None` means success.
    failure_stderr: Option<String>,
    /// Output of a successful publish.
    output: PublishOutput,
    published: Vec<PublishCommand>,
}

impl Default for MockImageTools {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageTools {
    /// Create available tooling whose publishes succeed.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockToolsInner {
                available: true,
                failure_stderr: None,
                output: PublishOutput::default(),
                published: Vec::new(),
            })),
        }
    }

    /// Report the tooling as installed or not.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Make subsequent publishes exit non-zero with the given stderr.
    pub fn fail_with(&self, stderr: &str) {
        self.lock().failure_stderr = Some(stderr.to_string());
    }

    /// Make subsequent successful publishes report this output.
    pub fn succeed_with(&self, stdout: &str, stderr: &str) {
        self.lock().output = PublishOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        };
    }

    /// Commands passed to `publish`, in call order (including failed ones).
    pub fn published(&self) -> Vec<PublishCommand> {
        self.lock().published.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockToolsInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ImageTools for MockImageTools {
    fn command_line(&self, command: &PublishCommand) -> (String, Vec<String>) {
        let mut args = vec!["imagetools".to_string()];
        args.extend(command.args.iter().cloned());
        ("mock-buildx".to_string(), args)
    }

    fn is_available(&self) -> bool {
        self.lock().available
    }

    fn publish(&self, command: &PublishCommand) -> Result<PublishOutput, ManifestError> {
        let mut inner = self.lock();
        inner.published.push(command.clone());
        match &inner.failure_stderr {
            Some(stderr) => Err(ManifestError::PublishFailed {
                message: last_error_line(stderr),
                stderr: stderr.clone(),
            }),
            None => Ok(inner.output.clone()),
        }
    }
}
