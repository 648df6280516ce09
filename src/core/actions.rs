//! core::actions
//!
//! CI runner input and output plumbing.
//!
//! # Inputs
//!
//! The runner passes each action input as an environment variable named
//! `INPUT_<NAME>`, where the name is upper-cased and spaces become
//! underscores (`version-constraint` → `INPUT_VERSION-CONSTRAINT`).
//! [`ActionInputs`] snapshots those variables once; nothing reads the
//! process environment afterwards.
//!
//! # Outputs
//!
//! When `$GITHUB_OUTPUT` names a file, outputs are appended to it using
//! the heredoc form:
//!
//! ```text
//! name<<ghadelimiter_<uuid>
//! value
//! ghadelimiter_<uuid>
//! ```
//!
//! Otherwise `name=value` is printed on stdout.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Prefix of input environment variables.
const INPUT_PREFIX: &str = "INPUT_";

/// Environment variable naming the output file.
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

/// Errors from writing outputs.
#[derive(Debug, Error)]
pub enum ActionsError {
    #[error("failed to write output file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("output '{name}' contains the delimiter '{delimiter}'")]
    DelimiterCollision { name: String, delimiter: String },
}

/// Snapshot of the action inputs.
#[derive(Debug, Clone, Default)]
pub struct ActionInputs {
    vars: HashMap<String, String>,
}

impl ActionInputs {
    /// Capture `INPUT_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit variables; non-`INPUT_*` names are dropped.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(INPUT_PREFIX))
            .collect();
        Self { vars }
    }

    /// Get an input, trimmed. Missing and empty inputs are `None`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .get(&input_key(name))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Get a list input.
    ///
    /// Each line is one comma-separated record. A double-quoted field keeps
    /// its commas only when the record has more than one field; a record with
    /// a single field is always split on commas. `#` outside quotes starts a
    /// comment. Items are trimmed and empty items dropped.
    pub fn get_list(&self, name: &str) -> Vec<String> {
        self.vars
            .get(&input_key(name))
            .map(|value| parse_list(value))
            .unwrap_or_default()
    }
}

/// Environment variable name for an input.
pub fn input_key(name: &str) -> String {
    format!("{}{}", INPUT_PREFIX, name.replace(' ', "_").to_uppercase())
}

fn parse_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    for line in value.lines() {
        let mut fields = parse_record(line);
        if fields.len() == 1 {
            let single = fields.remove(0);
            items.extend(single.split(',').map(str::to_string));
        } else {
            items.extend(fields);
        }
    }
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Split one line into comma-separated fields.
///
/// A field starting with `"` runs to the closing quote (`""` is a literal
/// quote). An unquoted `#` starts a comment that runs to the end of the line.
fn parse_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            }
            '"' if field.is_empty() => quoted = true,
            c if quoted => field.push(c),
            ',' => fields.push(std::mem::take(&mut field)),
            '#' => break,
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Where outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Append to the runner's output file
    File(PathBuf),
    /// Print `name=value` lines
    Stdout,
}

/// Output writer.
#[derive(Debug, Clone)]
pub struct ActionOutputs {
    target: OutputTarget,
}

impl ActionOutputs {
    /// Use `$GITHUB_OUTPUT` when set and non-empty, else stdout.
    pub fn from_env() -> Self {
        match std::env::var_os(OUTPUT_FILE_ENV) {
            Some(path) if !path.is_empty() => Self::to_file(PathBuf::from(path)),
            _ => Self::stdout(),
        }
    }

    /// Append outputs to a file.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            target: OutputTarget::File(path.into()),
        }
    }

    /// Print outputs on stdout.
    pub fn stdout() -> Self {
        Self {
            target: OutputTarget::Stdout,
        }
    }

    /// The configured target.
    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    /// Set an output.
    ///
    /// # Errors
    ///
    /// Returns `ActionsError::Io` if the output file cannot be written.
    pub fn set(&self, name: &str, value: &str) -> Result<(), ActionsError> {
        self.set_all(&[(name.to_string(), value.to_string())])
    }

    /// Set several outputs at once.
    ///
    /// Every record is formatted before anything is written, and the file
    /// receives all of them in a single append. Either all outputs are set
    /// or none are.
    ///
    /// # Errors
    ///
    /// - `ActionsError::DelimiterCollision` if any name or value contains
    ///   the delimiter
    /// - `ActionsError::Io` if the output file cannot be written
    pub fn set_all(&self, outputs: &[(String, String)]) -> Result<(), ActionsError> {
        match &self.target {
            OutputTarget::File(path) => {
                let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
                let records = format_outputs(outputs, &delimiter)?;
                append_records(path, &records)
            }
            OutputTarget::Stdout => {
                for (name, value) in outputs {
                    println!("{}={}", name, value);
                }
                Ok(())
            }
        }
    }
}

fn append_records(path: &Path, records: &str) -> Result<(), ActionsError> {
    let io_err = |source| ActionsError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(records.as_bytes()).map_err(io_err)
}

fn format_outputs(outputs: &[(String, String)], delimiter: &str) -> Result<String, ActionsError> {
    outputs
        .iter()
        .map(|(name, value)| format_output(name, value, delimiter))
        .collect()
}

/// Format one heredoc output record.
fn format_output(name: &str, value: &str, delimiter: &str) -> Result<String, ActionsError> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(ActionsError::DelimiterCollision {
            name: name.to_string(),
            delimiter: delimiter.to_string(),
        });
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn inputs(vars: &[(&str, &str)]) -> ActionInputs {
        ActionInputs::from_vars(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    mod inputs {
        use super::*;

        #[test]
        fn key_is_upper_cased_with_hyphens_kept() {
            assert_eq!(input_key("version-constraint"), "INPUT_VERSION-CONSTRAINT");
            assert_eq!(input_key("metadata path"), "INPUT_METADATA_PATH");
        }

        #[test]
        fn get_trims_and_drops_empty() {
            let inputs = inputs(&[
                ("INPUT_REPOSITORY", "  ghcr.io/acme \n"),
                ("INPUT_VERSION-CONSTRAINT", "   "),
            ]);
            assert_eq!(inputs.get("repository").as_deref(), Some("ghcr.io/acme"));
            assert_eq!(inputs.get("version-constraint"), None);
            assert_eq!(inputs.get("image-name"), None);
        }

        #[test]
        fn non_input_vars_are_ignored() {
            let inputs = inputs(&[("REPOSITORY", "x"), ("PATH", "/bin")]);
            assert_eq!(inputs.get("repository"), None);
        }

        #[test]
        fn list_splits_on_newlines_and_commas() {
            let inputs = inputs(&[("INPUT_TAGS", "latest, 8.3\n\n8.3-fpm ,\n")]);
            assert_eq!(inputs.get_list("tags"), vec!["latest", "8.3", "8.3-fpm"]);
        }

        #[test]
        fn quoted_commas_kept_in_multi_field_records() {
            let inputs = inputs(&[(
                "INPUT_ANNOTATIONS",
                "\"index:org.opencontainers.image.description=PHP, with extras\",index:a=b",
            )]);
            assert_eq!(
                inputs.get_list("annotations"),
                vec![
                    "index:org.opencontainers.image.description=PHP, with extras",
                    "index:a=b"
                ]
            );
        }

        #[test]
        fn single_field_record_splits_even_when_quoted() {
            let inputs = inputs(&[(
                "INPUT_ANNOTATIONS",
                "\"index:description=PHP, with extras\"\nindex:a=b",
            )]);
            assert_eq!(
                inputs.get_list("annotations"),
                vec!["index:description=PHP", "with extras", "index:a=b"]
            );
        }

        #[test]
        fn escaped_quotes_and_comments() {
            let inputs = inputs(&[(
                "INPUT_TAGS",
                "# floating tags\nlatest # moving\n\"say \"\"hi\"\"\",8.3",
            )]);
            assert_eq!(
                inputs.get_list("tags"),
                vec!["latest", "say \"hi\"", "8.3"]
            );
        }

        #[test]
        fn missing_list_is_empty() {
            assert!(inputs(&[]).get_list("tags").is_empty());
        }
    }

    mod outputs {
        use super::*;

        #[test]
        fn heredoc_record() {
            let record = format_output("php_eol_versions", "{\"major\":[]}", "ghadelimiter_x").unwrap();
            assert_eq!(
                record,
                "php_eol_versions<<ghadelimiter_x\n{\"major\":[]}\nghadelimiter_x\n"
            );
        }

        #[test]
        fn delimiter_in_value_is_rejected() {
            let err = format_output("name", "a ghadelimiter_x b", "ghadelimiter_x").unwrap_err();
            assert!(matches!(err, ActionsError::DelimiterCollision { .. }));
        }

        #[test]
        fn one_bad_record_formats_nothing() {
            let outputs = vec![
                ("first".to_string(), "a".to_string()),
                ("second".to_string(), "b ghadelimiter_x".to_string()),
            ];
            let err = format_outputs(&outputs, "ghadelimiter_x").unwrap_err();
            assert!(matches!(err, ActionsError::DelimiterCollision { ref name, .. } if name == "second"));
        }

        #[test]
        fn set_all_writes_every_record_with_one_delimiter() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("output");

            ActionOutputs::to_file(&path)
                .set_all(&[
                    ("eol".to_string(), "1".to_string()),
                    ("stable".to_string(), "2".to_string()),
                ])
                .unwrap();

            let contents = std::fs::read_to_string(&path).unwrap();
            let lines: Vec<&str> = contents.lines().collect();
            assert_eq!(lines.len(), 6);
            let delimiter = &lines[0]["eol<<".len()..];
            assert_eq!(lines[2], delimiter);
            assert_eq!(lines[3], format!("stable<<{}", delimiter));
            assert_eq!(lines[4], "2");
        }

        #[test]
        fn file_outputs_are_appended() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("output");
            std::fs::write(&path, "existing=1\n").unwrap();

            let outputs = ActionOutputs::to_file(&path);
            outputs.set("first", "a").unwrap();
            outputs.set("second", "b").unwrap();

            let contents = std::fs::read_to_string(&path).unwrap();
            let lines: Vec<&str> = contents.lines().collect();
            assert_eq!(lines[0], "existing=1");
            assert!(lines[1].starts_with("first<<ghadelimiter_"));
            assert_eq!(lines[2], "a");
            assert_eq!(lines[3], &lines[1]["first<<".len()..]);
            assert!(lines[4].starts_with("second<<ghadelimiter_"));
            assert_eq!(lines.len(), 7);
        }

        #[test]
        fn unwritable_file_is_an_error() {
            let dir = TempDir::new().unwrap();
            let outputs = ActionOutputs::to_file(dir.path().join("missing/output"));
            assert!(matches!(
                outputs.set("name", "value"),
                Err(ActionsError::Io { .. })
            ));
        }
    }
}
