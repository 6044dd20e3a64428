use std::{fs, io::ErrorKind, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use tracing::debug;

use crate::parser::parse_value;
use crate::scanner::Diagnostic;
use crate::validator::{ValidationError, Validator};
use crate::CodecError;

/// Tagged outcome of reading a document. Never panics, never partial.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Parsed<T> {
    Success {
        data: T,
    },
    NotFound {
        message: String,
    },
    Error {
        message: String,
        diagnostics: Vec<Diagnostic>,
    },
    ValidationFailed {
        message: String,
    },
}

impl<T> Parsed<T> {
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::NotFound { .. } => "not_found",
            Self::Error { .. } => "error",
            Self::ValidationFailed { .. } => "validation_failed",
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }

    /// # Errors
    ///
    /// Converts every non-success variant into the matching [`CodecError`].
    pub fn into_result(self) -> Result<T, CodecError> {
        match self {
            Self::Success { data } => Ok(data),
            Self::NotFound { message } => Err(CodecError::NotFound { message }),
            Self::Error {
                message,
                diagnostics,
            } => Err(CodecError::Parse {
                message,
                diagnostics,
            }),
            Self::ValidationFailed { message } => Err(CodecError::Validation { message }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        match self {
            Self::Success { data } => Parsed::Success { data: f(data) },
            Self::NotFound { message } => Parsed::NotFound { message },
            Self::Error {
                message,
                diagnostics,
            } => Parsed::Error {
                message,
                diagnostics,
            },
            Self::ValidationFailed { message } => Parsed::ValidationFailed { message },
        }
    }
}

/// Output layout for [`serialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    pub indent: usize,
    pub trailing_newline: bool,
}

impl Default for Formatting {
    fn default() -> Self {
        Self {
            indent: 2,
            trailing_newline: true,
        }
    }
}

/// Parse `raw` and, when a validator is given, check it.
///
/// Without a validator the parsed value is deserialized straight into `T`;
/// a shape mismatch is still reported as `validation_failed`.
pub fn parse<T>(raw: &str, validator: Option<&dyn Validator<T>>) -> Parsed<T>
where
    T: DeserializeOwned,
{
    parse_labeled(raw, "document", validator)
}

/// Like [`parse`], naming the source (usually a path) in messages.
pub fn parse_labeled<T>(raw: &str, label: &str, validator: Option<&dyn Validator<T>>) -> Parsed<T>
where
    T: DeserializeOwned,
{
    let value = match parse_value(raw) {
        Ok(value) => value,
        Err(diagnostics) => {
            for diag in &diagnostics {
                debug!(source = label, offset = diag.offset, code = %diag.code, "parse diagnostic");
            }
            let detail = diagnostics
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Parsed::Error {
                message: format!("failed to parse {label}: {detail}"),
                diagnostics,
            };
        }
    };
    check(value, label, validator)
}

fn check<T>(value: Value, label: &str, validator: Option<&dyn Validator<T>>) -> Parsed<T>
where
    T: DeserializeOwned,
{
    let validated = match validator {
        Some(validator) => validator.validate(&value),
        None => T::deserialize(value).map_err(|err| ValidationError::new(err.to_string())),
    };
    match validated {
        Ok(data) => Parsed::Success { data },
        Err(err) => Parsed::ValidationFailed {
            message: format!("validation failed for {label}: {err}"),
        },
    }
}

fn parse_strict<T>(raw: &str, label: &str, validator: Option<&dyn Validator<T>>) -> Parsed<T>
where
    T: DeserializeOwned,
{
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            return Parsed::Error {
                message: format!("failed to parse {label}: {err}"),
                diagnostics: Vec::new(),
            }
        }
    };
    check(value, label, validator)
}

/// Read and parse a document from disk, choosing the strategy by extension.
///
/// `.jsonc` goes through the tolerant parser, `.json` through strict
/// `serde_json`; anything else is rejected without reading.
pub fn read_path<T>(path: &Path, validator: Option<&dyn Validator<T>>) -> Parsed<T>
where
    T: DeserializeOwned,
{
    let label = path.display().to_string();
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !matches!(ext.as_str(), "jsonc" | "json") {
        return Parsed::Error {
            message: format!("unsupported file extension '.{ext}' at {label}"),
            diagnostics: Vec::new(),
        };
    }
    match fs::read_to_string(path) {
        Ok(raw) if ext == "json" => parse_strict(&raw, &label, validator),
        Ok(raw) => parse_labeled(&raw, &label, validator),
        Err(err) if err.kind() == ErrorKind::NotFound => Parsed::NotFound {
            message: format!("{label} does not exist"),
        },
        Err(err) => Parsed::Error {
            message: format!("failed to read {label}: {err}"),
            diagnostics: Vec::new(),
        },
    }
}

/// Render `data` as indented JSON. Pure and deterministic for a given input.
///
/// # Errors
///
/// Returns [`CodecError::Serialize`] when `data` cannot be represented as JSON.
pub fn serialize<T>(data: &T, formatting: Formatting) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    let indent = vec![b' '; formatting.indent];
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
    data.serialize(&mut serializer)
        .map_err(|err| CodecError::Serialize(err.to_string()))?;
    let mut text = String::from_utf8(out).map_err(|err| CodecError::Serialize(err.to_string()))?;
    if formatting.trailing_newline {
        text.push('\n');
    }
    Ok(text)
}

/// Serialize an already-untyped value; handy for callers holding a [`Value`].
///
/// # Errors
///
/// See [`serialize`].
pub fn serialize_value(value: &Value, formatting: Formatting) -> Result<String, CodecError> {
    serialize(value, formatting)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::validator::{AnyValue, Predicate, Schema};

    #[test]
    fn parse_tags_each_outcome() {
        let ok: Parsed<Value> = parse("{\"a\": 1,}", Some(&AnyValue));
        assert_eq!(ok.status(), "success");

        let bad: Parsed<Value> = parse("{\"a\" 1}", None);
        match bad {
            Parsed::Error {
                message,
                diagnostics,
            } => {
                assert_eq!(diagnostics.len(), 1);
                assert!(message.contains("ColonExpected at 5"), "{message}");
            }
            other => panic!("expected error, got {other:?}"),
        }

        let guard = Predicate::new("array", Value::is_array);
        let invalid: Parsed<Value> = parse("{}", Some(&guard));
        assert_eq!(invalid.status(), "validation_failed");
    }

    #[test]
    fn untyped_parse_still_checks_shape() {
        let parsed: Parsed<BTreeMap<String, String>> = parse("{\"a\": 1}", None);
        assert_eq!(parsed.status(), "validation_failed");
    }

    #[test]
    fn tagged_result_serializes_with_status() -> Result<()> {
        let parsed: Parsed<Value> = parse("[true]", None);
        let rendered = serde_json::to_value(&parsed)?;
        assert_eq!(rendered, json!({"status": "success", "data": [true]}));
        Ok(())
    }

    #[test]
    fn serialize_is_deterministic_and_reparses() -> Result<()> {
        let value = json!({"b": {"y": [1, 2]}, "a": "x"});
        let first = serialize(&value, Formatting::default())?;
        let second = serialize(&value, Formatting::default())?;
        assert_eq!(first, second);
        assert_eq!(first, "{\n  \"a\": \"x\",\n  \"b\": {\n    \"y\": [\n      1,\n      2\n    ]\n  }\n}\n");
        let reparsed: Value = parse(&first, Some(&AnyValue)).into_result()?;
        assert_eq!(reparsed, value);
        Ok(())
    }

    #[test]
    fn custom_indent_is_honored() -> Result<()> {
        let text = serialize(
            &json!({"a": 1}),
            Formatting {
                indent: 4,
                trailing_newline: false,
            },
        )?;
        assert_eq!(text, "{\n    \"a\": 1\n}");
        Ok(())
    }

    #[test]
    fn read_path_distinguishes_missing_and_unsupported() -> Result<()> {
        let dir = tempdir()?;
        let missing: Parsed<Value> = read_path(&dir.path().join("absent.jsonc"), None);
        assert_eq!(missing.status(), "not_found");

        let yaml = dir.path().join("config.yaml");
        fs::write(&yaml, "a: 1")?;
        let unsupported: Parsed<Value> = read_path(&yaml, None);
        assert!(matches!(
            unsupported,
            Parsed::Error { ref message, .. } if message.contains("unsupported file extension")
        ));

        let strict = dir.path().join("config.json");
        fs::write(&strict, "{\"lang\": \"en\",}")?;
        let rejected: Parsed<Value> = read_path(&strict, None);
        assert_eq!(rejected.status(), "error");

        let jsonc = dir.path().join("config.jsonc");
        fs::write(&jsonc, "// comment\n{\"lang\": \"en\",}\n")?;
        let schema = Schema::<Value>::new("config");
        let parsed = read_path(&jsonc, Some(&schema)).into_result()?;
        assert_eq!(parsed, json!({"lang": "en"}));
        Ok(())
    }
}
