//! Tolerant JSON-with-comments codec with pluggable validation.
//!
//! Reading never panics: [`parse`] and [`read_path`] return a tagged
//! [`Parsed`] carrying either the typed data or every diagnostic found.

#![deny(clippy::all)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod document;
mod error;
mod parser;
mod scanner;
mod validator;

pub use document::{parse, parse_labeled, read_path, serialize, serialize_value, Formatting, Parsed};
pub use error::CodecError;
pub use parser::{parse_value, MAX_DEPTH};
pub use scanner::{Diagnostic, ParseErrorCode};
pub use validator::{AnyValue, Constraints, Predicate, Schema, ValidationError, Validator};
