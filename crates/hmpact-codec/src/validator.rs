use std::{fmt, marker::PhantomData};

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

/// Why a well-formed document was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            message: message.into(),
        }
    }

    pub fn at(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Turns an untyped document into a checked `T`.
///
/// Declarative schemas ([`Schema`]) and hand-written predicates
/// ([`Predicate`]) both implement this, so callers accept either through
/// one `&dyn Validator<T>` parameter.
pub trait Validator<T> {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first violation.
    fn validate(&self, raw: &Value) -> Result<T, ValidationError>;
}

/// Semantic constraints a deserialized type enforces beyond its shape.
pub trait Constraints {
    /// # Errors
    ///
    /// Returns the first violated constraint.
    fn check(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Constraints for Value {}

/// Declarative schema: the serde shape of `T` plus its [`Constraints`].
pub struct Schema<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Schema<T> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("name", &self.name).finish()
    }
}

impl<T> Validator<T> for Schema<T>
where
    T: DeserializeOwned + Constraints,
{
    fn validate(&self, raw: &Value) -> Result<T, ValidationError> {
        let value = <T as Deserialize>::deserialize(raw).map_err(|err| {
            ValidationError::new(format!("{} does not match its schema: {err}", self.name))
        })?;
        value.check()?;
        Ok(value)
    }
}

/// Hand-written type guard; accepted values are then deserialized into `T`.
pub struct Predicate<F> {
    description: String,
    guard: F,
}

impl<F> Predicate<F>
where
    F: Fn(&Value) -> bool,
{
    pub fn new(description: impl Into<String>, guard: F) -> Self {
        Self {
            description: description.into(),
            guard,
        }
    }
}

impl<T, F> Validator<T> for Predicate<F>
where
    T: DeserializeOwned,
    F: Fn(&Value) -> bool,
{
    fn validate(&self, raw: &Value) -> Result<T, ValidationError> {
        if !(self.guard)(raw) {
            return Err(ValidationError::new(format!(
                "data does not match expected type ({})",
                self.description
            )));
        }
        <T as Deserialize>::deserialize(raw)
            .map_err(|err| ValidationError::new(format!("{}: {err}", self.description)))
    }
}

/// Accepts any well-formed document unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyValue;

impl Validator<Value> for AnyValue {
    fn validate(&self, raw: &Value) -> Result<Value, ValidationError> {
        Ok(raw.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pack {
        lang: String,
        version: String,
    }

    impl Constraints for Pack {
        fn check(&self) -> Result<(), ValidationError> {
            if self.lang.is_empty() {
                return Err(ValidationError::at("lang", "must not be empty"));
            }
            Ok(())
        }
    }

    fn run<T>(validator: &dyn Validator<T>, raw: &Value) -> Result<T, ValidationError> {
        validator.validate(raw)
    }

    #[test]
    fn schema_and_predicate_share_a_signature() {
        let raw = json!({"lang": "ja", "version": "1.0.0"});
        let schema = Schema::<Pack>::new("language pack");
        let guard = Predicate::new("language pack", |v: &Value| v.get("lang").is_some());
        let expected = Pack {
            lang: "ja".into(),
            version: "1.0.0".into(),
        };
        assert_eq!(run::<Pack>(&schema, &raw).unwrap(), expected);
        assert_eq!(run::<Pack>(&guard, &raw).unwrap(), expected);
    }

    #[test]
    fn schema_reports_shape_and_constraint_failures() {
        let schema = Schema::<Pack>::new("language pack");
        let err = run::<Pack>(&schema, &json!({"lang": "ja"})).unwrap_err();
        assert!(err.message.contains("missing field `version`"), "{err}");

        let err = run::<Pack>(&schema, &json!({"lang": "", "version": "1"})).unwrap_err();
        assert_eq!(err.to_string(), "lang: must not be empty");
    }

    #[test]
    fn predicate_rejection_names_the_guard() {
        let guard = Predicate::new("object with lang", |v: &Value| v.get("lang").is_some());
        let err = run::<Value>(&guard, &json!([1, 2])).unwrap_err();
        assert!(err.message.contains("object with lang"));
    }
}
