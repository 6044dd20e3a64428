use serde_json::{Map, Value};

use super::ManifestError;

/// Set (`Some`) or delete (`None`) the value at `path` inside `root`.
///
/// Setting creates missing intermediate objects. Deleting a key that is not
/// there is a no-op. Returns whether `root` changed.
pub fn apply_patch(root: &mut Value, path: &[&str], value: Option<Value>) -> Result<bool, ManifestError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(ManifestError::Path {
            path: String::new(),
            reason: "path must name at least one key".to_string(),
        });
    };
    match value {
        Some(value) => {
            let target = descend_creating(root, path, parents)?;
            let previous = target.insert((*last).to_string(), value.clone());
            Ok(previous.as_ref() != Some(&value))
        }
        None => Ok(descend_existing(root, parents)
            .and_then(|target| target.remove(*last))
            .is_some()),
    }
}

fn descend_creating<'a>(
    root: &'a mut Value,
    path: &[&str],
    parents: &[&str],
) -> Result<&'a mut Map<String, Value>, ManifestError> {
    let mut current = root;
    for (depth, key) in parents.iter().enumerate() {
        let map = as_object(current, path, depth)?;
        current = map
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    as_object(current, path, parents.len())
}

fn descend_existing<'a>(root: &'a mut Value, parents: &[&str]) -> Option<&'a mut Map<String, Value>> {
    let mut current = root;
    for key in parents {
        current = current.as_object_mut()?.get_mut(*key)?;
    }
    current.as_object_mut()
}

fn as_object<'a>(
    value: &'a mut Value,
    path: &[&str],
    depth: usize,
) -> Result<&'a mut Map<String, Value>, ManifestError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ManifestError::Path {
            path: path.join("."),
            reason: format!(
                "'{}' is {}, not an object",
                if depth == 0 {
                    "<root>".to_string()
                } else {
                    path[..depth].join(".")
                },
                kind(other)
            ),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
