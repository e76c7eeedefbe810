use crate::{error::PlannerError, schemas::SchemaHandle};
use serde_json::Value;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Check `payload` against the handle's compiled schema.
///
/// At most [`MAX_SCHEMA_ERRORS`] violations are reported, each prefixed by
/// its JSON pointer.
pub fn validate_payload(schema: &SchemaHandle, payload: &Value) -> Result<(), PlannerError> {
    let Err(errors) = schema.validator()?.validate(payload) else {
        return Ok(());
    };

    let mut details: Vec<String> = errors
        .take(MAX_SCHEMA_ERRORS + 1)
        .map(|error| {
            let pointer = error.instance_path.to_string();
            let at = if pointer.is_empty() { "<root>" } else { pointer.as_str() };
            format!("{at}: {error}")
        })
        .collect();
    let truncated = details.len() > MAX_SCHEMA_ERRORS;
    details.truncate(MAX_SCHEMA_ERRORS);

    let mut message = format!(
        "{} does not fit the `{}` schema",
        payload_kind(payload),
        schema.schema_name()
    );
    if !details.is_empty() {
        message.push_str(": ");
        message.push_str(&details.join("; "));
    }
    if truncated {
        message.push_str("; ...");
    }
    Err(PlannerError::Validation(message))
}

fn payload_kind(payload: &Value) -> &'static str {
    match payload {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}
