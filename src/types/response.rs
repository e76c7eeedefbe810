use serde_json::Value;

use crate::{
    error::{PlannerError, Result},
    schemas::{validate_payload, ResponseSchema},
};

/// Shape-check `payload` against `T`'s schema, then deserialise it.
pub fn deserialize_payload<T>(payload: &Value) -> Result<T>
where
    T: ResponseSchema,
{
    let schema = T::schema();
    validate_payload(schema, payload)?;

    serde_path_to_error::deserialize(payload).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        PlannerError::Validation(format!(
            "failed to deserialize `{}` at {}: {}",
            schema.schema_name(),
            location,
            err.inner()
        ))
    })
}

/// Parse text as JSON and hand it to [`deserialize_payload`].
pub fn parse_payload<T>(text: &str) -> Result<T>
where
    T: ResponseSchema,
{
    let value: Value = serde_json::from_str(text)?;
    deserialize_payload(&value)
}
