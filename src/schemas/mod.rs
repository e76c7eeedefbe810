pub mod validation;

use jsonschema::{Draft, JSONSchema};
use schemars::schema::RootSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt, sync::Arc};

use crate::error::PlannerError;

pub use validation::validate_payload;

/// Cached JSON schema handle associated with a response type.
///
/// The Draft-7 validator is compiled once, when the handle is built.
#[derive(Clone)]
pub struct SchemaHandle {
    schema_name: &'static str,
    schema_json: Arc<Value>,
    validator: Result<Arc<JSONSchema>, String>,
}

impl fmt::Debug for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaHandle")
            .field("schema_name", &self.schema_name)
            .field("compiled", &self.validator.is_ok())
            .finish_non_exhaustive()
    }
}

impl SchemaHandle {
    pub fn from_root_schema(schema_name: &'static str, root: RootSchema) -> Self {
        // RootSchema is plain data; serialising it cannot fail.
        let schema_json = serde_json::to_value(root).unwrap_or(Value::Bool(true));
        let validator = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_json)
            .map(Arc::new)
            .map_err(|err| err.to_string());

        Self {
            schema_name,
            schema_json: Arc::new(schema_json),
            validator,
        }
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }

    /// The compiled validator, or why the schema could not be compiled.
    pub fn validator(&self) -> Result<&JSONSchema, PlannerError> {
        self.validator.as_deref().map_err(|err| {
            PlannerError::Validation(format!(
                "`{}` schema cannot be used for validation: {}",
                self.schema_name, err
            ))
        })
    }
}

/// A type the model is asked to produce, with a schema to shape-check against.
pub trait ResponseSchema: DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static SchemaHandle;
}
