use crate::{error::ResearchError, tools::Capability, Result};
use jsonschema::{Draft, JSONSchema};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{collections::HashMap, fmt, sync::Arc};

const MAX_SCHEMA_ERRORS: usize = 3;

/// JSON schema for a tool parameter struct, as sent to the model
pub fn parameters_schema_for<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(&schema.schema).unwrap_or_else(|_| {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    })
}

/// Deserialize tool parameters, reporting the path of the offending field
pub fn parse_params<T: DeserializeOwned>(capability: Capability, params: Value) -> Result<T> {
    serde_path_to_error::deserialize(params).map_err(|e| {
        ResearchError::Validation(format!(
            "Invalid parameters for {} at {}: {}",
            capability,
            e.path(),
            e.inner()
        ))
    })
}

/// Compiled parameter schemas keyed by capability
#[derive(Clone, Default)]
pub struct SchemaValidator {
    schemas: HashMap<Capability, Arc<JSONSchema>>,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("capabilities", &self.schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and store a schema. Schemas that fail to compile are skipped,
    /// leaving deserialization as the only check for that tool.
    pub fn register_schema(&mut self, capability: Capability, schema: Value) {
        match JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
        {
            Ok(compiled) => {
                self.schemas.insert(capability, Arc::new(compiled));
            }
            Err(err) => {
                tracing::warn!(%capability, "skipping invalid parameter schema: {}", err);
                self.schemas.remove(&capability);
            }
        }
    }

    /// Check `params` against the registered schema for `capability`
    pub fn check(&self, capability: Capability, params: &Value) -> Result<()> {
        let Some(schema) = self.schemas.get(&capability) else {
            return Ok(());
        };

        if let Err(errors) = schema.validate(params) {
            let mut details = Vec::new();
            let mut truncated = false;

            for (idx, error) in errors.enumerate() {
                if idx < MAX_SCHEMA_ERRORS {
                    let mut path = error.instance_path.to_string();
                    if path.is_empty() {
                        path = "<root>".to_string();
                    }
                    details.push(format!("{}: {}", path, error));
                } else {
                    truncated = true;
                    break;
                }
            }

            let mut detail_str = if details.is_empty() {
                "arguments failed schema validation".to_string()
            } else {
                details.join("; ")
            };

            if truncated {
                detail_str.push_str("; additional errors truncated");
            }

            return Err(ResearchError::Validation(format!(
                "Arguments for {} do not match its schema: {}",
                capability, detail_str
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct QueryParams {
        /// Search text
        query: String,
    }

    #[test]
    fn schema_lists_required_fields() {
        let schema = parameters_schema_for::<QueryParams>();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["query"].is_object());
        assert_eq!(schema["required"][0], "query");
    }

    #[test]
    fn check_rejects_missing_field() {
        let mut validator = SchemaValidator::new();
        validator.register_schema(Capability::SearchWeb, parameters_schema_for::<QueryParams>());

        assert!(validator
            .check(Capability::SearchWeb, &json!({"query": "rust"}))
            .is_ok());
        let err = validator
            .check(Capability::SearchWeb, &json!({"q": "rust"}))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn parse_params_reports_path() {
        let err = parse_params::<QueryParams>(Capability::SearchWeb, json!({"query": 3}))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("web-SearchWeb"));
        assert!(message.contains("query"));
    }
}
