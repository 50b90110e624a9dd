pub mod validator;

pub use validator::{parameters_schema_for, parse_params, SchemaValidator};
