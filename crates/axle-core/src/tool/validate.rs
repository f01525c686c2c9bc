//! Schema-driven argument validation.
//!
//! The model produces tool arguments as a raw JSON string.  Before a handler
//! runs, the payload is checked against the tool's [`ToolDefinition`]:
//! required fields, enumerated values, and JSON types.  All field errors are
//! collected into a single [`CoreError::Validation`] so the model sees every
//! problem in one round trip.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::tool::definition::{ParameterType, ToolDefinition};

/// Validate a raw JSON argument payload against a tool definition.
///
/// Returns the parsed argument object on success so handlers do not parse
/// twice.
///
/// # Errors
///
/// - [`CoreError::InvalidArguments`] when the payload is not a JSON object.
/// - [`CoreError::Validation`] with a field-keyed error map when any
///   parameter check fails.
pub fn validate_arguments(def: &ToolDefinition, raw: &str) -> Result<Map<String, Value>> {
    // An empty payload is treated as an empty object; models routinely send
    // "" or "{}" for zero-argument tools.
    let trimmed = raw.trim();
    let value: Value = if trimmed.is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(trimmed).map_err(|_| CoreError::InvalidArguments {
            tool_name: def.name.clone(),
        })?
    };

    let args = match value {
        Value::Object(map) => map,
        _ => {
            return Err(CoreError::InvalidArguments {
                tool_name: def.name.clone(),
            });
        }
    };

    let mut errors: BTreeMap<String, String> = BTreeMap::new();

    for param in &def.parameters {
        let value = match args.get(&param.name) {
            Some(v) => v,
            None => {
                if param.required {
                    errors.insert(param.name.clone(), "required parameter missing".into());
                }
                continue;
            }
        };

        if !param.enum_values.is_empty() {
            match value.as_str() {
                Some(s) if param.enum_values.iter().any(|v| v == s) => {}
                _ => {
                    errors.insert(
                        param.name.clone(),
                        format!("must be one of: {}", param.enum_values.join(", ")),
                    );
                }
            }
            continue;
        }

        if let Some(message) = check_type(param.param_type, value) {
            errors.insert(param.name.clone(), message.into());
        }
    }

    if !errors.is_empty() {
        return Err(CoreError::Validation {
            tool_name: def.name.clone(),
            errors,
        });
    }

    Ok(args)
}

/// Check a value against the declared parameter type, returning an error
/// message on mismatch.
fn check_type(expected: ParameterType, value: &Value) -> Option<&'static str> {
    let ok = match expected {
        ParameterType::String => value.is_string(),
        ParameterType::Boolean => value.is_boolean(),
        ParameterType::Number => value.is_number(),
        // Integers arrive as JSON numbers; accept any numeric value whose
        // fractional part is zero.
        ParameterType::Integer => value
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f.is_finite()),
        ParameterType::Array => value.is_array(),
        ParameterType::Object => value.is_object(),
    };

    if ok {
        None
    } else {
        Some(match expected {
            ParameterType::String => "must be a string",
            ParameterType::Boolean => "must be a boolean",
            ParameterType::Number => "must be a number",
            ParameterType::Integer => "must be an integer",
            ParameterType::Array => "must be an array",
            ParameterType::Object => "must be an object",
        })
    }
}
