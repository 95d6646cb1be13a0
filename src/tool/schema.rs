//! Translates tool descriptors into the model's function-calling envelope.

use serde_json::{Value, json};

use crate::tool::ToolDescriptor;

/// Converts tool descriptors to the model-native function spec list.
///
/// Pure and total: name, description and the full parameter schema are
/// preserved verbatim; only the envelope changes.
pub fn to_model_schema(descriptors: &[ToolDescriptor]) -> Vec<Value> {
    descriptors
        .iter()
        .map(|descriptor| {
            json!({
                "type": "function",
                "function": {
                    "name": descriptor.name,
                    "description": descriptor.description,
                    "parameters": descriptor.parameters,
                }
            })
        })
        .collect()
}
