//! Override layers for the host configuration
//!
//! Each layer is a partial JSON object laid over the ones below it. A key
//! that is missing from a layer, or present as `null`, leaves the lower
//! value in place: command-line flags the user did not pass arrive as
//! `null` and must not clobber the repo file. Tables combine key by key;
//! strings, numbers and arrays replace whatever was below.

use serde_json::Value;

/// Lay `layer` over `base`
pub fn apply_layer(base: Value, layer: Value) -> Value {
    match (base, layer) {
        (base, Value::Null) => base,
        (Value::Object(mut table), Value::Object(layer)) => {
            for (key, value) in layer {
                let below = table.remove(&key).unwrap_or(Value::Null);
                table.insert(key, apply_layer(below, value));
            }
            Value::Object(table)
        }
        (_, layer) => layer,
    }
}

/// Combine layers given lowest precedence first
pub fn layered(layers: impl IntoIterator<Item = Value>) -> Value {
    layers.into_iter().fold(Value::Null, apply_layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_flags_keep_repo_values() {
        let repo = json!({"workspace_name": "robot", "build_dir": "/abs/build"});
        let cli = json!({"workspace_name": null, "build_dir": "out"});

        let result = apply_layer(repo, cli);
        assert_eq!(result, json!({"workspace_name": "robot", "build_dir": "out"}));
    }

    #[test]
    fn test_partial_table() {
        let base = json!({"python": {"prefix": "/ws/install", "version": "3.5"}});
        let result = apply_layer(base, json!({"python": {"version": "3.8"}}));

        assert_eq!(result["python"]["prefix"], "/ws/install");
        assert_eq!(result["python"]["version"], "3.8");
    }

    #[test]
    fn test_arrays_replace() {
        let result = apply_layer(json!({"extra": ["a", "b"]}), json!({"extra": ["c"]}));
        assert_eq!(result["extra"], json!(["c"]));
    }

    #[test]
    fn test_layer_order() {
        let result = layered([
            json!({"workspace_name": "autoproj", "line_length": 120}),
            json!({"line_length": 100}),
            json!({"workspace_name": "robot", "line_length": null}),
        ]);

        assert_eq!(result["workspace_name"], "robot");
        assert_eq!(result["line_length"], 100);
    }
}
