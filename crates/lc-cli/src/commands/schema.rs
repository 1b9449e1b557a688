use lc_core::ObservedObject;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `lce schema`: the JSON Schema of the state slot (an object array).
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&slot_schema()?, flags.format)
}

fn slot_schema() -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(schemars::schema_for!(Vec<ObservedObject>))?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn slot_schema_is_an_array_of_objects() {
        let schema = slot_schema().unwrap();
        assert_eq!(schema["type"], "array");
        assert!(schema.to_string().contains("objectId"));
    }
}
