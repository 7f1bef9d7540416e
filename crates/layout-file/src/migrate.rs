use layout_engine::LayoutConfig;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::errors::LoadError;

/// Apply format migrations from `from_version` to `to_version`.
///
/// Migrations are applied one version at a time on the raw document.
pub fn migrate(mut raw: Value, from_version: u32, to_version: u32) -> Result<Value, LoadError> {
    let mut version = from_version;
    while version < to_version {
        raw = match version {
            1 => migrate_v1_to_v2(raw)?,
            _ => {
                return Err(LoadError::MigrationFailed {
                    from: version,
                    to: to_version,
                    reason: format!("no migration path from v{version}"),
                })
            }
        };
        version += 1;
    }
    if let Some(obj) = raw.as_object_mut() {
        obj.insert("version".into(), json!(to_version));
    }
    Ok(raw)
}

/// v1 stored bare steps and no config. v2 gives every step an id and
/// records the config the layout was built with.
fn migrate_v1_to_v2(mut raw: Value) -> Result<Value, LoadError> {
    let fail = |reason: &str| LoadError::MigrationFailed {
        from: 1,
        to: 2,
        reason: reason.to_string(),
    };
    let obj = raw.as_object_mut().ok_or_else(|| fail("document is not an object"))?;

    let steps = match obj.remove("steps") {
        Some(Value::Array(steps)) => steps,
        Some(_) => return Err(fail("steps is not an array")),
        None => Vec::new(),
    };
    let wrapped: Vec<Value> = steps
        .into_iter()
        .map(|step| {
            let mut entry = Map::new();
            entry.insert("id".into(), json!(Uuid::new_v4()));
            entry.insert("step".into(), step);
            Value::Object(entry)
        })
        .collect();
    obj.insert("steps".into(), Value::Array(wrapped));

    if !obj.contains_key("config") {
        let config = serde_json::to_value(LayoutConfig::default()).map_err(|e| fail(&e.to_string()))?;
        obj.insert("config".into(), config);
    }
    Ok(raw)
}
