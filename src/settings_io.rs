use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config;
use crate::settings::ChromeSettings;

const SETTINGS_FILE: &str = "settings.json";

pub fn framechrome_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("framechrome"))
}

pub fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE)
}

fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_obj), Value::Object(overlay_obj)) => {
            for (k, v) in overlay_obj {
                match base_obj.get_mut(&k) {
                    Some(existing) => merge_json(existing, v),
                    None => {
                        base_obj.insert(k, v);
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value;
        }
    }
}

/// Bring a hand-edited or older settings document into the current schema.
///
/// Invalid values are removed so the defaults apply instead.
pub fn sanitize_settings_json(value: &mut Value) {
    let Value::Object(obj) = value else {
        return;
    };

    // Older files stored the policy as a bare string
    if let Some(policy) = obj.get("shadow_policy").and_then(|v| v.as_str()) {
        let migrated = match policy.to_lowercase().as_str() {
            "coalesced" => Some(serde_json::json!({ "kind": "coalesced" })),
            "debounced" => Some(serde_json::json!({
                "kind": "debounced",
                "delay_ms": config::timing::SHADOW_SHOW_DELAY_MS
            })),
            _ => None,
        };
        match migrated {
            Some(v) => {
                obj.insert("shadow_policy".to_string(), v);
            }
            None => {
                obj.remove("shadow_policy");
            }
        }
    }

    if obj.get("shadow_width").is_some_and(|v| !is_pixel_count(v)) {
        obj.remove("shadow_width");
    }

    match obj.get_mut("margins") {
        Some(Value::Object(margins)) => margins.retain(|_, v| is_pixel_count(v)),
        Some(_) => {
            obj.remove("margins");
        }
        None => {}
    }

    for key in ["log_to_file", "remember_geometry"] {
        if obj.get(key).is_some_and(|v| !v.is_boolean()) {
            obj.remove(key);
        }
    }
    if obj.get("log_level").is_some_and(|v| !v.is_string()) {
        obj.remove("log_level");
    }
    if obj
        .get("log_retention_days")
        .is_some_and(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()).is_none())
    {
        obj.remove("log_retention_days");
    }

    if let Some(theme) = obj.get("theme").and_then(|v| v.as_str()) {
        let normalized = theme.to_lowercase();
        if normalized == "light" || normalized == "dark" {
            obj.insert("theme".to_string(), Value::String(normalized));
        } else {
            obj.remove("theme");
        }
    }

    // Snapshot envelopes are objects; older files held a hex string
    if obj.get("last_geometry").is_some_and(|v| !v.is_object()) {
        obj.remove("last_geometry");
    }
}

/// Non-negative value that fits the i32 pixel fields
fn is_pixel_count(value: &Value) -> bool {
    value
        .as_i64()
        .is_some_and(|n| n >= 0 && n <= i64::from(i32::MAX))
}

fn default_settings_value() -> Value {
    serde_json::to_value(ChromeSettings::default()).unwrap_or_else(|_| serde_json::json!({}))
}

/// Apply the overlay one top-level key at a time, dropping keys the schema
/// still rejects after sanitizing
fn salvage_settings(overlay: Value) -> ChromeSettings {
    let mut merged = default_settings_value();
    if let Value::Object(obj) = overlay {
        for (key, value) in obj {
            let mut candidate = merged.clone();
            let mut single = serde_json::Map::new();
            single.insert(key.clone(), value);
            merge_json(&mut candidate, Value::Object(single));
            if serde_json::from_value::<ChromeSettings>(candidate.clone()).is_ok() {
                merged = candidate;
            } else {
                log::warn!("Dropping invalid setting '{}'", key);
            }
        }
    }
    serde_json::from_value(merged).unwrap_or_default()
}

/// Load settings from `dir`, falling back to defaults for anything missing
/// or invalid. A normalized file is written back.
pub fn load_settings_from_disk(dir: &Path) -> ChromeSettings {
    let path = settings_path(dir);

    let raw = std::fs::read_to_string(&path).unwrap_or_else(|_| "{}".to_string());
    let mut value: Value = serde_json::from_str(&raw).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed {}: {}", path.display(), e);
        serde_json::json!({})
    });

    sanitize_settings_json(&mut value);

    let mut merged = default_settings_value();
    merge_json(&mut merged, value.clone());

    let settings = match serde_json::from_value::<ChromeSettings>(merged) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Invalid values in {}: {}", path.display(), e);
            salvage_settings(value)
        }
    };

    if let Err(e) = persist_settings_to_disk(dir, &settings) {
        log::warn!("Failed to persist normalized settings: {}", e);
    }

    settings
}

/// Write settings to `dir`, keeping unknown keys already present in the file.
pub fn persist_settings_to_disk(dir: &Path, settings: &ChromeSettings) -> Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let path = settings_path(dir);

    let mut existing_value: Value = match std::fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| serde_json::json!({})),
        Err(_) => serde_json::json!({}),
    };
    if !existing_value.is_object() {
        existing_value = serde_json::json!({});
    }

    let new_value = serde_json::to_value(settings).map_err(|e| e.to_string())?;
    merge_json(&mut existing_value, new_value);
    if settings.last_geometry.is_none() {
        if let Value::Object(obj) = &mut existing_value {
            obj.remove("last_geometry");
        }
    }

    let pretty = serde_json::to_string_pretty(&existing_value).map_err(|e| e.to_string())?;

    // Write to a sibling temp file first so a crash never leaves a truncated file
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, pretty).map_err(|e| e.to_string())?;
    std::fs::rename(&tmp_path, &path).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_migrates_string_policy() {
        let mut value = json!({ "shadow_policy": "Coalesced" });
        sanitize_settings_json(&mut value);
        assert_eq!(value["shadow_policy"], json!({ "kind": "coalesced" }));

        let mut value = json!({ "shadow_policy": "debounced" });
        sanitize_settings_json(&mut value);
        assert_eq!(value["shadow_policy"]["delay_ms"], json!(500));

        let mut value = json!({ "shadow_policy": "sometimes" });
        sanitize_settings_json(&mut value);
        assert!(value.get("shadow_policy").is_none());
    }

    #[test]
    fn sanitize_drops_negative_values() {
        let mut value = json!({
            "shadow_width": -3,
            "margins": { "title_bar_height": 32, "icon_width": -1 }
        });
        sanitize_settings_json(&mut value);
        assert!(value.get("shadow_width").is_none());
        assert_eq!(value["margins"], json!({ "title_bar_height": 32 }));
    }

    #[test]
    fn sanitize_normalizes_theme() {
        let mut value = json!({ "theme": "Dark" });
        sanitize_settings_json(&mut value);
        assert_eq!(value["theme"], json!("dark"));

        let mut value = json!({ "theme": "sepia" });
        sanitize_settings_json(&mut value);
        assert!(value.get("theme").is_none());
    }

    #[test]
    fn sanitize_drops_out_of_range_and_mistyped_values() {
        let mut value = json!({
            "shadow_width": "wide",
            "margins": { "title_bar_height": 5000000000u64, "icon_width": 24, "left": 1.5 },
            "log_to_file": "yes",
            "log_level": 3,
            "log_retention_days": -1
        });
        sanitize_settings_json(&mut value);
        assert!(value.get("shadow_width").is_none());
        assert_eq!(value["margins"], json!({ "icon_width": 24 }));
        assert!(value.get("log_to_file").is_none());
        assert!(value.get("log_level").is_none());
        assert!(value.get("log_retention_days").is_none());
    }

    #[test]
    fn sanitize_drops_legacy_hex_geometry() {
        let mut value = json!({ "last_geometry": "7b2276" });
        sanitize_settings_json(&mut value);
        assert!(value.get("last_geometry").is_none());
    }

    #[test]
    fn salvage_keeps_valid_keys() {
        let settings = salvage_settings(json!({
            "log_level": "Debug",
            "shadow_policy": { "kind": "debounced", "delay_ms": -5 }
        }));
        assert_eq!(settings.log_level, "Debug");
        assert_eq!(settings.shadow_policy, crate::timer::ShadowShowPolicy::default());
    }
}
