//! RPC method handler for the calmfeed host protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested. `handle_method`
//! dispatches a method call to the services owned by [`App`].

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::options_panel::OptionsPanelTrait;
use crate::services::background::BackgroundTrait;
use crate::services::classifier::{Classifier, ClassifierTrait};
use crate::types::message::RuntimeMessage;

/// Dispatch a method call. Setters re-read stored settings first so a
/// counter written by a page is not overwritten.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Settings ───
        "settings.get" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.options.reload();
            serde_json::to_value(a.options.view()).map_err(|e| e.to_string())
        }
        "settings.update" => {
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            a.options.reload();
            a.options
                .apply_patch(params, &a.tabs)
                .map_err(|e| e.to_string())?;
            serde_json::to_value(a.options.settings()).map_err(|e| e.to_string())
        }
        "settings.setCategory" => {
            let category = params
                .get("category")
                .and_then(|v| v.as_str())
                .ok_or("missing category")?;
            let enabled = params
                .get("enabled")
                .and_then(|v| v.as_bool())
                .ok_or("missing enabled")?;
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            a.options.reload();
            a.options
                .set_category_named(category, enabled, &a.tabs)
                .map_err(|e| e.to_string())?;
            Ok(json!({"category": category, "enabled": enabled}))
        }
        "settings.resetCount" => {
            let mut guard = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *guard;
            a.options.reload();
            a.options
                .reset_filter_count(&a.tabs)
                .map_err(|e| e.to_string())?;
            Ok(json!({"filterCount": 0}))
        }

        // ─── Filtering ───
        "filter.classify" => {
            let text = params.get("text").and_then(|v| v.as_str()).ok_or("missing text")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let classifier = Classifier::new();
            let category = classifier.classify_with(text, a.options.settings());
            Ok(json!({
                "category": category,
                "matches": classifier.matches(text),
            }))
        }

        // ─── Runtime ───
        "runtime.message" => {
            let message: RuntimeMessage = serde_json::from_value(params.clone())
                .map_err(|e| format!("invalid message: {}", e))?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.dispatch(message).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "badge.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.background.current_badge()).map_err(|e| e.to_string())
        }
        "app.install" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let notification = a.install().map_err(|e| e.to_string())?;
            serde_json::to_value(notification).map_err(|e| e.to_string())
        }

        "ping" => Ok(json!({"pong": true})),

        _ => Err(format!("unknown method: {}", method)),
    }
}
