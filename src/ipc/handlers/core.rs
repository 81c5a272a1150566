use serde_json::json;
use std::path::PathBuf;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{required_str, store_err, store_mut};
use crate::ipc::types::{AppState, Request};
use crate::model;
use crate::store::Store;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };

    match Store::open(&path) {
        Ok(store) => {
            let warnings = store.load_warnings().to_vec();
            state.workspace = Some(path.clone());
            state.store = Some(store);
            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "warnings": warnings,
                }),
            )
        }
        Err(e) => err(&req.id, "open_failed", format!("{e:#}"), None),
    }
}

// Candidate lists the form layer renders into its combo boxes. The store
// itself stays permissive about both fields.
fn handle_setup_options(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "departments": model::DEPARTMENTS,
            "semesters": model::SEMESTERS,
        }),
    )
}

fn handle_save_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.save_all() {
        Ok(()) => ok(&req.id, json!({})),
        Err(e) => store_err(req, e),
    }
}

fn handle_clear_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.clear_all() {
        Ok(()) => ok(&req.id, json!({})),
        Err(e) => store_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "setup.options" => Some(handle_setup_options(state, req)),
        "data.saveAll" => Some(handle_save_all(state, req)),
        "data.clearAll" => Some(handle_clear_all(state, req)),
        _ => None,
    }
}
