use serde_json::json;
use std::path::PathBuf;

use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{required_str, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match backup::export_data_bundle(store.data_dir(), &path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "bundleFormat": summary.bundle_format,
                "entryCount": summary.entry_count,
                "exportedTo": path.to_string_lossy(),
            }),
        ),
        Err(e) => err(&req.id, "persist_failed", format!("{e:#}"), None),
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let summary = match backup::import_data_bundle(&path, &workspace) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "persist_failed", format!("{e:#}"), None),
    };

    // The restored files replace whatever the store had loaded; reopen so
    // in-memory state matches disk again.
    match Store::open(&workspace) {
        Ok(store) => {
            let warnings = store.load_warnings().to_vec();
            state.store = Some(store);
            ok(
                &req.id,
                json!({
                    "bundleFormat": summary.bundle_format_detected,
                    "restoredFiles": summary.restored_files,
                    "warnings": warnings,
                }),
            )
        }
        Err(e) => err(&req.id, "open_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_export(state, req)),
        "backup.import" => Some(handle_import(state, req)),
        _ => None,
    }
}
