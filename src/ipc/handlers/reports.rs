use serde_json::json;
use std::path::PathBuf;

use crate::ipc::error::ok;
use crate::ipc::helpers::{optional_str, required_str, store_err, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::report;
use crate::rules::ClassStanding;

fn handle_transcript(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match report::student_transcript(store, &student_id) {
        Ok(transcript) => {
            let cgpa = store.cgpa_for(&student_id);
            ok(
                &req.id,
                json!({
                    "transcript": transcript,
                    "cgpa": cgpa,
                    "classStanding": ClassStanding::from_gpa(cgpa),
                }),
            )
        }
        Err(e) => store_err(req, e),
    }
}

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match report::export_transcript(store, &student_id, &path) {
        Ok(()) => ok(&req.id, json!({ "exportedTo": path.to_string_lossy() })),
        Err(e) => store_err(req, e),
    }
}

fn handle_statistics(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let stats = if let Some(student_id) = optional_str(req, "studentId") {
        match report::statistics_for_student(store, &student_id) {
            Ok(v) => v,
            Err(e) => return store_err(req, e),
        }
    } else if let Some(course_code) = optional_str(req, "courseCode") {
        match report::statistics_for_course(store, &course_code) {
            Ok(v) => v,
            Err(e) => return store_err(req, e),
        }
    } else {
        report::statistics_overall(store)
    };

    let summary = stats.summary();
    ok(
        &req.id,
        json!({
            "statistics": stats,
            "summary": summary,
        }),
    )
}

fn handle_dashboard(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!(report::dashboard_summary(store)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.transcript" => Some(handle_transcript(state, req)),
        "reports.export" => Some(handle_export(state, req)),
        "reports.statistics" => Some(handle_statistics(state, req)),
        "reports.dashboard" => Some(handle_dashboard(state, req)),
        _ => None,
    }
}
