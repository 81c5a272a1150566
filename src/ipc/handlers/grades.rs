use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{invalid, required_f64, required_str, store_err, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::Grade;
use crate::validate;

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let course_code = match required_str(req, "courseCode") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let score = match required_f64(req, "score") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let semester = match required_str(req, "semester") {
        Ok(v) => v,
        Err(e) => return e,
    };

    if !validate::is_valid_score(score) {
        return invalid(req, "Score must be between 0 and 100");
    }

    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let grade = Grade::new(student_id, course_code, score, semester);
    match store.save_grade(grade.clone()) {
        Ok(()) => ok(&req.id, json!({ "grade": grade })),
        Err(e) => store_err(req, e),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let course_code = match required_str(req, "courseCode") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match store.delete_grade(&student_id, &course_code) {
        Ok(()) => ok(&req.id, json!({})),
        Err(e) => store_err(req, e),
    }
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!({ "grades": store.grades() }))
}

fn handle_by_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({ "grades": store.grades_by_student(&student_id) }),
    )
}

fn handle_by_course(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_code = match required_str(req, "courseCode") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({ "grades": store.grades_by_course(&course_code) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.save" => Some(handle_save(state, req)),
        "grades.delete" => Some(handle_delete(state, req)),
        "grades.list" => Some(handle_list(state, req)),
        "grades.byStudent" => Some(handle_by_student(state, req)),
        "grades.byCourse" => Some(handle_by_course(state, req)),
        _ => None,
    }
}
