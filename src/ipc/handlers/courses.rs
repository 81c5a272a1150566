use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    invalid, optional_str, required_i64, required_str, store_err, store_mut, store_ref,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Course, Describable};
use crate::validate;

fn parse_course(req: &Request) -> Result<Course, serde_json::Value> {
    let course_code = required_str(req, "courseCode")?;
    let name = required_str(req, "name")?;
    let credits = required_i64(req, "credits")?;
    let instructor = required_str(req, "instructor")?;

    if !validate::is_valid_course_code(&course_code) {
        return Err(invalid(req, "Invalid course code! Example: ACSC 223"));
    }
    if validate::is_empty(&name) || validate::is_empty(&instructor) {
        return Err(invalid(req, "Course name and instructor must not be empty"));
    }
    if !validate::is_valid_credits(credits) {
        return Err(invalid(req, "Credits must be between 1 and 10"));
    }

    Ok(Course {
        course_code,
        name,
        credits,
        instructor,
        description: optional_str(req, "description"),
    })
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course = match parse_course(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let course_code = course.course_code.clone();
    match store.save_course(course) {
        Ok(()) => ok(&req.id, json!({ "courseCode": course_code })),
        Err(e) => store_err(req, e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course = match parse_course(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let course_code = course.course_code.clone();
    match store.update_course(course) {
        Ok(()) => ok(&req.id, json!({ "courseCode": course_code })),
        Err(e) => store_err(req, e),
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_code = match required_str(req, "courseCode") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let Some(course) = store.find_course(&course_code) else {
        return err(&req.id, "not_found", "course not found", None);
    };
    ok(
        &req.id,
        json!({
            "course": course,
            "details": course.details(),
        }),
    )
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!({ "courses": store.courses() }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_code = match required_str(req, "courseCode") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match store.delete_course(&course_code) {
        Ok(()) => ok(&req.id, json!({})),
        Err(e) => store_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.save" => Some(handle_save(state, req)),
        "courses.update" => Some(handle_update(state, req)),
        "courses.get" => Some(handle_get(state, req)),
        "courses.list" => Some(handle_list(state, req)),
        "courses.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
