use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{invalid, required_i64, required_str, store_err, store_mut, store_ref};
use crate::ipc::types::{AppState, Request};
use crate::model::{Describable, Student};
use crate::rules::{self, ClassStanding};
use crate::validate;

struct StudentFields {
    name: String,
    email: String,
    phone: String,
    student_id: String,
    department: String,
    year_of_study: i64,
}

fn parse_student_fields(req: &Request) -> Result<StudentFields, serde_json::Value> {
    let student_id = required_str(req, "studentId")?;
    let name = required_str(req, "name")?;
    let email = required_str(req, "email")?;
    let phone = required_str(req, "phone")?;
    let department = required_str(req, "department")?;
    let year_of_study = required_i64(req, "yearOfStudy")?;

    if !validate::is_valid_student_id(&student_id) {
        return Err(invalid(req, "Invalid Student ID format!"));
    }
    if !validate::is_valid_name(&name) {
        return Err(invalid(req, "Invalid name!"));
    }
    if !validate::is_valid_email(&email) {
        return Err(invalid(req, "Invalid email address!"));
    }
    if !validate::is_valid_phone(&phone) {
        return Err(invalid(req, "Invalid phone number!"));
    }
    if validate::is_empty(&department) {
        return Err(invalid(req, "Department must not be empty"));
    }
    if !validate::is_valid_year_of_study(year_of_study) {
        return Err(invalid(req, "Year of study must be between 1 and 6"));
    }

    Ok(StudentFields {
        name,
        email,
        phone,
        student_id,
        department,
        year_of_study,
    })
}

/// Builds the record to store: a fresh entity for new keys, otherwise a
/// replacement that keeps the opaque id and enrollment of the existing one.
fn apply_fields(existing: Option<&Student>, fields: StudentFields) -> Student {
    match existing {
        Some(current) => {
            let mut replacement = current.clone();
            replacement.name = fields.name;
            replacement.email = fields.email;
            replacement.phone = fields.phone;
            replacement.department = fields.department;
            replacement.year_of_study = fields.year_of_study;
            replacement
        }
        None => Student::new(
            fields.name,
            fields.email,
            fields.phone,
            fields.student_id,
            fields.department,
            fields.year_of_study,
        ),
    }
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let fields = match parse_student_fields(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let student_id = fields.student_id.clone();
    let student = apply_fields(store.find_student(&student_id), fields);
    match store.save_student(student) {
        Ok(()) => ok(&req.id, json!({ "studentId": student_id })),
        Err(e) => store_err(req, e),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let fields = match parse_student_fields(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let student_id = fields.student_id.clone();
    let replacement = match store.find_student(&student_id) {
        Some(existing) => apply_fields(Some(existing), fields),
        None => apply_fields(None, fields),
    };
    match store.update_student(replacement) {
        Ok(()) => ok(&req.id, json!({ "studentId": student_id })),
        Err(e) => store_err(req, e),
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let Some(student) = store.find_student(&student_id) else {
        return err(&req.id, "not_found", "student not found", None);
    };
    let units = store.graded_units_for(&student_id);
    let cgpa = store.cgpa_for(&student_id);
    ok(
        &req.id,
        json!({
            "student": student,
            "details": student.details(),
            "cgpa": cgpa,
            "totalCredits": rules::total_credits(units),
            "classStanding": ClassStanding::from_gpa(cgpa),
            "honorRoll": rules::is_honor_roll(cgpa),
        }),
    )
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match store_ref(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let students: Vec<serde_json::Value> = store
        .students()
        .iter()
        .map(|s| {
            let mut row = serde_json::to_value(s).unwrap_or_else(|_| json!({}));
            if let Some(obj) = row.as_object_mut() {
                obj.insert("cgpa".to_string(), json!(store.cgpa_for(&s.student_id)));
            }
            row
        })
        .collect();
    ok(&req.id, json!({ "students": students }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let store = match store_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match store.delete_student(&student_id) {
        Ok(()) => ok(&req.id, json!({})),
        Err(e) => store_err(req, e),
    }
}

fn handle_enroll(state: &mut AppState, req: &Request) -> serde_json::Value {
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

    match store.enroll(&student_id, &course_code) {
        Ok(added) => ok(&req.id, json!({ "enrolled": added })),
        Err(e) => store_err(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.save" => Some(handle_save(state, req)),
        "students.update" => Some(handle_update(state, req)),
        "students.get" => Some(handle_get(state, req)),
        "students.list" => Some(handle_list(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        "students.enroll" => Some(handle_enroll(state, req)),
        _ => None,
    }
}
