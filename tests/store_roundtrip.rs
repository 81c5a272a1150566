use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn collections_survive_a_daemon_restart() {
    let workspace = temp_dir("gradebook-roundtrip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.save",
        json!({
            "studentId": "CS1234",
            "name": "Jane Doe",
            "email": "jane@chuka.ac.ke",
            "phone": "0712345678",
            "department": "Computer Science",
            "yearOfStudy": 2
        }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "courses.save",
        json!({
            "courseCode": "ACSC 223",
            "name": "Object Oriented Programming",
            "credits": 4,
            "instructor": "Dr Mwangi",
            "description": "Classes, interfaces and collections"
        }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "grades.save",
        json!({
            "studentId": "CS1234",
            "courseCode": "ACSC 223",
            "score": 64.5,
            "semester": "Semester 2 - 2024/2025"
        }),
    );
    let before = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.get",
        json!({ "studentId": "CS1234" }),
    );
    request_ok(&mut stdin, &mut reader, "6", "data.saveAll", json!({}));

    drop(stdin);
    child.wait().expect("daemon exits on stdin close");

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(
        selected
            .get("warnings")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );

    let after = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.get",
        json!({ "studentId": "CS1234" }),
    );
    assert_eq!(
        before.get("student"),
        after.get("student"),
        "student must round-trip structurally identical"
    );

    let grades = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "grades.byStudent",
        json!({ "studentId": "CS1234" }),
    );
    let rows = grades
        .get("grades")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("grades array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("score").and_then(|v| v.as_f64()), Some(64.5));
    assert_eq!(
        rows[0].get("letterGrade").and_then(|v| v.as_str()),
        Some("B")
    );
    assert_eq!(
        rows[0].get("semester").and_then(|v| v.as_str()),
        Some("Semester 2 - 2024/2025")
    );

    let course = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "courses.get",
        json!({ "courseCode": "ACSC 223" }),
    );
    assert_eq!(
        course
            .get("course")
            .and_then(|c| c.get("description"))
            .and_then(|v| v.as_str()),
        Some("Classes, interfaces and collections")
    );
}

#[test]
fn malformed_collection_file_surfaces_a_warning_not_a_failure() {
    let workspace = temp_dir("gradebook-malformed");
    std::fs::write(workspace.join("students.json"), "{ definitely not a list")
        .expect("write garbage");

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let warnings = selected
        .get("warnings")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("warnings array");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0]
        .as_str()
        .map(|s| s.contains("students"))
        .unwrap_or(false));

    let listing = request_ok(&mut stdin, &mut reader, "2", "students.list", json!({}));
    assert_eq!(
        listing
            .get("students")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );
}

#[test]
fn missing_files_load_as_empty_collections() {
    let workspace = temp_dir("gradebook-missing-files");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(
        selected
            .get("warnings")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );

    for (id, method, key) in [
        ("2", "students.list", "students"),
        ("3", "courses.list", "courses"),
        ("4", "grades.list", "grades"),
    ] {
        let listing = request_ok(&mut stdin, &mut reader, id, method, json!({}));
        assert_eq!(
            listing.get(key).and_then(|v| v.as_array()).map(|a| a.len()),
            Some(0),
            "{} should start empty",
            method
        );
    }
}
