mod test_support;

use std::process::Command;
use test_support::fixture_path;

fn snapshot(args: &[&str]) -> serde_json::Value {
    let out = Command::new(env!("CARGO_BIN_EXE_gradeboard"))
        .args(args)
        .env_remove("GRADEBOARD_LOG")
        .output()
        .expect("run gradeboard");
    assert!(out.status.success(), "exit status {:?}", out.status);
    serde_json::from_slice(&out.stdout).expect("snapshot json")
}

#[test]
fn snapshot_from_workbook() {
    let data = fixture_path("fixtures/grades_sample.xlsx");
    let doc = snapshot(&[
        data.to_str().expect("utf-8 path"),
        "--snapshot",
        "Jean Dupont",
        "--unit",
        "UE2",
    ]);
    assert!(doc.get("loadError").map(|v| v.is_null()).unwrap_or(false));
    assert_eq!(
        doc.get("selection").and_then(|s| s.get("recordCount")),
        Some(&serde_json::json!(3))
    );
    let rows = doc
        .get("subjectComparison")
        .and_then(|c| c.get("rows"))
        .and_then(|r| r.as_array())
        .cloned()
        .unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("subject").and_then(|v| v.as_str()),
        Some("Chemistry")
    );
    assert_eq!(
        rows[0].get("band").and_then(|v| v.as_str()),
        Some("boundary")
    );
}

#[test]
fn snapshot_of_unknown_student_still_prints_a_document() {
    let data = fixture_path("fixtures/grades_sample.csv");
    let doc = snapshot(&[
        data.to_str().expect("utf-8 path"),
        "--snapshot",
        "Nobody Here",
    ]);
    assert!(doc.get("selection").map(|v| v.is_null()).unwrap_or(false));
    assert_eq!(
        doc.get("unitAverages")
            .and_then(|u| u.get("status"))
            .and_then(|v| v.as_str()),
        Some("noData")
    );
}
