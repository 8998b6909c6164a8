mod common;

use common::TestEnv;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

fn load_schema(name: &str) -> Value {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let raw = fs::read_to_string(root.join("docs/contracts").join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn validate(schema_name: &str, data: &Value) {
    let schema = load_schema(schema_name);
    let validator = JSONSchema::compile(&schema).expect("compile schema");
    let msgs: Vec<String> = match validator.validate(data) {
        Ok(()) => return,
        Err(errors) => errors.map(|e| e.to_string()).collect(),
    };
    panic!("schema validation failed: {}", msgs.join(" | "));
}

#[test]
fn committed_run_matches_contract() {
    let env = TestEnv::new();
    let out = env.run_json(&["--action", "add-parameters", "--parameters", "mass", "--parameter-group", "Budget"]);
    validate("run-report.schema.json", &out);
    let operations: Vec<&str> = out["data"]["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["operation"].as_str().unwrap())
        .collect();
    // Bus: group and mass created; Sat: group created, existing mass moved into it
    assert_eq!(operations, vec!["create", "create", "create", "update"]);
}

#[test]
fn dry_run_with_report_matches_contract() {
    let env = TestEnv::new();
    let reports = env.reports.to_str().unwrap().to_string();
    let out = env.run_json(&[
        "--action", "remove-parameters", "--parameters", "l", "--dry", "--report", "--report-dir",
        reports.as_str(),
    ]);
    validate("run-report.schema.json", &out);
    assert_eq!(out["data"]["transactions"][0]["class"], "parameter");
}

#[test]
fn no_action_run_matches_contract() {
    let env = TestEnv::new();
    let out = env.run_json(&[]);
    validate("run-report.schema.json", &out);
    assert!(out["data"]["action"].is_null());
}
