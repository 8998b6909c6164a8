#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SYS: &str = "00000000-0000-0000-0000-000000000001";
pub const PWR: &str = "00000000-0000-0000-0000-000000000002";
pub const THE: &str = "00000000-0000-0000-0000-000000000003";
pub const METRE: &str = "00000000-0000-0000-0000-000000000011";
pub const MILLIMETRE: &str = "00000000-0000-0000-0000-000000000012";
pub const KILOGRAM: &str = "00000000-0000-0000-0000-000000000013";
pub const LENGTH: &str = "00000000-0000-0000-0000-000000000021";
pub const MASS: &str = "00000000-0000-0000-0000-000000000022";
pub const SAT: &str = "00000000-0000-0000-0000-000000000031";
pub const BUS: &str = "00000000-0000-0000-0000-000000000032";

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub model: PathBuf,
    pub reports: PathBuf,
    cargo_home: PathBuf,
    rustup_home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");

        let model = make_fixture_model(tmp.path());
        let reports = tmp.path().join("reports");

        let orig_home = std::env::var("HOME").unwrap_or_default();
        let cargo_home = PathBuf::from(&orig_home).join(".cargo");
        let rustup_home = PathBuf::from(&orig_home).join(".rustup");

        Self {
            _tmp: tmp,
            home,
            model,
            reports,
            cargo_home,
            rustup_home,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("batch-editor");
        cmd.env("HOME", &self.home)
            .env("CARGO_HOME", &self.cargo_home)
            .env("RUSTUP_HOME", &self.rustup_home)
            .env_remove("BATCH_EDITOR_MODEL")
            .env("BATCH_EDITOR_LOG", "warn");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .arg("--model")
            .arg(self.model.to_str().expect("model path utf8"))
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn model_json(&self) -> Value {
        let raw = fs::read_to_string(&self.model).expect("read model");
        serde_json::from_str(&raw).expect("model is json")
    }

    pub fn audit_lines(&self) -> Vec<Value> {
        let path = self.home.join(".config/batch-editor/audit.jsonl");
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|l| serde_json::from_str(l).expect("audit line is json"))
            .collect()
    }
}

/// Element `short_name` of a model document.
pub fn element<'v>(model: &'v Value, short_name: &str) -> &'v Value {
    model["iteration"]["elements"]
        .as_array()
        .expect("elements")
        .iter()
        .find(|e| e["short_name"] == short_name)
        .expect("element present")
}

/// Parameter of `parameter_type` on element `short_name`.
pub fn parameter<'v>(model: &'v Value, short_name: &str, parameter_type: &str) -> &'v Value {
    element(model, short_name)["parameters"]
        .as_array()
        .expect("parameters")
        .iter()
        .find(|p| p["parameter_type"] == parameter_type)
        .expect("parameter present")
}

fn manual(iid: &str, value: &str) -> Value {
    json!({
        "iid": iid,
        "manual": [value],
        "computed": ["-"],
        "reference": ["-"],
        "published": [value],
        "value_switch": "MANUAL"
    })
}

fn make_fixture_model(base: &Path) -> PathBuf {
    let model = json!({
        "engineering_model": "LOFT",
        "site_directory": {
            "domains": [
                {"iid": SYS, "short_name": "SYS", "name": "System Engineering"},
                {"iid": PWR, "short_name": "PWR", "name": "Power"},
                {"iid": THE, "short_name": "THE", "name": "Thermal"}
            ],
            "reference_data_libraries": [{
                "iid": "00000000-0000-0000-0000-000000000010",
                "short_name": "GenericRDL",
                "scales": [
                    {"iid": METRE, "short_name": "m", "name": "metre"},
                    {"iid": MILLIMETRE, "short_name": "mm", "name": "millimetre"},
                    {"iid": KILOGRAM, "short_name": "kg", "name": "kilogram"}
                ],
                "parameter_types": [
                    {
                        "iid": LENGTH,
                        "short_name": "l",
                        "name": "length",
                        "class": "quantity_kind",
                        "possible_scales": [METRE, MILLIMETRE],
                        "default_scale": METRE
                    },
                    {
                        "iid": MASS,
                        "short_name": "mass",
                        "name": "mass",
                        "class": "quantity_kind",
                        "possible_scales": [KILOGRAM],
                        "default_scale": KILOGRAM
                    }
                ]
            }]
        },
        "iteration": {
            "iid": "00000000-0000-0000-0000-000000000030",
            "elements": [
                {
                    "iid": SAT,
                    "short_name": "Sat",
                    "name": "Satellite",
                    "owner": SYS,
                    "categories": ["Systems"],
                    "parameters": [
                        {
                            "iid": "00000000-0000-0000-0000-000000000041",
                            "parameter_type": MASS,
                            "owner": SYS,
                            "scale": KILOGRAM,
                            "value_sets": [manual("00000000-0000-0000-0000-000000000051", "100")]
                        },
                        {
                            "iid": "00000000-0000-0000-0000-000000000042",
                            "parameter_type": LENGTH,
                            "owner": SYS,
                            "scale": METRE,
                            "value_sets": [manual("00000000-0000-0000-0000-000000000052", "1.5")]
                        }
                    ],
                    "contained_elements": [{
                        "iid": "00000000-0000-0000-0000-000000000061",
                        "short_name": "bus",
                        "name": "bus",
                        "owner": PWR,
                        "element_definition": BUS
                    }]
                },
                {
                    "iid": BUS,
                    "short_name": "Bus",
                    "name": "Bus",
                    "owner": PWR,
                    "categories": ["Equipment"],
                    "parameters": [{
                        "iid": "00000000-0000-0000-0000-000000000043",
                        "parameter_type": LENGTH,
                        "owner": PWR,
                        "scale": METRE,
                        "value_sets": [manual("00000000-0000-0000-0000-000000000053", "2.5")]
                    }]
                }
            ],
            "actual_finite_state_lists": [
                {"iid": "00000000-0000-0000-0000-000000000071", "short_name": "Modes", "states": ["on", "off"]}
            ],
            "options": [
                {"iid": "00000000-0000-0000-0000-000000000081", "short_name": "opt1"}
            ]
        }
    });
    let path = base.join("model.json");
    fs::write(&path, serde_json::to_string_pretty(&model).expect("serialize model")).expect("write model");
    path
}
