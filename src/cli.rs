use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "batch-editor",
    version,
    about = "Filtered bulk edits of an engineering model, staged and committed as one changeset"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, env = "BATCH_EDITOR_MODEL", help = "Model snapshot (JSON) to open")]
    pub model: PathBuf,
    #[arg(long, value_enum, help = "Batch action to perform on the model")]
    pub action: Option<Action>,
    #[arg(
        long = "parameters",
        value_delimiter = ',',
        help = "Comma-separated short names of parameter types the action applies to"
    )]
    pub selected_parameters: Vec<String>,
    #[arg(
        long = "categories",
        value_delimiter = ',',
        help = "Only element definitions in at least one of these categories"
    )]
    pub filtered_categories: Vec<String>,
    #[arg(
        long,
        help = "Short name of the element definition at the top of the subtree to edit"
    )]
    pub element_definition: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Only element definitions owned by these domains (all when omitted)"
    )]
    pub included_owners: Vec<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Skip element definitions owned by these domains (applied after --included-owners)"
    )]
    pub excluded_owners: Vec<String>,
    #[arg(long = "domain", help = "Short name of the owner or subscriber domain")]
    pub domain_of_expertise: Option<String>,
    #[arg(long = "to-domain", help = "Short name of the domain to change ownership to")]
    pub to_domain_of_expertise: Option<String>,
    #[arg(long, help = "Short name of the measurement scale to assign")]
    pub scale: Option<String>,
    #[arg(
        long,
        help = "Current scale of the values to convert; enables value conversion for set-scale"
    )]
    pub from_scale: Option<String>,
    #[arg(long, help = "Multiplicative factor from --from-scale to --scale")]
    pub conversion_factor: Option<f64>,
    #[arg(long = "state", help = "Short name of an actual finite state list")]
    pub state_list_name: Option<String>,
    #[arg(
        long = "parameter-switch",
        value_enum,
        ignore_case = true,
        help = "Switch to set on subscriptions owned by --domain"
    )]
    pub parameter_switch_kind: Option<SwitchKind>,
    #[arg(long, help = "Parameter group new parameters are added to (created if missing)")]
    pub parameter_group: Option<String>,
    #[arg(long, help = "Write a CSV report of element definitions and parameters")]
    pub report: bool,
    #[arg(long, default_value = ".", help = "Directory the CSV report is written to")]
    pub report_dir: PathBuf,
    #[arg(long = "dry", help = "Compute and log every change without committing it")]
    pub dry_run: bool,
    #[arg(long, help = "Write the committed model here instead of overwriting --model")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn selected_parameters(&self) -> Vec<String> {
        trimmed(&self.selected_parameters)
    }

    pub fn has_selected_parameters(&self) -> bool {
        !self.selected_parameters().is_empty()
    }

    pub fn is_selected(&self, parameter_type_short_name: &str) -> bool {
        self.selected_parameters()
            .iter()
            .any(|p| p == parameter_type_short_name)
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// The closed set of batch actions; exactly one runs per invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Action {
    AddParameters,
    RemoveParameters,
    MoveReferenceValuesToManualValues,
    ApplyOptionDependence,
    ApplyStateDependence,
    ChangeParameterOwnership,
    ChangeDomain,
    RemoveOptionDependence,
    RemoveStateDependence,
    SetGenericOwners,
    SetScale,
    StandardizeDimensionsInMillimeter,
    SetSubscriptionSwitch,
    Subscribe,
}

impl Action {
    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_else(|| format!("{:?}", self))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchKind {
    #[value(name = "COMPUTED")]
    Computed,
    #[value(name = "MANUAL")]
    Manual,
    #[value(name = "REFERENCE")]
    Reference,
}

impl fmt::Display for SwitchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwitchKind::Computed => "COMPUTED",
            SwitchKind::Manual => "MANUAL",
            SwitchKind::Reference => "REFERENCE",
        };
        f.write_str(name)
    }
}
