use crate::cli::SwitchKind;
use crate::domain::constants::UNSET;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of every thing in the model. Comparisons for ownership and
/// filtering go through this, never through names.
pub type Iid = Uuid;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainOfExpertise {
    pub iid: Iid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementScale {
    pub iid: Iid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTypeComponent {
    pub short_name: String,
    pub parameter_type: Iid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ParameterTypeKind {
    QuantityKind {
        #[serde(default)]
        possible_scales: Vec<Iid>,
        #[serde(default)]
        default_scale: Option<Iid>,
    },
    Enumeration {
        #[serde(default)]
        literals: Vec<String>,
    },
    Boolean,
    Text,
    Compound {
        #[serde(default)]
        components: Vec<ParameterTypeComponent>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterType {
    pub iid: Iid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: ParameterTypeKind,
}

impl ParameterType {
    pub fn is_quantity_kind(&self) -> bool {
        matches!(self.kind, ParameterTypeKind::QuantityKind { .. })
    }

    /// Everything but compound types carries a single value per value set.
    pub fn is_scalar(&self) -> bool {
        !matches!(self.kind, ParameterTypeKind::Compound { .. })
    }

    pub fn possible_scales(&self) -> &[Iid] {
        match &self.kind {
            ParameterTypeKind::QuantityKind {
                possible_scales, ..
            } => possible_scales,
            _ => &[],
        }
    }

    pub fn default_scale(&self) -> Option<Iid> {
        match &self.kind {
            ParameterTypeKind::QuantityKind { default_scale, .. } => *default_scale,
            _ => None,
        }
    }

    pub fn number_of_values(&self) -> usize {
        match &self.kind {
            ParameterTypeKind::Compound { components } => components.len().max(1),
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDataLibrary {
    pub iid: Iid,
    pub short_name: String,
    #[serde(default)]
    pub scales: Vec<MeasurementScale>,
    #[serde(default)]
    pub parameter_types: Vec<ParameterType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteDirectory {
    #[serde(default)]
    pub domains: Vec<DomainOfExpertise>,
    #[serde(default)]
    pub reference_data_libraries: Vec<ReferenceDataLibrary>,
}

impl SiteDirectory {
    pub fn domain_by_short_name(&self, short_name: &str) -> Option<&DomainOfExpertise> {
        self.domains.iter().find(|d| d.short_name == short_name)
    }

    pub fn scales(&self) -> impl Iterator<Item = &MeasurementScale> {
        self.reference_data_libraries
            .iter()
            .flat_map(|rdl| rdl.scales.iter())
    }

    pub fn scale_by_short_name(&self, short_name: &str) -> Option<&MeasurementScale> {
        self.scales().find(|s| s.short_name == short_name)
    }

    pub fn parameter_types(&self) -> impl Iterator<Item = &ParameterType> {
        self.reference_data_libraries
            .iter()
            .flat_map(|rdl| rdl.parameter_types.iter())
    }

    pub fn parameter_type_by_short_name(&self, short_name: &str) -> Option<&ParameterType> {
        self.parameter_types().find(|pt| pt.short_name == short_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualFiniteStateList {
    pub iid: Iid,
    pub short_name: String,
    #[serde(default)]
    pub states: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOption {
    pub iid: Iid,
    pub short_name: String,
}

/// Manual/Computed/Reference/Published arrays plus the switch that picks the
/// authoritative source. Shared by parameter, override and subscription
/// value sets; subscriptions leave `published` empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSet {
    pub iid: Iid,
    #[serde(default)]
    pub manual: Vec<String>,
    #[serde(default)]
    pub computed: Vec<String>,
    #[serde(default)]
    pub reference: Vec<String>,
    #[serde(default)]
    pub published: Vec<String>,
    pub value_switch: SwitchKind,
    #[serde(default)]
    pub actual_option: Option<String>,
    #[serde(default)]
    pub actual_state: Option<String>,
}

impl ValueSet {
    pub fn unset(number_of_values: usize, value_switch: SwitchKind) -> Self {
        let blank = vec![UNSET.to_string(); number_of_values];
        Self {
            iid: Uuid::new_v4(),
            manual: blank.clone(),
            computed: blank.clone(),
            reference: blank.clone(),
            published: blank,
            value_switch,
            actual_option: None,
            actual_state: None,
        }
    }

    pub fn actual_value(&self) -> &[String] {
        match self.value_switch {
            SwitchKind::Computed => &self.computed,
            SwitchKind::Manual => &self.manual,
            SwitchKind::Reference => &self.reference,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSubscription {
    pub iid: Iid,
    pub owner: Iid,
    #[serde(default)]
    pub value_sets: Vec<ValueSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub iid: Iid,
    pub parameter_type: Iid,
    pub owner: Iid,
    #[serde(default)]
    pub scale: Option<Iid>,
    #[serde(default)]
    pub is_option_dependent: bool,
    #[serde(default)]
    pub state_dependence: Option<Iid>,
    #[serde(default)]
    pub group: Option<Iid>,
    #[serde(default)]
    pub value_sets: Vec<ValueSet>,
    #[serde(default)]
    pub subscriptions: Vec<ParameterSubscription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverride {
    pub iid: Iid,
    /// The overridden parameter of the referenced element definition.
    pub parameter: Iid,
    pub owner: Iid,
    #[serde(default)]
    pub value_sets: Vec<ValueSet>,
    #[serde(default)]
    pub subscriptions: Vec<ParameterSubscription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub iid: Iid,
    pub name: String,
    #[serde(default)]
    pub containing_group: Option<Iid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementUsage {
    pub iid: Iid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
    pub owner: Iid,
    pub element_definition: Iid,
    #[serde(default)]
    pub parameter_overrides: Vec<ParameterOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    pub iid: Iid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
    pub owner: Iid,
    /// Category tags, by short name.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub parameter_groups: Vec<ParameterGroup>,
    #[serde(default)]
    pub contained_elements: Vec<ElementUsage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Iteration {
    pub iid: Iid,
    #[serde(default)]
    pub elements: Vec<ElementDefinition>,
    #[serde(default)]
    pub actual_finite_state_lists: Vec<ActualFiniteStateList>,
    #[serde(default)]
    pub options: Vec<ModelOption>,
}

impl Iteration {
    pub fn element_by_short_name(&self, short_name: &str) -> Option<&ElementDefinition> {
        self.elements.iter().find(|e| e.short_name == short_name)
    }

    pub fn state_list_by_short_name(&self, short_name: &str) -> Option<&ActualFiniteStateList> {
        self.actual_finite_state_lists
            .iter()
            .find(|s| s.short_name == short_name)
    }

    /// Element definitions sorted by short name, the order every batch
    /// command stages its mutations in.
    pub fn elements_by_short_name(&self) -> Vec<&ElementDefinition> {
        let mut elements: Vec<&ElementDefinition> = self.elements.iter().collect();
        elements.sort_by(|a, b| a.short_name.cmp(&b.short_name));
        elements
    }
}

/// The full snapshot a session opens: reference data plus one iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub engineering_model: String,
    #[serde(default)]
    pub site_directory: SiteDirectory,
    #[serde(default)]
    pub iteration: Iteration,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TransactionSummary {
    pub operation: String,
    pub class: String,
    pub iid: String,
    pub route: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct RunReport {
    pub engineering_model: String,
    pub action: Option<String>,
    pub dry_run: bool,
    pub staged: usize,
    pub committed: bool,
    pub output: Option<String>,
    pub report: Option<String>,
    pub transactions: Vec<TransactionSummary>,
}
