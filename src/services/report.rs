//! CSV report of element definitions, parameters and subscriptions.

use crate::domain::constants::REPORT_FILE_SUFFIX;
use crate::domain::models::{ElementDefinition, ModelSnapshot, Parameter, ValueSet};
use crate::services::cache::ThingLookup;
use std::path::{Path, PathBuf};
use tracing::info;

pub trait ReportGenerator {
    /// Write the parameter report and return where it went.
    fn parameters_to_csv(&self) -> anyhow::Result<PathBuf>;
}

pub const HEADERS: [&str; 19] = [
    "EngineeringModel",
    "ElementDefinition",
    "ElementDefinition.ShortName",
    "DomainOfExpertise",
    "ParameterSubscription.Owner",
    "Category",
    "ParameterGroup",
    "ReferenceDataLibrary",
    "Parameter",
    "UserFriendlyShortName",
    "ActualState",
    "Option",
    "ActualValue",
    "Published",
    "MeasurementScale",
    "ParameterSwitchKind",
    "COMPUTED",
    "MANUAL",
    "REFERENCE",
];

pub struct CsvReportGenerator<'a> {
    snapshot: &'a ModelSnapshot,
    cache: &'a dyn ThingLookup,
    directory: &'a Path,
}

impl<'a> CsvReportGenerator<'a> {
    pub fn new(snapshot: &'a ModelSnapshot, cache: &'a dyn ThingLookup, directory: &'a Path) -> Self {
        Self {
            snapshot,
            cache,
            directory,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.directory.join(format!(
            "{}{}",
            self.snapshot.engineering_model, REPORT_FILE_SUFFIX
        ))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        push_row(&mut out, HEADERS.iter().map(|h| h.to_string()).collect());

        for element in self.snapshot.iteration.elements_by_short_name() {
            push_element_row(&mut out, &self.snapshot.engineering_model, element, self.cache);

            let mut parameters: Vec<&Parameter> = element.parameters.iter().collect();
            parameters.sort_by_key(|p| self.cache.type_short_name_of(p.iid));
            for parameter in parameters {
                let mut subscriptions: Vec<_> = parameter.subscriptions.iter().collect();
                subscriptions.sort_by_key(|s| self.cache.domain_short_name(s.owner));

                for value_set in &parameter.value_sets {
                    push_row(&mut out, self.value_set_row(element, parameter, value_set, None));
                    for subscription in &subscriptions {
                        for subscribed in &subscription.value_sets {
                            let owner = self.cache.domain_short_name(subscription.owner);
                            push_row(&mut out, self.value_set_row(element, parameter, subscribed, Some(owner)));
                        }
                    }
                }
            }
        }
        out
    }

    fn value_set_row(
        &self,
        element: &ElementDefinition,
        parameter: &Parameter,
        value_set: &ValueSet,
        subscriber: Option<String>,
    ) -> Vec<String> {
        let site = &self.snapshot.site_directory;
        let parameter_type = self.cache.parameter_type(parameter.parameter_type);
        let library = site
            .reference_data_libraries
            .iter()
            .find(|rdl| rdl.parameter_types.iter().any(|pt| pt.iid == parameter.parameter_type))
            .map(|rdl| rdl.short_name.clone())
            .unwrap_or_default();
        let group = parameter
            .group
            .and_then(|g| element.parameter_groups.iter().find(|pg| pg.iid == g))
            .map(|pg| pg.name.clone())
            .unwrap_or_default();
        let published = if subscriber.is_some() {
            String::new()
        } else {
            value_set.published.first().cloned().unwrap_or_default()
        };

        vec![
            self.snapshot.engineering_model.clone(),
            element.name.clone(),
            element.short_name.clone(),
            self.cache.domain_short_name(parameter.owner),
            subscriber.unwrap_or_default(),
            categories(element),
            group,
            library,
            parameter_type.map(|pt| pt.name.clone()).unwrap_or_default(),
            parameter_type.map(|pt| pt.short_name.clone()).unwrap_or_default(),
            value_set.actual_state.clone().unwrap_or_default(),
            value_set.actual_option.clone().unwrap_or_default(),
            value_set.actual_value().first().cloned().unwrap_or_default(),
            published,
            self.cache.scale_short_name(parameter.scale),
            value_set.value_switch.to_string(),
            value_set.computed.join("|"),
            value_set.manual.join("|"),
            value_set.reference.join("|"),
        ]
    }
}

impl ReportGenerator for CsvReportGenerator<'_> {
    fn parameters_to_csv(&self) -> anyhow::Result<PathBuf> {
        let path = self.report_path();
        info!(path = %path.display(), "building parameter report");
        std::fs::create_dir_all(self.directory)?;
        std::fs::write(&path, self.render())?;
        info!(path = %path.display(), "parameter report written");
        Ok(path)
    }
}

fn categories(element: &ElementDefinition) -> String {
    let mut names: Vec<&str> = element.categories.iter().map(|c| c.as_str()).collect();
    names.sort_unstable();
    names.join(", ")
}

fn push_element_row(out: &mut String, model: &str, element: &ElementDefinition, cache: &dyn ThingLookup) {
    let mut fields = vec![String::new(); HEADERS.len()];
    fields[0] = model.to_string();
    fields[1] = element.name.clone();
    fields[2] = element.short_name.clone();
    fields[3] = cache.domain_short_name(element.owner);
    fields[5] = categories(element);
    push_row(out, fields);
}

fn push_row(out: &mut String, fields: Vec<String>) {
    let line: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
