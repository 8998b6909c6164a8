//! Scope computation for one run: which element definitions, categories and
//! owning domains a batch command may touch.

use crate::cli::Cli;
use crate::domain::models::{DomainOfExpertise, ElementDefinition, Iid, Iteration, ParameterType};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub element_definition: Option<String>,
    pub categories: Vec<String>,
    pub included_owners: Vec<String>,
    pub excluded_owners: Vec<String>,
    pub selected_parameters: Vec<String>,
}

impl From<&Cli> for FilterCriteria {
    fn from(cli: &Cli) -> Self {
        Self {
            element_definition: cli
                .element_definition
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            categories: trimmed(&cli.filtered_categories),
            included_owners: trimmed(&cli.included_owners),
            excluded_owners: trimmed(&cli.excluded_owners),
            selected_parameters: cli.selected_parameters(),
        }
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[derive(Debug, Default)]
pub struct FilterService {
    criteria: FilterCriteria,
    elements: HashSet<Iid>,
    categories: HashSet<String>,
    owners: HashSet<Iid>,
}

impl FilterService {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    /// Compute the element, category and owner sets. Meant to run once per
    /// session, right after the model is opened.
    pub fn process_filters(&mut self, iteration: &Iteration, domains: &[DomainOfExpertise]) {
        self.categories = self.criteria.categories.iter().cloned().collect();

        self.elements.clear();
        match &self.criteria.element_definition {
            None => self.elements.extend(iteration.elements.iter().map(|e| e.iid)),
            Some(root) => match iteration.element_by_short_name(root) {
                Some(element) => {
                    let by_iid: HashMap<Iid, &ElementDefinition> =
                        iteration.elements.iter().map(|e| (e.iid, e)).collect();
                    collect_subtree(element, &by_iid, &mut self.elements);
                }
                None => warn!(element_definition = %root, "subtree root not found; nothing is in scope"),
            },
        }

        self.owners = domains
            .iter()
            .filter(|d| {
                self.criteria.included_owners.is_empty()
                    || self.criteria.included_owners.contains(&d.short_name)
            })
            .filter(|d| !self.criteria.excluded_owners.contains(&d.short_name))
            .map(|d| d.iid)
            .collect();

        debug!(
            elements = self.elements.len(),
            categories = self.categories.len(),
            owners = self.owners.len(),
            "filters processed"
        );
    }

    pub fn is_filtered_in(&self, element: &ElementDefinition) -> bool {
        self.elements.contains(&element.iid)
            && self.is_member_of_selected_category(element)
            && self.owners.contains(&element.owner)
    }

    /// Same as [`is_filtered_in`](Self::is_filtered_in), except that an
    /// unprocessed (empty) element scope lets everything through.
    pub fn is_filtered_in_or_filter_is_empty(&self, element: &ElementDefinition) -> bool {
        self.elements.is_empty() || self.is_filtered_in(element)
    }

    pub fn is_member_of_selected_category(&self, element: &ElementDefinition) -> bool {
        self.categories.is_empty()
            || element
                .categories
                .iter()
                .any(|c| self.categories.contains(c.trim()))
    }

    pub fn is_parameter_specified_or_any(&self, parameter_type: &ParameterType) -> bool {
        self.criteria.selected_parameters.is_empty()
            || self
                .criteria
                .selected_parameters
                .iter()
                .any(|p| *p == parameter_type.short_name)
    }

    pub fn filtered_elements(&self) -> &HashSet<Iid> {
        &self.elements
    }

    pub fn included_owners(&self) -> &HashSet<Iid> {
        &self.owners
    }
}

/// Depth-first walk through usages' referenced definitions. The visited set
/// doubles as the result, so cycles terminate.
fn collect_subtree(
    element: &ElementDefinition,
    by_iid: &HashMap<Iid, &ElementDefinition>,
    visited: &mut HashSet<Iid>,
) {
    if !visited.insert(element.iid) {
        return;
    }
    for usage in &element.contained_elements {
        match by_iid.get(&usage.element_definition) {
            Some(child) => collect_subtree(child, by_iid, visited),
            None => debug!(usage = %usage.short_name, "usage references an unknown element definition"),
        }
    }
}
