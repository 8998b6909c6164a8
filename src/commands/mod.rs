//! Command handler layer.
//!
//! One batch command per invocation turns the computed scope into staged
//! transactions; `runtime.rs` wires session, dispatch, commit and output.
//!
//! ## Files
//! - `domain.rs`: change-domain, change-parameter-ownership, set-generic-owners.
//! - `parameter.rs`: add-parameters, remove-parameters.
//! - `option.rs`, `state.rs`: option and state dependence.
//! - `scale.rs`: set-scale, standardize-dimensions-in-millimeter.
//! - `subscription.rs`: subscribe, set-subscription-switch.
//! - `value_set.rs`: move-reference-values-to-manual-values.
//! - `dispatcher.rs`: action to command mapping plus the report hook.
//! - `runtime.rs`: run orchestration and output.
//!
//! ## Principles
//! - Commands never fail: lookups that miss are logged and skipped.
//! - Commands only read the snapshot; every mutation goes through the changeset.
//! - Staging order follows element short name, then parameter type short name.

pub mod dispatcher;
pub mod domain;
pub mod option;
pub mod parameter;
pub mod runtime;
pub mod scale;
pub mod state;
pub mod subscription;
pub mod value_set;

pub use dispatcher::dispatch;
pub use runtime::{execute, handle_run};

use crate::cli::Cli;
use crate::domain::models::{
    DomainOfExpertise, ElementDefinition, Iid, Iteration, ModelSnapshot, Parameter, SiteDirectory,
};
use crate::services::cache::ThingLookup;
use crate::services::filter::FilterService;
use crate::services::staging::ChangeSet;

/// The closed set of batch operations the dispatcher can invoke.
pub trait BatchCommands {
    fn add_parameters(&mut self);
    fn remove_parameters(&mut self);
    fn move_reference_values_to_manual_values(&mut self);
    fn apply_or_remove_option_dependency(&mut self, remove: bool);
    fn apply_or_remove_state_dependency(&mut self, remove: bool);
    fn change_parameter_ownership(&mut self);
    fn change_domain(&mut self);
    fn set_generic_equipment_ownership(&mut self);
    fn assign_measurement_scale(&mut self);
    fn standardize_dimensions_in_millimetre(&mut self);
    fn set_parameter_subscriptions_switch(&mut self);
    fn subscribe(&mut self);
}

/// Read access to one opened model plus the changeset commands append to.
pub struct BatchEditor<'a> {
    args: &'a Cli,
    site_directory: &'a SiteDirectory,
    iteration: &'a Iteration,
    cache: &'a dyn ThingLookup,
    filter: &'a FilterService,
    changes: &'a mut ChangeSet,
}

impl<'a> BatchEditor<'a> {
    pub fn new(
        args: &'a Cli,
        snapshot: &'a ModelSnapshot,
        cache: &'a dyn ThingLookup,
        filter: &'a FilterService,
        changes: &'a mut ChangeSet,
    ) -> Self {
        Self {
            args,
            site_directory: &snapshot.site_directory,
            iteration: &snapshot.iteration,
            cache,
            filter,
            changes,
        }
    }

    /// In-scope element definitions, by short name.
    fn filtered_elements(&self) -> Vec<&'a ElementDefinition> {
        let filter = self.filter;
        self.iteration
            .elements_by_short_name()
            .into_iter()
            .filter(|e| filter.is_filtered_in(e))
            .collect()
    }

    /// Parameters of `element`, by parameter type short name.
    fn sorted_parameters(&self, element: &'a ElementDefinition) -> Vec<&'a Parameter> {
        let cache = self.cache;
        let mut parameters: Vec<&'a Parameter> = element.parameters.iter().collect();
        parameters.sort_by_key(|p| cache.type_short_name_of(p.iid));
        parameters
    }

    fn domain(&self, short_name: Option<&str>) -> Option<&'a DomainOfExpertise> {
        let site_directory = self.site_directory;
        short_name.and_then(|s| site_directory.domain_by_short_name(s))
    }

    fn is_selected_parameter(&self, parameter_like: Iid) -> bool {
        self.args.is_selected(&self.cache.type_short_name_of(parameter_like))
    }

    fn user_friendly_short_name(&self, element: &ElementDefinition, parameter_like: Iid) -> String {
        format!(
            "{}.{}",
            element.short_name,
            self.cache.type_short_name_of(parameter_like)
        )
    }
}

impl BatchCommands for BatchEditor<'_> {
    fn add_parameters(&mut self) {
        self.add()
    }

    fn remove_parameters(&mut self) {
        self.remove()
    }

    fn move_reference_values_to_manual_values(&mut self) {
        BatchEditor::move_reference_values_to_manual_values(self)
    }

    fn apply_or_remove_option_dependency(&mut self, remove: bool) {
        BatchEditor::apply_or_remove_option_dependency(self, remove)
    }

    fn apply_or_remove_state_dependency(&mut self, remove: bool) {
        BatchEditor::apply_or_remove_state_dependency(self, remove)
    }

    fn change_parameter_ownership(&mut self) {
        BatchEditor::change_parameter_ownership(self)
    }

    fn change_domain(&mut self) {
        BatchEditor::change_domain(self)
    }

    fn set_generic_equipment_ownership(&mut self) {
        BatchEditor::set_generic_equipment_ownership(self)
    }

    fn assign_measurement_scale(&mut self) {
        BatchEditor::assign_measurement_scale(self)
    }

    fn standardize_dimensions_in_millimetre(&mut self) {
        BatchEditor::standardize_dimensions_in_millimetre(self)
    }

    fn set_parameter_subscriptions_switch(&mut self) {
        BatchEditor::set_parameter_subscriptions_switch(self)
    }

    fn subscribe(&mut self) {
        BatchEditor::subscribe(self)
    }
}
