use super::BatchEditor;
use crate::cli::SwitchKind;
use crate::domain::models::{DomainOfExpertise, Iid, Parameter, ParameterGroup, ParameterType, ValueSet};
use tracing::{info, warn};
use uuid::Uuid;

impl<'a> BatchEditor<'a> {
    fn selected_parameter_types(&self, action: &str) -> Vec<&'a ParameterType> {
        let site_directory = self.site_directory;
        self.args
            .selected_parameters()
            .iter()
            .filter_map(|short_name| {
                let found = site_directory.parameter_type_by_short_name(short_name);
                if found.is_none() {
                    warn!(action, parameter_type = %short_name, "parameter type not found");
                }
                found
            })
            .collect()
    }

    /// The `--domain` filter of add and remove: `Some(None)` when none is
    /// given, `None` when it names an unknown domain.
    fn optional_owner(&self, action: &str) -> Option<Option<&'a DomainOfExpertise>> {
        match self.args.domain_of_expertise.as_deref() {
            None | Some("") => Some(None),
            Some(name) => {
                let domain = self.domain(Some(name));
                if domain.is_none() {
                    warn!(action, domain = %name, "domain of expertise not found");
                }
                domain.map(Some)
            }
        }
    }

    /// Create each selected parameter type on every in-scope element that
    /// lacks it, optionally filing new and existing ones into `--parameter-group`.
    pub fn add(&mut self) {
        const ACTION: &str = "add-parameters";
        if !self.args.has_selected_parameters() {
            warn!(action = ACTION, "no --parameters given");
            return;
        }
        let parameter_types = self.selected_parameter_types(ACTION);
        if parameter_types.is_empty() {
            return;
        }
        let Some(owner) = self.optional_owner(ACTION) else {
            return;
        };
        let group_name = self
            .args
            .parameter_group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty());

        for element in self.filtered_elements() {
            let mut group: Option<Iid> = None;
            if let Some(name) = group_name {
                group = match element.parameter_groups.iter().find(|g| g.name == name) {
                    Some(existing) => Some(existing.iid),
                    None => {
                        let created = ParameterGroup {
                            iid: Uuid::new_v4(),
                            name: name.to_string(),
                            containing_group: None,
                        };
                        let iid = created.iid;
                        self.changes.stage_create(self.cache, element, created);
                        info!(element = %element.short_name, group = %name, "created parameter group");
                        Some(iid)
                    }
                };
            }

            for parameter_type in &parameter_types {
                match element
                    .parameters
                    .iter()
                    .find(|p| p.parameter_type == parameter_type.iid)
                {
                    None => {
                        let parameter = Parameter {
                            iid: Uuid::new_v4(),
                            parameter_type: parameter_type.iid,
                            owner: owner.map(|d| d.iid).unwrap_or(element.owner),
                            scale: parameter_type.default_scale(),
                            is_option_dependent: false,
                            state_dependence: None,
                            group,
                            value_sets: vec![ValueSet::unset(
                                parameter_type.number_of_values(),
                                SwitchKind::Manual,
                            )],
                            subscriptions: vec![],
                        };
                        self.changes.stage_create(self.cache, element, parameter);
                        info!(element = %element.short_name, parameter = %parameter_type.short_name, "added parameter");
                    }
                    Some(existing) => {
                        if group.is_some() && existing.group != group {
                            self.changes.stage_update(self.cache, existing, |p| p.group = group);
                            info!(
                                element = %element.short_name,
                                parameter = %parameter_type.short_name,
                                group = ?group_name,
                                "moved parameter to group"
                            );
                        }
                    }
                }
            }
        }
    }

    /// Delete each selected parameter type from every in-scope element,
    /// restricted to parameters owned by `--domain` when given.
    pub fn remove(&mut self) {
        const ACTION: &str = "remove-parameters";
        if !self.args.has_selected_parameters() {
            warn!(action = ACTION, "no --parameters given");
            return;
        }
        let parameter_types = self.selected_parameter_types(ACTION);
        if parameter_types.is_empty() {
            return;
        }
        let Some(owner) = self.optional_owner(ACTION) else {
            return;
        };

        for element in self.filtered_elements() {
            for parameter_type in &parameter_types {
                let Some(parameter) = element
                    .parameters
                    .iter()
                    .find(|p| p.parameter_type == parameter_type.iid)
                else {
                    continue;
                };
                if owner.is_some_and(|o| o.iid != parameter.owner) {
                    continue;
                }
                self.changes.stage_delete(self.cache, element, parameter);
                info!(element = %element.short_name, parameter = %parameter_type.short_name, "removed parameter");
            }
        }
    }
}
