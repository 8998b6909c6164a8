use super::BatchEditor;
use crate::domain::constants::{GENERIC_EQUIPMENT_OWNERS, GENERIC_EQUIPMENT_PREFIX};
use crate::domain::models::{DomainOfExpertise, Iid};
use crate::services::staging::OwnedThing;
use std::collections::HashMap;
use tracing::{info, warn};

impl<'a> BatchEditor<'a> {
    /// Move everything in scope owned by `--domain` to `--to-domain`.
    pub fn change_domain(&mut self) {
        let from_name = self.args.domain_of_expertise.as_deref();
        let to_name = self.args.to_domain_of_expertise.as_deref();
        if from_name == to_name {
            warn!(domain = ?from_name, "the from and to domains are the same; no changes performed");
            return;
        }
        let Some(from) = self.domain(from_name) else {
            warn!(domain = ?from_name, "the from-domain cannot be found");
            return;
        };
        let Some(to) = self.domain(to_name) else {
            warn!(domain = ?to_name, "the to-domain cannot be found");
            return;
        };

        let filter = self.filter;
        let cache = self.cache;
        for element in self.filtered_elements() {
            if element.owner == from.iid {
                self.change_owner(element, &element.short_name, from, to);
            }

            for parameter in self.sorted_parameters(element) {
                let parameter_type = cache.parameter_type(parameter.parameter_type);
                if !parameter_type.is_some_and(|pt| filter.is_parameter_specified_or_any(pt)) {
                    continue;
                }
                let name = self.user_friendly_short_name(element, parameter.iid);
                if parameter.owner == from.iid {
                    self.change_owner(parameter, &name, from, to);
                }
                for subscription in parameter.subscriptions.iter().filter(|s| s.owner == from.iid) {
                    self.change_owner(subscription, &format!("{} subscription", name), from, to);
                }
            }

            for usage in &element.contained_elements {
                let usage_name = format!("{}.{}", element.short_name, usage.short_name);
                if usage.owner == from.iid {
                    self.change_owner(usage, &usage_name, from, to);
                }
                for parameter_override in &usage.parameter_overrides {
                    let name = format!("{}.{}", usage_name, cache.type_short_name_of(parameter_override.iid));
                    if parameter_override.owner == from.iid {
                        self.change_owner(parameter_override, &name, from, to);
                    }
                    for subscription in parameter_override.subscriptions.iter().filter(|s| s.owner == from.iid) {
                        self.change_owner(subscription, &format!("{} subscription", name), from, to);
                    }
                }
            }
        }
    }

    /// Give every selected parameter in scope to `--domain`.
    pub fn change_parameter_ownership(&mut self) {
        let name = self.args.domain_of_expertise.as_deref();
        let Some(new_owner) = self.domain(name) else {
            warn!(domain = ?name, "cannot find domain of expertise");
            return;
        };

        for element in self.filtered_elements() {
            for parameter in self.sorted_parameters(element) {
                if !self.is_selected_parameter(parameter.iid) || parameter.owner == new_owner.iid {
                    continue;
                }
                let previous = self.cache.domain_short_name(parameter.owner);
                self.changes
                    .stage_update(self.cache, parameter, |p| p.set_owner(new_owner.iid));
                info!(
                    parameter = %self.user_friendly_short_name(element, parameter.iid),
                    "changed owner from {} to {}",
                    previous,
                    new_owner.short_name
                );
            }
        }
    }

    /// Prescribed owners for parameters of "Generic Equipment" definitions;
    /// any other parameter follows its element's owner.
    pub fn set_generic_equipment_ownership(&mut self) {
        let site_directory = self.site_directory;
        let prescribed: HashMap<&str, Option<&DomainOfExpertise>> = GENERIC_EQUIPMENT_OWNERS
            .iter()
            .map(|(parameter, domain)| (*parameter, site_directory.domain_by_short_name(domain)))
            .collect();
        for (parameter, domain) in &prescribed {
            if domain.is_none() {
                warn!(parameter = %parameter, "prescribed owner domain not found; parameter left as is");
            }
        }

        for element in self.filtered_elements() {
            if !element.name.starts_with(GENERIC_EQUIPMENT_PREFIX) {
                continue;
            }
            for parameter in self.sorted_parameters(element) {
                let type_short_name = self.cache.type_short_name_of(parameter.iid);
                let new_owner: Option<Iid> = match prescribed.get(type_short_name.as_str()) {
                    Some(Some(domain)) if domain.iid != parameter.owner => Some(domain.iid),
                    Some(_) => None,
                    None if parameter.owner != element.owner => Some(element.owner),
                    None => None,
                };
                let Some(new_owner) = new_owner else {
                    continue;
                };
                let previous = self.cache.domain_short_name(parameter.owner);
                self.changes
                    .stage_update(self.cache, parameter, |p| p.set_owner(new_owner));
                info!(
                    parameter = %self.user_friendly_short_name(element, parameter.iid),
                    "changed owner from {} to {}",
                    previous,
                    self.cache.domain_short_name(new_owner)
                );
            }
        }
    }

    fn change_owner<T: OwnedThing>(&mut self, thing: &T, name: &str, from: &DomainOfExpertise, to: &DomainOfExpertise) {
        let to_iid = to.iid;
        self.changes.stage_update(self.cache, thing, |t| t.set_owner(to_iid));
        info!(thing = %name, "changed owner from {} to {}", from.short_name, to.short_name);
    }
}
