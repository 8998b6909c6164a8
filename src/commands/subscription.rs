use super::BatchEditor;
use crate::cli::SwitchKind;
use crate::domain::models::{ParameterSubscription, ValueSet};
use tracing::{info, warn};
use uuid::Uuid;

/// Fresh subscription value sets, one per value set of the subscribed thing.
fn mirrored_value_sets(value_sets: &[ValueSet]) -> Vec<ValueSet> {
    value_sets
        .iter()
        .map(|source| ValueSet {
            actual_option: source.actual_option.clone(),
            actual_state: source.actual_state.clone(),
            ..ValueSet::unset(source.manual.len(), SwitchKind::Computed)
        })
        .collect()
}

impl<'a> BatchEditor<'a> {
    /// Subscribe `--domain` to every selected parameter and parameter override
    /// in scope that it neither owns nor already subscribes to.
    pub fn subscribe(&mut self) {
        let name = self.args.domain_of_expertise.as_deref();
        let Some(subscriber) = self.domain(name) else {
            warn!(domain = ?name, "unknown subscriber domain of expertise; subscribe skipped");
            return;
        };
        if !self.args.has_selected_parameters() {
            warn!("no --parameters given; subscribe skipped");
            return;
        }

        let cache = self.cache;
        for element in self.filtered_elements() {
            for parameter in self.sorted_parameters(element) {
                if !self.is_selected_parameter(parameter.iid)
                    || parameter.owner == subscriber.iid
                    || parameter.subscriptions.iter().any(|s| s.owner == subscriber.iid)
                {
                    continue;
                }
                let subscription = ParameterSubscription {
                    iid: Uuid::new_v4(),
                    owner: subscriber.iid,
                    value_sets: mirrored_value_sets(&parameter.value_sets),
                };
                self.changes.stage_create(cache, parameter, subscription);
                info!(
                    parameter = %self.user_friendly_short_name(element, parameter.iid),
                    subscriber = %subscriber.short_name,
                    "parameter subscription taken"
                );
            }

            let mut usages: Vec<_> = element.contained_elements.iter().collect();
            usages.sort_by(|a, b| a.short_name.cmp(&b.short_name));
            for usage in usages {
                let mut overrides: Vec<_> = usage.parameter_overrides.iter().collect();
                overrides.sort_by_key(|o| cache.type_short_name_of(o.iid));
                for parameter_override in overrides {
                    if !self.is_selected_parameter(parameter_override.iid)
                        || parameter_override.owner == subscriber.iid
                        || parameter_override.subscriptions.iter().any(|s| s.owner == subscriber.iid)
                    {
                        continue;
                    }
                    let subscription = ParameterSubscription {
                        iid: Uuid::new_v4(),
                        owner: subscriber.iid,
                        value_sets: mirrored_value_sets(&parameter_override.value_sets),
                    };
                    self.changes.stage_create(cache, parameter_override, subscription);
                    info!(
                        parameter_override = %format!(
                            "{}.{}.{}",
                            element.short_name,
                            usage.short_name,
                            cache.type_short_name_of(parameter_override.iid)
                        ),
                        subscriber = %subscriber.short_name,
                        "parameter override subscription taken"
                    );
                }
            }
        }
    }

    /// Set the switch of every value set of every subscription `--domain`
    /// holds in scope to `--parameter-switch`.
    pub fn set_parameter_subscriptions_switch(&mut self) {
        let name = self.args.domain_of_expertise.as_deref();
        let Some(subscriber) = self.domain(name) else {
            warn!(domain = ?name, "unknown subscriber domain of expertise; subscription switch skipped");
            return;
        };
        let Some(switch) = self.args.parameter_switch_kind else {
            warn!("parameter switch kind not provided: use --parameter-switch with one of COMPUTED, MANUAL or REFERENCE");
            return;
        };

        let (cache, filter) = (self.cache, self.filter);
        let mut count = 0usize;
        for element in self.filtered_elements() {
            for parameter in self.sorted_parameters(element) {
                if !cache
                    .parameter_type(parameter.parameter_type)
                    .is_some_and(|pt| filter.is_parameter_specified_or_any(pt))
                {
                    continue;
                }
                for value_set in parameter
                    .subscriptions
                    .iter()
                    .filter(|s| s.owner == subscriber.iid)
                    .flat_map(|s| &s.value_sets)
                {
                    self.changes.stage_update(cache, value_set, |v| v.value_switch = switch);
                    count += 1;
                }
            }

            let mut usages: Vec<_> = element.contained_elements.iter().collect();
            usages.sort_by(|a, b| a.short_name.cmp(&b.short_name));
            for usage in usages {
                for value_set in usage
                    .parameter_overrides
                    .iter()
                    .flat_map(|o| &o.subscriptions)
                    .filter(|s| s.owner == subscriber.iid)
                    .flat_map(|s| &s.value_sets)
                {
                    self.changes.stage_update(cache, value_set, |v| v.value_switch = switch);
                    count += 1;
                }
            }
        }

        info!(
            subscriber = %subscriber.short_name,
            "set switch to {} on {} parameter or parameter override subscription value sets",
            switch,
            count
        );
    }
}
