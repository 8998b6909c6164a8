use super::BatchEditor;
use tracing::{debug, info, warn};

impl<'a> BatchEditor<'a> {
    /// Point every selected parameter in scope at the `--state` list, or
    /// detach it from that list when `remove` is set.
    pub fn apply_or_remove_state_dependency(&mut self, remove: bool) {
        if !self.args.has_selected_parameters() {
            warn!("no --parameters given; state dependence skipped");
            return;
        }
        let list_name = self.args.state_list_name.as_deref().unwrap_or_default();
        let Some(state_list) = self.iteration.state_list_by_short_name(list_name) else {
            warn!(state = %list_name, "cannot find actual finite state list; state dependence skipped");
            return;
        };
        info!(state = %list_name, "{} state dependency", if remove { "removing" } else { "applying" });

        for element in self.filtered_elements() {
            for parameter in self.sorted_parameters(element) {
                if !self.is_selected_parameter(parameter.iid) {
                    continue;
                }
                let name = self.user_friendly_short_name(element, parameter.iid);
                let dependent = parameter.state_dependence == Some(state_list.iid);
                if dependent != remove {
                    debug!(parameter = %name, state = %list_name, "already {}", if remove { "removed" } else { "applied" });
                    continue;
                }
                let target = if remove { None } else { Some(state_list.iid) };
                self.changes
                    .stage_update(self.cache, parameter, |p| p.state_dependence = target);
                info!(parameter = %name, state = %list_name, "state {}", if remove { "removed" } else { "applied" });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::services::staging::Thing;
    use crate::test_support::ModelFixture;

    #[test]
    fn applying_points_parameters_at_the_state_list() {
        let fx = ModelFixture::new();
        let modes = fx.snapshot.iteration.actual_finite_state_lists[0].iid;

        let changes = fx.stage(&["--parameters", "h,wid", "--state", "Modes"], |e| {
            e.apply_or_remove_state_dependency(false)
        });

        assert_eq!(changes.len(), 2);
        for transaction in changes.iter() {
            match &transaction.clone {
                Thing::Parameter(p) => assert_eq!(p.state_dependence, Some(modes)),
                other => panic!("unexpected clone {:?}", other),
            }
        }
    }

    #[test]
    fn removing_only_touches_parameters_on_that_list() {
        let mut fx = ModelFixture::new();
        let modes = fx.snapshot.iteration.actual_finite_state_lists[0].iid;
        fx.parameter_mut("Panel", "h").state_dependence = Some(modes);

        let changes = fx.stage(&["--parameters", "h,wid", "--state", "Modes"], |e| {
            e.apply_or_remove_state_dependency(true)
        });

        assert_eq!(changes.len(), 1);
        let first = changes.iter().next().unwrap();
        match &first.clone {
            Thing::Parameter(p) => {
                assert_eq!(p.iid, fx.parameter("Panel", "h").iid);
                assert_eq!(p.state_dependence, None);
            }
            other => panic!("unexpected clone {:?}", other),
        }
    }

    #[test]
    fn unknown_state_list_stages_nothing() {
        let fx = ModelFixture::new();
        let changes = fx.stage(&["--parameters", "h", "--state", "Orbits"], |e| {
            e.apply_or_remove_state_dependency(false)
        });
        assert!(changes.is_empty());
    }
}
