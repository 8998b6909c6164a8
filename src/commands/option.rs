use super::BatchEditor;
use tracing::{debug, info, warn};

impl<'a> BatchEditor<'a> {
    /// Make every selected parameter in scope option dependent, or not when
    /// `remove` is set.
    pub fn apply_or_remove_option_dependency(&mut self, remove: bool) {
        if !self.args.has_selected_parameters() {
            warn!("no --parameters given; option dependence skipped");
            return;
        }

        for element in self.filtered_elements() {
            for parameter in self.sorted_parameters(element) {
                if !self.is_selected_parameter(parameter.iid) {
                    continue;
                }
                let name = self.user_friendly_short_name(element, parameter.iid);
                if parameter.is_option_dependent == remove {
                    self.changes
                        .stage_update(self.cache, parameter, |p| p.is_option_dependent = !remove);
                    info!(parameter = %name, "made {}option dependent", if remove { "not " } else { "" });
                } else {
                    debug!(parameter = %name, "was already {}option dependent", if remove { "not " } else { "" });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::services::staging::Thing;
    use crate::test_support::ModelFixture;

    #[test]
    fn applying_toggles_only_parameters_not_yet_dependent() {
        let mut fx = ModelFixture::new();
        fx.parameter_mut("Bus", "mass").is_option_dependent = true;

        let changes = fx.stage(&["--parameters", "mass"], |e| e.apply_or_remove_option_dependency(false));

        let staged: Vec<_> = changes
            .iter()
            .map(|t| match &t.clone {
                Thing::Parameter(p) => (p.iid, p.is_option_dependent),
                other => panic!("unexpected clone {:?}", other),
            })
            .collect();
        assert_eq!(
            staged,
            vec![
                (fx.parameter("Gen", "mass").iid, true),
                (fx.parameter("Sat", "mass").iid, true),
            ]
        );
    }

    #[test]
    fn removing_only_touches_dependent_parameters() {
        let mut fx = ModelFixture::new();
        fx.parameter_mut("Bus", "mass").is_option_dependent = true;

        let changes = fx.stage(&["--parameters", "mass"], |e| e.apply_or_remove_option_dependency(true));

        assert_eq!(changes.len(), 1);
        let first = changes.iter().next().unwrap();
        match &first.clone {
            Thing::Parameter(p) => {
                assert_eq!(p.iid, fx.parameter("Bus", "mass").iid);
                assert!(!p.is_option_dependent);
            }
            other => panic!("unexpected clone {:?}", other),
        }
    }

    #[test]
    fn nothing_happens_without_selected_parameters() {
        let fx = ModelFixture::new();
        let changes = fx.stage(&[], |e| e.apply_or_remove_option_dependency(false));
        assert!(changes.is_empty());
    }
}
