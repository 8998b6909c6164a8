use super::BatchEditor;
use crate::cli::SwitchKind;
use crate::domain::constants::UNSET;
use crate::domain::models::ValueSet;
use tracing::{debug, info, warn};

/// Component indices whose reference value can move to manual, or `None`
/// when some component holds both a manual and a reference value.
fn movable_components(value_set: &ValueSet) -> Option<Vec<usize>> {
    let mut movable = Vec::new();
    for (index, (manual, reference)) in value_set.manual.iter().zip(&value_set.reference).enumerate() {
        match (manual.as_str() == UNSET, reference.as_str() == UNSET) {
            (false, false) => return None,
            (true, false) => movable.push(index),
            _ => {}
        }
    }
    Some(movable)
}

fn move_components(value_set: &mut ValueSet, indices: &[usize]) {
    for &index in indices {
        value_set.manual[index] = std::mem::replace(&mut value_set.reference[index], UNSET.to_string());
    }
    value_set.value_switch = SwitchKind::Manual;
}

impl<'a> BatchEditor<'a> {
    /// For selected parameters in scope running on their reference values,
    /// take those values over as manual values and switch to MANUAL.
    pub fn move_reference_values_to_manual_values(&mut self) {
        let (cache, filter) = (self.cache, self.filter);
        for element in self.filtered_elements() {
            for parameter in self.sorted_parameters(element) {
                let Some(parameter_type) = cache.parameter_type(parameter.parameter_type) else {
                    continue;
                };
                if !filter.is_parameter_specified_or_any(parameter_type) {
                    continue;
                }
                let name = self.user_friendly_short_name(element, parameter.iid);

                for value_set in parameter
                    .value_sets
                    .iter()
                    .filter(|v| v.value_switch == SwitchKind::Reference)
                {
                    let indices = if parameter_type.is_scalar() {
                        let first_unset = |values: &[String]| values.first().is_some_and(|v| v == UNSET);
                        if !first_unset(&value_set.manual) || first_unset(&value_set.reference) {
                            debug!(parameter = %name, "manual value already set or no reference value; left as is");
                            continue;
                        }
                        vec![0]
                    } else {
                        match movable_components(value_set) {
                            None => {
                                warn!(parameter = %name, "components hold both manual and reference values; left as is");
                                continue;
                            }
                            Some(indices) if indices.is_empty() => continue,
                            Some(indices) => indices,
                        }
                    };

                    self.changes
                        .stage_update(cache, value_set, |v| move_components(v, &indices));
                    let moved: Vec<&str> = indices.iter().map(|&i| value_set.reference[i].as_str()).collect();
                    info!(
                        parameter = %name,
                        "moved reference value {} to manual value and changed switch to MANUAL",
                        moved.join(";")
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::SwitchKind;
    use crate::services::staging::Thing;
    use crate::test_support::ModelFixture;

    fn staged_value_sets(changes: &crate::services::staging::ChangeSet) -> Vec<crate::domain::models::ValueSet> {
        changes
            .iter()
            .map(|t| match &t.clone {
                Thing::ValueSet(v) => v.clone(),
                other => panic!("unexpected clone {:?}", other),
            })
            .collect()
    }

    #[test]
    fn scalar_reference_value_becomes_manual() {
        let fx = ModelFixture::new();
        let changes = fx.stage(&["--parameters", "color"], |e| e.move_reference_values_to_manual_values());

        let staged = staged_value_sets(&changes);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].iid, fx.parameter("Sat", "color").value_sets[0].iid);
        assert_eq!(staged[0].manual, vec!["red"]);
        assert_eq!(staged[0].reference, vec!["-"]);
        assert_eq!(staged[0].value_switch, SwitchKind::Manual);
        assert_eq!(fx.parameter("Sat", "color").value_sets[0].reference, vec!["red"]);
    }

    #[test]
    fn scalar_with_manual_value_is_left_alone() {
        let mut fx = ModelFixture::new();
        fx.parameter_mut("Sat", "color").value_sets[0].manual = vec!["blue".into()];
        let changes = fx.stage(&["--parameters", "color"], |e| e.move_reference_values_to_manual_values());
        assert!(changes.is_empty());
    }

    #[test]
    fn scalar_without_reference_value_is_left_alone() {
        let mut fx = ModelFixture::new();
        fx.parameter_mut("Sat", "color").value_sets[0].reference = vec!["-".into()];
        let changes = fx.stage(&["--parameters", "color"], |e| e.move_reference_values_to_manual_values());
        assert!(changes.is_empty());
    }

    #[test]
    fn compound_moves_each_unset_component() {
        let fx = ModelFixture::new();
        let changes = fx.stage(&["--parameters", "position"], |e| e.move_reference_values_to_manual_values());

        let staged = staged_value_sets(&changes);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].manual, vec!["1", "2", "-"]);
        assert_eq!(staged[0].reference, vec!["-", "-", "-"]);
        assert_eq!(staged[0].value_switch, SwitchKind::Manual);
    }

    #[test]
    fn compound_with_conflicting_component_is_skipped() {
        let mut fx = ModelFixture::new();
        fx.parameter_mut("Panel", "position").value_sets[0].reference = vec!["1".into(), "5".into(), "-".into()];
        let changes = fx.stage(&["--parameters", "position"], |e| e.move_reference_values_to_manual_values());
        assert!(changes.is_empty());
    }

    #[test]
    fn without_selection_every_reference_parameter_in_scope_is_considered() {
        let fx = ModelFixture::new();
        let changes = fx.stage(&[], |e| e.move_reference_values_to_manual_values());

        let staged: Vec<_> = staged_value_sets(&changes).iter().map(|v| v.iid).collect();
        assert_eq!(
            staged,
            vec![
                fx.parameter("Panel", "position").value_sets[0].iid,
                fx.parameter("Sat", "color").value_sets[0].iid,
            ]
        );
    }
}
