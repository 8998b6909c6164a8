//! Re-expression of a parameter's numeric values in another measurement scale.
//!
//! A parameter is converted as a unit: the value sets of the parameter and of
//! all its subscriptions are converted on detached copies first, and only
//! when every slot converted cleanly are those copies staged together with
//! the parameter's new scale. A single bad value leaves the parameter
//! entirely unstaged.

use crate::domain::constants::UNSET;
use crate::domain::models::{Iid, MeasurementScale, Parameter, ValueSet};
use crate::services::cache::ThingLookup;
use crate::services::staging::{checkout, ChangeSet};
use tracing::{error, info, warn};

/// One old-scale to new-scale pair and the factor from the first to the second.
#[derive(Debug, Clone)]
pub struct ScaleChange<'a> {
    pub old_scale: &'a MeasurementScale,
    pub new_scale: &'a MeasurementScale,
    pub factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// A precondition did not hold; nothing was looked at.
    Skipped,
    /// `value_sets` changed value sets plus the scale update were staged.
    Converted { value_sets: usize },
    /// Some slot held a non-numeric value; nothing was staged.
    Failed { errors: usize },
}

/// Convert one slot value. The unset sentinel (and blank) stay unset; a value
/// that is not a finite number, before or after scaling, bumps `errors` and
/// yields `None`.
pub fn convert_numeric_value(value: &str, factor: f64, errors: &mut usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == UNSET {
        return Some(UNSET.to_string());
    }
    match trimmed.parse::<f64>().map(|number| number * factor) {
        Ok(converted) if converted.is_finite() => Some(format_number(converted)),
        _ => {
            *errors += 1;
            None
        }
    }
}

/// Shortest decimal form that reads back to the same `f64`, `.` separated.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

struct Narration<'a> {
    element: &'a str,
    parameter: &'a str,
    ownership: &'static str,
    domain: String,
}

pub fn convert_parameter_value_and_scale(
    changes: &mut ChangeSet,
    cache: &dyn ThingLookup,
    element_short_name: &str,
    parameter: &Parameter,
    change: &ScaleChange<'_>,
) -> ConversionOutcome {
    let Some(parameter_type) = cache.parameter_type(parameter.parameter_type) else {
        warn!(element = %element_short_name, parameter = %parameter.iid, "parameter type not found; conversion skipped");
        return ConversionOutcome::Skipped;
    };
    if !parameter_type.is_quantity_kind()
        || parameter.scale != Some(change.old_scale.iid)
        || !parameter_type.possible_scales().contains(&change.new_scale.iid)
    {
        return ConversionOutcome::Skipped;
    }

    let mut errors = 0usize;
    let mut converted: Vec<ValueSet> = Vec::new();

    let own = Narration {
        element: element_short_name,
        parameter: &parameter_type.short_name,
        ownership: "owned by",
        domain: cache.domain_short_name(parameter.owner),
    };
    for value_set in &parameter.value_sets {
        if let Some(clone) = convert_value_set(value_set, change, &own, &mut errors) {
            converted.push(clone);
        }
    }

    for subscription in &parameter.subscriptions {
        let subscribed = Narration {
            ownership: "subscribed by",
            domain: cache.domain_short_name(subscription.owner),
            ..own
        };
        for value_set in &subscription.value_sets {
            if let Some(clone) = convert_value_set(value_set, change, &subscribed, &mut errors) {
                converted.push(clone);
            }
        }
        if errors > 0 {
            break;
        }
    }

    if errors > 0 {
        error!(
            element = %element_short_name,
            parameter = %parameter_type.short_name,
            errors,
            "conversion from {} to {} abandoned; parameter left unchanged",
            change.old_scale.short_name,
            change.new_scale.short_name
        );
        return ConversionOutcome::Failed { errors };
    }

    let value_sets = converted.len();
    for clone in converted {
        changes.stage_edited(cache, clone);
    }
    let new_scale: Iid = change.new_scale.iid;
    changes.stage_update(cache, parameter, |p| p.scale = Some(new_scale));
    info!(
        element = %element_short_name,
        parameter = %parameter_type.short_name,
        "scale changed from {} to {}",
        change.old_scale.short_name,
        change.new_scale.short_name
    );
    ConversionOutcome::Converted { value_sets }
}

/// Converts single-component slots in Computed, Manual, Reference order.
/// Returns the changed copy, or `None` when nothing changed or a slot failed.
fn convert_value_set(
    value_set: &ValueSet,
    change: &ScaleChange<'_>,
    narration: &Narration<'_>,
    errors: &mut usize,
) -> Option<ValueSet> {
    if *errors > 0 {
        return None;
    }
    let mut clone = checkout(value_set);
    let mut changed = false;

    for slot in [&mut clone.computed, &mut clone.manual, &mut clone.reference] {
        if slot.len() != 1 || *errors > 0 {
            continue;
        }
        let old_value = slot[0].clone();
        match convert_numeric_value(&old_value, change.factor, errors) {
            Some(new_value) => {
                info!(
                    element = %narration.element,
                    parameter = %narration.parameter,
                    "value {} {} ({} {}) converted to {} {}",
                    old_value,
                    change.old_scale.short_name,
                    narration.ownership,
                    narration.domain,
                    new_value,
                    change.new_scale.short_name
                );
                changed |= new_value != old_value;
                slot[0] = new_value;
            }
            None => error!(
                element = %narration.element,
                parameter = %narration.parameter,
                "value {} {} ({} {}) cannot be converted",
                old_value,
                change.old_scale.short_name,
                narration.ownership,
                narration.domain
            ),
        }
    }

    (changed && *errors == 0).then_some(clone)
}
