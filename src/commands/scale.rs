use super::BatchEditor;
use crate::domain::constants::{factor_to_millimetre, DIMENSION_PARAMETERS, MILLIMETRE};
use crate::domain::models::{ElementDefinition, Iid, Parameter, ParameterType};
use crate::services::conversion::{convert_parameter_value_and_scale, ScaleChange};
use tracing::{info, warn};

impl<'a> BatchEditor<'a> {
    /// Assign `--scale` to every selected quantity-kind parameter in scope.
    ///
    /// With `--from-scale` the values are converted as well, by
    /// `--conversion-factor` or by the ratio of the two scales' millimetre
    /// factors; without it only the scale is relabelled.
    pub fn assign_measurement_scale(&mut self) {
        let site_directory = self.site_directory;
        let Some(scale) = self
            .args
            .scale
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| site_directory.scale_by_short_name(s.trim()))
        else {
            warn!("invalid action set-scale: short name of a valid scale must be given in --scale");
            return;
        };
        if !self.args.has_selected_parameters() {
            warn!("no --parameters given; set-scale skipped");
            return;
        }

        let conversion = match self.args.from_scale.as_deref() {
            None => None,
            Some(from) => {
                let Some(old_scale) = site_directory.scale_by_short_name(from.trim()) else {
                    warn!(scale = %from, "unknown --from-scale; set-scale skipped");
                    return;
                };
                let factor = self.args.conversion_factor.or_else(|| {
                    Some(factor_to_millimetre(&old_scale.short_name)? / factor_to_millimetre(&scale.short_name)?)
                });
                let Some(factor) = factor else {
                    warn!(
                        from = %old_scale.short_name,
                        to = %scale.short_name,
                        "no --conversion-factor given and no known factor between the scales; set-scale skipped"
                    );
                    return;
                };
                Some(ScaleChange {
                    old_scale,
                    new_scale: scale,
                    factor,
                })
            }
        };

        let cache = self.cache;
        for element in self.filtered_elements() {
            for parameter in self.sorted_parameters(element) {
                let Some(parameter_type) = cache
                    .parameter_type(parameter.parameter_type)
                    .filter(|pt| pt.is_quantity_kind())
                else {
                    continue;
                };
                if !self.filter.is_parameter_specified_or_any(parameter_type) {
                    continue;
                }
                self.warn_on_invalid_scale(element, parameter, parameter_type);

                if !self.args.is_selected(&parameter_type.short_name)
                    || !parameter_type.possible_scales().contains(&scale.iid)
                    || parameter.scale == Some(scale.iid)
                {
                    continue;
                }
                match &conversion {
                    Some(change) => {
                        convert_parameter_value_and_scale(self.changes, cache, &element.short_name, parameter, change);
                    }
                    None => {
                        let new_scale: Iid = scale.iid;
                        self.changes
                            .stage_update(cache, parameter, |p| p.scale = Some(new_scale));
                        info!(
                            parameter = %self.user_friendly_short_name(element, parameter.iid),
                            "assigned scale {}",
                            scale.short_name
                        );
                    }
                }
            }
        }
    }

    /// Convert every dimension parameter (`d`, `h`, `l`, `wid`) in scope to
    /// millimetre, whatever known length scale it is currently in.
    pub fn standardize_dimensions_in_millimetre(&mut self) {
        let site_directory = self.site_directory;
        let Some(millimetre) = site_directory.scale_by_short_name(MILLIMETRE) else {
            warn!("no millimetre scale in the reference data; standardization skipped");
            return;
        };

        let (filter, cache, iteration) = (self.filter, self.cache, self.iteration);
        for element in iteration.elements_by_short_name() {
            if !filter.is_filtered_in_or_filter_is_empty(element) {
                continue;
            }
            for dimension in DIMENSION_PARAMETERS {
                let Some(parameter) = element.parameters.iter().find(|p| {
                    cache
                        .parameter_type(p.parameter_type)
                        .is_some_and(|pt| pt.short_name == dimension && filter.is_parameter_specified_or_any(pt))
                }) else {
                    continue;
                };
                let Some(parameter_type) = cache.parameter_type(parameter.parameter_type) else {
                    continue;
                };
                if !parameter_type.is_quantity_kind()
                    || !parameter_type.possible_scales().contains(&millimetre.iid)
                    || parameter.scale == Some(millimetre.iid)
                {
                    continue;
                }
                let Some(old_scale) = parameter.scale.and_then(|s| cache.scale(s)) else {
                    warn!(element = %element.short_name, parameter = %dimension, "no measurement scale assigned; left as is");
                    continue;
                };
                let Some(factor) = factor_to_millimetre(&old_scale.short_name) else {
                    warn!(
                        element = %element.short_name,
                        parameter = %dimension,
                        "no known factor from {} to millimetre; left as is",
                        old_scale.short_name
                    );
                    continue;
                };
                let change = ScaleChange {
                    old_scale,
                    new_scale: millimetre,
                    factor,
                };
                convert_parameter_value_and_scale(self.changes, cache, &element.short_name, parameter, &change);
            }
        }
    }

    fn warn_on_invalid_scale(&self, element: &ElementDefinition, parameter: &Parameter, parameter_type: &ParameterType) {
        let mut possible: Vec<String> = parameter_type
            .possible_scales()
            .iter()
            .map(|s| self.cache.scale_short_name(Some(*s)))
            .collect();
        possible.sort();
        let name = self.user_friendly_short_name(element, parameter.iid);
        match parameter.scale {
            None => warn!(parameter = %name, "no measurement scale assigned: should be one of {}", possible.join(", ")),
            Some(current) if !parameter_type.possible_scales().contains(&current) => warn!(
                parameter = %name,
                "invalid measurement scale {} assigned: should be one of {}",
                self.cache.scale_short_name(Some(current)),
                possible.join(", ")
            ),
            Some(_) => {}
        }
    }
}
