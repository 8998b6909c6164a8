use super::BatchCommands;
use crate::cli::Action;
use crate::services::report::ReportGenerator;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Run the command behind `action`, then the parameter report when asked.
///
/// Returns where the report was written, if it was.
pub fn dispatch(
    action: Option<Action>,
    report: bool,
    commands: &mut dyn BatchCommands,
    reporter: &dyn ReportGenerator,
) -> Option<PathBuf> {
    match action {
        None => debug!("no action selected"),
        Some(action) => {
            info!(action = %action.name(), "running batch command");
            match action {
                Action::AddParameters => commands.add_parameters(),
                Action::RemoveParameters => commands.remove_parameters(),
                Action::MoveReferenceValuesToManualValues => commands.move_reference_values_to_manual_values(),
                Action::ApplyOptionDependence => commands.apply_or_remove_option_dependency(false),
                Action::RemoveOptionDependence => commands.apply_or_remove_option_dependency(true),
                Action::ApplyStateDependence => commands.apply_or_remove_state_dependency(false),
                Action::RemoveStateDependence => commands.apply_or_remove_state_dependency(true),
                Action::ChangeParameterOwnership => commands.change_parameter_ownership(),
                Action::ChangeDomain => commands.change_domain(),
                Action::SetGenericOwners => commands.set_generic_equipment_ownership(),
                Action::SetScale => commands.assign_measurement_scale(),
                Action::StandardizeDimensionsInMillimeter => commands.standardize_dimensions_in_millimetre(),
                Action::SetSubscriptionSwitch => commands.set_parameter_subscriptions_switch(),
                Action::Subscribe => commands.subscribe(),
            }
        }
    }

    if !report {
        return None;
    }
    match reporter.parameters_to_csv() {
        Ok(path) => Some(path),
        Err(err) => {
            error!(error = %err, "parameter report failed");
            None
        }
    }
}
