use crate::cli::Cli;
use crate::domain::models::RunReport;
use crate::services::filter::FilterCriteria;
use crate::services::output::render_run;
use crate::services::session::{FileSession, SaveOutcome};

/// Open the model, run the selected action, write the report if asked and
/// commit unless this is a dry run.
pub fn execute(cli: &Cli) -> anyhow::Result<RunReport> {
    let mut session = FileSession::open(&cli.model, FilterCriteria::from(cli))?;
    let report = session.dispatch(cli);

    let staged = session.changes().len();
    let transactions = session.changes().summaries();
    let engineering_model = session.snapshot().engineering_model.clone();

    let outcome = session.save(cli.dry_run, cli.output.as_deref())?;
    let (committed, output) = match outcome {
        SaveOutcome::Committed { path } => (true, Some(path.to_string_lossy().to_string())),
        SaveOutcome::DryRun | SaveOutcome::NothingToCommit => (false, None),
    };

    Ok(RunReport {
        engineering_model,
        action: cli.action.map(|a| a.name()),
        dry_run: cli.dry_run,
        staged,
        committed,
        output,
        report: report.map(|p| p.to_string_lossy().to_string()),
        transactions,
    })
}

pub fn handle_run(cli: &Cli) -> anyhow::Result<()> {
    let run = execute(cli)?;
    println!("{}", render_run(cli.json, &run)?);
    Ok(())
}
