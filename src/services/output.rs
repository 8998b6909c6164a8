use crate::domain::models::{JsonOut, RunReport};

/// What a run prints on stdout: the `JsonOut` envelope with `--json`,
/// otherwise the text rows.
pub fn render_run(json: bool, run: &RunReport) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(&JsonOut { ok: true, data: run })?)
    } else {
        Ok(run_rows(run))
    }
}

/// Text rendering of a run: a summary line, the output and report paths
/// when there are any, then one line per staged transaction.
pub fn run_rows(run: &RunReport) -> String {
    let mut lines = vec![format!(
        "{}\t{}\tstaged={}\tcommitted={}",
        run.engineering_model,
        run.action.as_deref().unwrap_or("none"),
        run.staged,
        run.committed
    )];
    if let Some(output) = &run.output {
        lines.push(format!("output: {}", output));
    }
    if let Some(report) = &run.report {
        lines.push(format!("report: {}", report));
    }
    for t in &run.transactions {
        lines.push(format!("{}\t{}\t{}", t.operation, t.class, t.route.join("/")));
    }
    lines.join("\n")
}
