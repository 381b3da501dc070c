/*!
 * dss push / dss pull
 *
 * Per-file failures are reported, never raised: the command succeeds as long
 * as the manifest and the remote profile are usable.
 */

use super::{print_json, CommandContext};
use crate::cli_style::{print_success, print_warning, sync_outcome_table, sync_summary_table};
use crate::error::Result;
use crate::remote::Direction;
use crate::sync::{Orchestrator, OutcomeKind, SyncReport, SyncSummary};
use serde::Serialize;

#[derive(Serialize)]
struct SyncJson<'a> {
    #[serde(flatten)]
    report: &'a SyncReport,
    summary: SyncSummary,
}

pub fn run(
    ctx: &CommandContext,
    direction: Direction,
    files: &[String],
    remote: Option<String>,
) -> Result<()> {
    let remote_id = ctx.remote_id(remote);
    let transport = ctx.transport();
    let orchestrator = Orchestrator::new(&ctx.workspace, &transport);

    let report = match direction {
        Direction::Push => orchestrator.push(&remote_id, files)?,
        Direction::Pull => orchestrator.pull(&remote_id, files)?,
    };

    if ctx.json {
        return print_json(&SyncJson {
            report: &report,
            summary: report.summary(),
        });
    }

    render(&report);
    Ok(())
}

fn render(report: &SyncReport) {
    for name in &report.warnings {
        print_warning(&format!("Not a tracked file name, skipping: {}", name));
    }

    println!("{}", sync_outcome_table(report));
    println!("{}", sync_summary_table(report));

    for outcome in report.of_kind(OutcomeKind::IntegrityMismatch) {
        print_warning(&format!(
            "{} does not match the manifest digest ({})",
            outcome.name,
            outcome.detail.as_deref().unwrap_or_default()
        ));
    }

    let summary = report.summary();
    if summary.all_succeeded() {
        let verb = match report.direction {
            Direction::Push => "pushed",
            Direction::Pull => "pulled",
        };
        print_success(&format!("All {} file(s) {}", summary.total, verb));
    }
}
