/*!
 * dss status - compare tracked datasets with the working directory
 */

use super::{print_json, CommandContext};
use crate::cli_style::{print_info, section_header, status_table, Theme};
use crate::error::Result;

pub fn run(ctx: &CommandContext) -> Result<()> {
    let report = ctx.workspace.status()?;

    if ctx.json {
        return print_json(&report);
    }

    section_header("Manifest");
    println!(
        "  id: {}",
        report
            .manifest_id
            .as_deref()
            .unwrap_or("(none, assigned on next add or push)")
    );
    if report.remotes.is_empty() {
        println!("  remotes: {}", Theme::muted("none configured"));
    } else {
        println!("  remotes: {}", report.remotes.join(", "));
    }

    if report.datasets.is_empty() {
        print_info("No datasets tracked yet");
        return Ok(());
    }

    section_header("Datasets");
    println!("{}", status_table(&report));
    Ok(())
}
