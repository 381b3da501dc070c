/*!
 * dss add - track files or refresh their digests
 */

use super::{print_json, CommandContext};
use crate::cli_style::{add_table, print_info, print_success};
use crate::error::Result;

pub fn run(ctx: &CommandContext, files: &[String]) -> Result<()> {
    let report = ctx.workspace.add(files)?;

    if ctx.json {
        return print_json(&report);
    }

    if report.id_generated {
        print_info("Generated a manifest identifier for this archive");
    }
    println!("{}", add_table(&report));

    if report.saved {
        print_success(&format!(
            "{} added, {} updated, {} unchanged",
            report.added.len(),
            report.updated.len(),
            report.unchanged.len()
        ));
    } else {
        print_info("Nothing changed");
    }
    Ok(())
}
