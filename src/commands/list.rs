/*!
 * dss list - show this archive's directory on a remote
 */

use super::{print_json, CommandContext};
use crate::error::Result;
use crate::sync::Orchestrator;
use serde::Serialize;

#[derive(Serialize)]
struct ListJson<'a> {
    remote: String,
    listing: &'a str,
}

pub fn run(ctx: &CommandContext, remote: Option<String>) -> Result<()> {
    let remote_id = ctx.remote_id(remote);
    let transport = ctx.transport();
    let output = Orchestrator::new(&ctx.workspace, &transport).list(&remote_id)?;

    if ctx.json {
        return print_json(&ListJson {
            remote: dss_core_manifest::remote_key(&remote_id),
            listing: &output.stdout,
        });
    }

    print!("{}", output.stdout);
    Ok(())
}
