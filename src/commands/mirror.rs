/*!
 * dss mirror push|pull - sync a profile's staging directory wholesale
 */

use super::{print_json, CommandContext};
use crate::cli_style::print_success;
use crate::error::Result;
use crate::remote::Direction;
use crate::sync::Orchestrator;
use serde::Serialize;

#[derive(Serialize)]
struct MirrorJson<'a> {
    direction: Direction,
    remote: String,
    output: &'a str,
}

pub fn run(
    ctx: &CommandContext,
    direction: Direction,
    remote: Option<String>,
    path: Option<&str>,
) -> Result<()> {
    let remote_id = ctx.remote_id(remote);
    let transport = ctx.transport();
    let output = Orchestrator::new(&ctx.workspace, &transport).mirror(&remote_id, direction, path)?;

    if ctx.json {
        return print_json(&MirrorJson {
            direction,
            remote: dss_core_manifest::remote_key(&remote_id),
            output: &output.stdout,
        });
    }

    print!("{}", output.stdout);
    print_success(match direction {
        Direction::Push => "Staging directory pushed",
        Direction::Pull => "Staging directory pulled",
    });
    Ok(())
}
