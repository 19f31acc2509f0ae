//! `aus get`

use std::io::Write;

use anyhow::bail;
use clap::ArgMatches;

use super::{print_json, Context};

pub(super) fn run(
    context: &Context<'_>,
    matches: &ArgMatches,
    output: &mut dyn Write,
) -> anyhow::Result<()> {
    let backend = context.backend();
    match matches.subcommand() {
        Some(("policies", args)) => print_json(
            output,
            &backend.list_policies(
                context.organization_id(args),
                args.get_flag("show-all-clusters"),
            )?,
        ),
        Some(("sectors", args)) => {
            print_json(output, &backend.list_sectors(context.organization_id(args))?)
        }
        Some(("version-blocks", args)) => print_json(
            output,
            &backend.list_blocked_versions(context.organization_id(args))?,
        ),
        Some(("inheritance", args)) => print_json(
            output,
            &backend.get_inheritance(context.organization_id(args))?,
        ),
        Some(("gates", args)) => super::gates::run(context, args, output),
        Some((name, _)) => bail!("unknown get target '{name}'"),
        None => bail!("nothing to get"),
    }
}
