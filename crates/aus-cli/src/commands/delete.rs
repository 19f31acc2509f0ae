//! `aus delete`

use anyhow::{bail, Context as _};
use aus_core::InputError;
use clap::ArgMatches;

use super::{string, Context};

pub(super) fn run(context: &Context<'_>, matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("policy", args)) => {
            let Some(cluster_name) = string(args, "cluster-name") else {
                return Err(InputError::MissingClusterName.into());
            };
            let summary = context
                .backend()
                .delete_policy(
                    context.organization_id(args),
                    cluster_name,
                    args.get_flag("dry-run"),
                )
                .with_context(|| format!("can't delete policy of cluster '{cluster_name}'"))?;
            tracing::info!(cluster = cluster_name, deleted = summary.deleted, "policy deleted");
            Ok(())
        }
        Some((name, _)) => bail!("unknown delete target '{name}'"),
        None => bail!("nothing to delete"),
    }
}
