//! `aus apply`

use std::io::{Read, Write};

use anyhow::{bail, Context as _};
use aus_core::{
    consolidate_inheritance, consolidate_sectors, consolidate_version_blocks,
    parse_max_parallel_upgrades_list, parse_sector_list, read_inheritance, read_policies,
    read_sectors, schedule, versions, ClusterUpgradePolicy, InheritanceConfig, InputError,
    UpdateMode,
};
use aus_labels::ApplyOutcome;
use clap::ArgMatches;

use super::{apply_options, print_json, reads_stdin, string, strings, Context};

pub(super) fn run(
    context: &Context<'_>,
    matches: &ArgMatches,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> anyhow::Result<()> {
    let outcome = match matches.subcommand() {
        Some(("policies", args)) => policies(context, args, input)?,
        Some(("sectors", args)) => sectors(context, args, input)?,
        Some(("version-blocks", args)) => version_blocks(context, args, input)?,
        Some(("inheritance", args)) => inheritance(context, args, input)?,
        Some(("gate-agreement", args)) => return gate_agreement(context, args),
        Some((name, _)) => bail!("unknown apply target '{name}'"),
        None => bail!("nothing to apply"),
    };

    match outcome {
        ApplyOutcome::Dumped(value) => print_json(output, &value),
        ApplyOutcome::Reconciled(summary) => {
            tracing::info!(
                upserted = summary.upserted,
                deleted = summary.deleted,
                "labels reconciled"
            );
            Ok(())
        }
    }
}

fn update_mode(args: &ArgMatches) -> UpdateMode {
    UpdateMode::from_replace_flag(args.get_flag("replace"))
}

fn policies(
    context: &Context<'_>,
    args: &ArgMatches,
    input: &mut dyn Read,
) -> anyhow::Result<ApplyOutcome> {
    let mut policies = if reads_stdin(args) {
        read_policies(input)?
    } else {
        vec![policy_from_flags(args)?]
    };

    for policy in &mut policies {
        policy.schedule = schedule::translate(&policy.schedule)?;
        policy
            .validate()
            .with_context(|| format!("invalid policy for cluster '{}'", policy.cluster_name))?;
    }

    Ok(context.backend().apply_policies(
        context.organization_id(args),
        &policies,
        apply_options(args),
    )?)
}

fn policy_from_flags(args: &ArgMatches) -> anyhow::Result<ClusterUpgradePolicy> {
    let Some(cluster_name) = string(args, "cluster-name") else {
        return Err(InputError::MissingClusterName.into());
    };
    let schedule = string(args, "schedule").unwrap_or_default();
    let mut policy = ClusterUpgradePolicy::new(cluster_name, schedule)
        .with_workloads(strings(args, "workload"))
        .with_soak_days(args.get_one::<i64>("soak-days").copied().unwrap_or_default())
        .with_mutexes(strings(args, "mutex"))
        .with_blocked_versions(strings(args, "blocked-version"));
    if let Some(sector) = string(args, "sector") {
        policy = policy.with_sector(sector);
    }
    Ok(policy)
}

fn sectors(
    context: &Context<'_>,
    args: &ArgMatches,
    input: &mut dyn Read,
) -> anyhow::Result<ApplyOutcome> {
    let (to_add, to_remove, max_parallel) = if reads_stdin(args) {
        (read_sectors(input)?, Vec::new(), Vec::new())
    } else {
        (
            parse_sector_list(strings(args, "add-dep"))?,
            parse_sector_list(strings(args, "remove-dep"))?,
            parse_max_parallel_upgrades_list(strings(args, "sector-max-parallel-upgrades"))?,
        )
    };

    let organization_id = context.organization_id(args);
    let current = if update_mode(args).needs_current() {
        context.backend().list_sectors(organization_id)?
    } else {
        Vec::new()
    };

    let sectors = consolidate_sectors(current, &to_add, &to_remove, &max_parallel);
    Ok(context
        .backend()
        .apply_sectors(organization_id, &sectors, apply_options(args))?)
}

fn version_blocks(
    context: &Context<'_>,
    args: &ArgMatches,
    input: &mut dyn Read,
) -> anyhow::Result<ApplyOutcome> {
    let (to_block, to_unblock) = if reads_stdin(args) {
        (versions::read_expressions(input)?, Vec::new())
    } else {
        let to_block = strings(args, "block");
        let to_unblock = strings(args, "unblock");
        if to_block.is_empty() && to_unblock.is_empty() {
            return Err(InputError::NoVersionBlockChanges.into());
        }
        (to_block, to_unblock)
    };

    let organization_id = context.organization_id(args);
    let current = if update_mode(args).needs_current() {
        context.backend().list_blocked_versions(organization_id)?
    } else {
        Vec::new()
    };

    let blocked = consolidate_version_blocks(&current, &to_block, &to_unblock);
    Ok(context
        .backend()
        .apply_blocked_versions(organization_id, &blocked, apply_options(args))?)
}

fn inheritance(
    context: &Context<'_>,
    args: &ArgMatches,
    input: &mut dyn Read,
) -> anyhow::Result<ApplyOutcome> {
    let desired = if reads_stdin(args) {
        read_inheritance(input)?
    } else {
        InheritanceConfig::from_flag_values(&strings(args, "inherit"), &strings(args, "publish"))
    };

    let organization_id = context.organization_id(args);
    let current = if update_mode(args).needs_current() {
        context.backend().get_inheritance(organization_id)?
    } else {
        InheritanceConfig::new()
    };

    let config = consolidate_inheritance(&current, &desired);
    Ok(context
        .backend()
        .apply_inheritance(organization_id, &config, apply_options(args))?)
}

fn gate_agreement(context: &Context<'_>, args: &ArgMatches) -> anyhow::Result<()> {
    let cluster_name = string(args, "cluster-name").ok_or(InputError::MissingClusterName)?;
    let version = string(args, "version").unwrap_or_default();
    let acknowledged = context.backend().apply_gate_agreements(
        context.organization_id(args),
        cluster_name,
        version,
        args.get_flag("dry-run"),
    )?;
    tracing::info!(
        gates = acknowledged.len(),
        "{}version gates acknowledged",
        aus_labels::dry_run_prefix(args.get_flag("dry-run"))
    );
    Ok(())
}
