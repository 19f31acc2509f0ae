//! `aus status`

use std::fmt::Write as _;
use std::io::Write;

use aus_labels::{ClusterStatus, Organization, StatusReport};
use clap::ArgMatches;
use comfy_table::presets::NOTHING;
use comfy_table::{Cell, Row, Table};

use super::Context;

const NONE: &str = "<none>";

pub(super) fn run(
    context: &Context<'_>,
    args: &ArgMatches,
    output: &mut dyn Write,
) -> anyhow::Result<()> {
    let report = context.backend().status(
        context.organization_id(args),
        args.get_flag("show-all-clusters"),
    )?;
    output.write_all(describe(&report, context.api_url()).as_bytes())?;
    Ok(())
}

/// Borderless table, optionally with a header row
pub(super) fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    if !header.is_empty() {
        table.set_header(header.iter().map(Cell::new));
    }
    table
}

/// Render columns two spaces apart, each line prefixed with `indent`
pub(super) fn render(table: &mut Table, indent: &str) -> String {
    for column in table.column_iter_mut() {
        column.set_padding((0, 2));
    }
    table
        .to_string()
        .lines()
        .map(|line| format!("{indent}{}\n", line.trim_end()))
        .collect()
}

pub(super) fn joined(values: &[String]) -> String {
    if values.is_empty() {
        NONE.to_string()
    } else {
        values.join(", ")
    }
}

/// Organization, environment and blocked versions as `label: value` lines
pub(super) fn organization_summary(
    organization: &Organization,
    api_url: &str,
    blocked_versions: &[String],
) -> Table {
    let mut summary = table(&[]);
    summary.add_row(["Organization ID:", organization.id.as_str()]);
    summary.add_row(["Organization name:", organization.name.as_str()]);
    summary.add_row(["OCM environment:", api_url]);
    summary.add_row(["Blocked versions:".to_string(), joined(blocked_versions)]);
    summary
}

fn cluster_row(cluster: &ClusterStatus) -> Row {
    let upgrades = joined(&cluster.available_upgrades);
    let cells = match &cluster.policy {
        Some(policy) => vec![
            cluster.name.clone(),
            cluster.version.clone(),
            "true".to_string(),
            policy.schedule.clone(),
            policy
                .conditions
                .sector
                .clone()
                .unwrap_or_else(|| NONE.to_string()),
            joined(&policy.conditions.mutexes),
            policy.conditions.soak_days.to_string(),
            joined(&policy.workloads),
            upgrades,
        ],
        None => vec![
            cluster.name.clone(),
            cluster.version.clone(),
            "false".to_string(),
            NONE.to_string(),
            NONE.to_string(),
            NONE.to_string(),
            NONE.to_string(),
            NONE.to_string(),
            upgrades,
        ],
    };
    Row::from(cells)
}

fn describe(report: &StatusReport, api_url: &str) -> String {
    let mut summary =
        organization_summary(&report.organization, api_url, &report.blocked_versions);
    let inherit: Vec<String> = report.inheritance.inheriting_from.iter().cloned().collect();
    let publish: Vec<String> = report.inheritance.publishing_to.iter().cloned().collect();
    summary.add_row(["Inherits version data from:".to_string(), joined(&inherit)]);
    summary.add_row(["Publishes version data to:".to_string(), joined(&publish)]);

    let mut out = render(&mut summary, "");

    let _ = writeln!(
        out,
        "Sector configuration: ({} in total)",
        report.sectors.len()
    );
    if !report.sectors.is_empty() {
        let mut sectors = table(&["Name", "Max parallel upgrades", "Depends on"]);
        for sector in &report.sectors {
            let dependencies: Vec<String> = sector.dependencies.iter().cloned().collect();
            sectors.add_row([
                sector.name.clone(),
                sector
                    .max_parallel_upgrades
                    .clone()
                    .unwrap_or_else(|| NONE.to_string()),
                joined(&dependencies),
            ]);
        }
        out.push_str(&render(&mut sectors, "  "));
    }

    let _ = writeln!(out, "Clusters: ({} in total)", report.clusters.len());
    if !report.clusters.is_empty() {
        let mut clusters = table(&[
            "Cluster name",
            "Version",
            "AUS enabled",
            "Schedule",
            "Sector",
            "Mutexes",
            "Soak days",
            "Workloads",
            "Available upgrades",
        ]);
        for cluster in &report.clusters {
            clusters.add_row(cluster_row(cluster));
        }
        out.push_str(&render(&mut clusters, "  "));
    }
    out
}
