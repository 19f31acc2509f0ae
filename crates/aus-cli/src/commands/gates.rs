//! `aus get gates`

use std::io::Write;

use aus_labels::GateReport;
use clap::ArgMatches;

use super::status::{organization_summary, render, table};
use super::Context;

pub(super) fn run(
    context: &Context<'_>,
    args: &ArgMatches,
    output: &mut dyn Write,
) -> anyhow::Result<()> {
    let report = context
        .backend()
        .missing_gate_agreements(context.organization_id(args))?;
    output.write_all(describe(&report, context.api_url()).as_bytes())?;
    Ok(())
}

fn describe(report: &GateReport, api_url: &str) -> String {
    let mut summary =
        organization_summary(&report.organization, api_url, &report.blocked_versions);
    let mut out = render(&mut summary, "");

    out.push_str("Unacknowledged version gates:\n");
    let mut gates = table(&[
        "Cluster name",
        "Current version",
        "Gated version",
        "Gate description",
        "Gate ID",
        "Documentation",
    ]);
    for missing in &report.missing {
        gates.add_row([
            missing.cluster_name.as_str(),
            missing.cluster_version.as_str(),
            missing.gate.version_raw_id_prefix.as_str(),
            missing.gate.description.as_str(),
            missing.gate.id.as_str(),
            missing.gate.documentation_url.as_str(),
        ]);
    }
    out.push_str(&render(&mut gates, "  "));
    out
}
