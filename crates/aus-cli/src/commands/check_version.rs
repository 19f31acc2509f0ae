//! `aus check-version`

use std::io::Write;

use aus_core::{versions, UpgradeFilter};
use clap::ArgMatches;
use serde::Serialize;

use super::{print_json, string, Context};

/// Where a version is blocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct VersionCheck {
    version: String,
    blocked_for_organization: bool,
    blocked_for_clusters: Vec<String>,
}

pub(super) fn run(
    context: &Context<'_>,
    args: &ArgMatches,
    output: &mut dyn Write,
) -> anyhow::Result<()> {
    let version = string(args, "version").unwrap_or_default().trim();
    let backend = context.backend();
    let organization_id = backend.resolve_organization(context.organization_id(args))?;

    let filter = UpgradeFilter::new(backend.list_blocked_versions(Some(organization_id.as_str()))?)?;
    let mut check = VersionCheck {
        version: version.to_string(),
        blocked_for_organization: filter.is_blocked_for_organization(version),
        blocked_for_clusters: Vec::new(),
    };
    for policy in backend.list_policies(Some(organization_id.as_str()), false)? {
        if versions::is_blocked(version, &policy.blocked_version_patterns()?) {
            check.blocked_for_clusters.push(policy.cluster_name);
        }
    }

    print_json(output, &check)
}
