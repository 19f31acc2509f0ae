//! Command line definition

use std::path::PathBuf;

use aus_core::schedule;
use aus_labels::BackendKind;
use clap::{value_parser, Arg, ArgAction, Command};

/// Build the `aus` command tree
#[must_use]
pub fn build_cli() -> Command {
    Command::new("aus")
        .version(crate::VERSION)
        .about("Manage AUS upgrade policies of OCM organizations")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file, defaults to <config dir>/aus/config.toml"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("OCM API URL"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .help("OCM API bearer token"),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .global(true)
                .default_value(BackendKind::OcmLabels.as_str())
                .help("Policy backend"),
        )
        .subcommand(
            Command::new("apply")
                .about("Create or update policies and organization configuration")
                .subcommand_required(true)
                .subcommand(apply_policies())
                .subcommand(apply_sectors())
                .subcommand(apply_version_blocks())
                .subcommand(apply_inheritance())
                .subcommand(apply_gate_agreement()),
        )
        .subcommand(
            Command::new("get")
                .about("Show policies and organization configuration as JSON, or version gates")
                .subcommand_required(true)
                .subcommand(
                    Command::new("policies")
                        .about("Upgrade policies of all clusters")
                        .arg(org_id())
                        .arg(
                            Arg::new("show-all-clusters")
                                .long("show-all-clusters")
                                .action(ArgAction::SetTrue)
                                .help("Include clusters without a policy"),
                        ),
                )
                .subcommand(
                    Command::new("sectors")
                        .about("Sector configuration")
                        .arg(org_id()),
                )
                .subcommand(
                    Command::new("version-blocks")
                        .about("Blocked version expressions")
                        .arg(org_id()),
                )
                .subcommand(
                    Command::new("inheritance")
                        .about("Version data inheritance")
                        .arg(org_id()),
                )
                .subcommand(
                    Command::new("gates")
                        .about("Version gates STS clusters have not acknowledged")
                        .arg(org_id()),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete upgrade policies")
                .subcommand_required(true)
                .subcommand(
                    Command::new("policy")
                        .about("Remove the upgrade policy of a cluster")
                        .arg(org_id())
                        .arg(cluster_name().required(true))
                        .arg(dry_run()),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Describe an organization with all clusters and policies")
                .arg(org_id())
                .arg(
                    Arg::new("show-all-clusters")
                        .long("show-all-clusters")
                        .action(ArgAction::SetTrue)
                        .help("Include clusters without a policy"),
                ),
        )
        .subcommand(
            Command::new("check-version")
                .about("Check if a version is blocked for the organization or its clusters")
                .arg(org_id())
                .arg(
                    Arg::new("version")
                        .required(true)
                        .help("Version to check, e.g. 4.12.3"),
                ),
        )
}

fn apply_policies() -> Command {
    let presets = schedule::preset_names().collect::<Vec<_>>().join(", ");
    Command::new("policies")
        .about("Create or update the upgrade policy of a cluster")
        .long_about(
            "Create or update the upgrade policy of a cluster.\n\n\
             The policy is either defined by flags or read as a JSON list of policies \
             from stdin if the - argument is present. To learn about the stdin format, \
             run this command with flags and use --dump.",
        )
        .arg(org_id())
        .arg(cluster_name())
        .arg(
            Arg::new("schedule")
                .short('s')
                .long("schedule")
                .help(format!(
                    "Cron expression of the upgrade window, or one of the presets: {presets}"
                )),
        )
        .arg(
            Arg::new("workload")
                .short('w')
                .long("workload")
                .action(ArgAction::Append)
                .help("Workload running on the cluster, can be repeated"),
        )
        .arg(
            Arg::new("soak-days")
                .short('d')
                .long("soak-days")
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true)
                .default_value("0")
                .help("Days a version must run on other clusters before this one upgrades"),
        )
        .arg(
            Arg::new("sector")
                .long("sector")
                .help("Sector the cluster belongs to"),
        )
        .arg(
            Arg::new("mutex")
                .short('m')
                .long("mutex")
                .action(ArgAction::Append)
                .help("Mutex the cluster holds while upgrading, can be repeated"),
        )
        .arg(
            Arg::new("blocked-version")
                .short('b')
                .long("blocked-version")
                .action(ArgAction::Append)
                .help("Version expression never to upgrade this cluster to, can be repeated"),
        )
        .arg(dry_run())
        .arg(dump())
        .arg(stdin_marker())
}

fn apply_sectors() -> Command {
    Command::new("sectors")
        .about("Create or update the sector configuration of an organization")
        .long_about(
            "Create or update the sector configuration of an organization.\n\n\
             Sectors are either defined by flags or read as a JSON list from stdin if the - \
             argument is present. If - is present, --add-dep, --remove-dep and \
             --sector-max-parallel-upgrades are ignored.",
        )
        .arg(org_id())
        .arg(
            Arg::new("sector-max-parallel-upgrades")
                .short('m')
                .long("sector-max-parallel-upgrades")
                .action(ArgAction::Append)
                .help("Upgrade cap of a sector as name=N, a bare name clears the cap"),
        )
        .arg(
            Arg::new("add-dep")
                .short('a')
                .long("add-dep")
                .action(ArgAction::Append)
                .help("Dependencies to add as name=dep1,dep2"),
        )
        .arg(
            Arg::new("remove-dep")
                .short('r')
                .long("remove-dep")
                .action(ArgAction::Append)
                .help("Dependencies to remove as name=dep1,dep2"),
        )
        .arg(replace(
            "Replace the whole sector configuration instead of merging with the current one",
        ))
        .arg(dry_run())
        .arg(dump())
        .arg(stdin_marker())
}

fn apply_version_blocks() -> Command {
    Command::new("version-blocks")
        .about("Block or unblock versions for an organization")
        .arg(org_id())
        .arg(
            Arg::new("block")
                .short('b')
                .long("block")
                .action(ArgAction::Append)
                .help("Version expression to block, can be repeated"),
        )
        .arg(
            Arg::new("unblock")
                .short('u')
                .long("unblock")
                .action(ArgAction::Append)
                .help("Version expression to unblock, can be repeated"),
        )
        .arg(replace(
            "Replace all blocked versions instead of merging with the current ones",
        ))
        .arg(dry_run())
        .arg(dump())
        .arg(stdin_marker())
}

fn apply_inheritance() -> Command {
    Command::new("inheritance")
        .about("Configure version data inheritance of an organization")
        .arg(org_id())
        .arg(
            Arg::new("inherit")
                .short('i')
                .long("inherit")
                .action(ArgAction::Append)
                .help("Comma separated organization ids to inherit version data from"),
        )
        .arg(
            Arg::new("publish")
                .short('p')
                .long("publish")
                .action(ArgAction::Append)
                .help("Comma separated organization ids to publish version data to"),
        )
        .arg(replace(
            "Replace the inheritance configuration instead of adding to it",
        ))
        .arg(dry_run())
        .arg(dump())
        .arg(stdin_marker())
}

fn apply_gate_agreement() -> Command {
    Command::new("gate-agreement")
        .about("Acknowledge the version gates of a y-stream for a cluster")
        .arg(org_id())
        .arg(cluster_name().required(true))
        .arg(
            Arg::new("version")
                .long("version")
                .required(true)
                .help("Y-stream whose gates to acknowledge, e.g. 4.14"),
        )
        .arg(dry_run())
}

fn org_id() -> Arg {
    Arg::new("org-id")
        .short('o')
        .long("org-id")
        .help("The ID of the OCM organization to manage, defaults to the organization of the logged in user")
}

fn cluster_name() -> Arg {
    Arg::new("cluster-name")
        .short('c')
        .long("cluster-name")
        .help("Display name of the cluster")
}

fn dry_run() -> Arg {
    Arg::new("dry-run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Log label operations without performing them")
}

fn dump() -> Arg {
    Arg::new("dump")
        .long("dump")
        .action(ArgAction::SetTrue)
        .help("Print the resulting configuration as JSON and exit without applying it")
}

fn replace(help: &'static str) -> Arg {
    Arg::new("replace")
        .long("replace")
        .action(ArgAction::SetTrue)
        .help(help)
}

fn stdin_marker() -> Arg {
    Arg::new("input")
        .value_parser(["-"])
        .help("Read the configuration as JSON from stdin")
}
