//! AUS CLI
//!
//! Command line tool to manage AUS upgrade policies, sector configuration,
//! blocked versions and version data inheritance of OCM organizations.
//!
//! # Core Concepts
//!
//! - [`cli::build_cli`]: The `aus` command tree
//! - [`config::CliConfig`]: Defaults, config file, environment and flags
//! - [`commands`]: Handlers consolidating desired state and calling the backend
//!
//! # Example
//!
//! ```rust,ignore
//! let matches = aus_cli::cli::build_cli().get_matches();
//! aus_cli::logging::init(matches.get_flag("debug"));
//! aus_cli::run(&matches)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use std::path::PathBuf;

use anyhow::Context as _;
use aus_labels::{new_policy_backend, BackendKind};
use aus_ocm::OcmClient;
use clap::ArgMatches;

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

use config::CliConfig;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve the configuration for a parsed command line
///
/// # Errors
/// Returns an error if the configuration file cannot be loaded
pub fn load_config(matches: &ArgMatches) -> anyhow::Result<CliConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let mut config = CliConfig::load(path.map(PathBuf::as_path))?.with_process_env();
    if let Some(api_url) = matches.get_one::<String>("api-url") {
        config = config.with_api_url(api_url);
    }
    if let Some(token) = matches.get_one::<String>("token") {
        config = config.with_token(token);
    }
    Ok(config)
}

/// Run a parsed command line against the OCM API
///
/// # Errors
/// Returns the first configuration, connection or command error
pub fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches)?;
    let kind: BackendKind = matches
        .get_one::<String>("backend")
        .map_or("", String::as_str)
        .parse()?;

    let client = OcmClient::new(&config.api_url, config.token(), config.timeout())
        .context("can't create OCM connection")?;
    tracing::debug!(api_url = %client.base_url(), backend = %kind, "using OCM API");
    let backend = new_policy_backend(kind, client.clone(), client);

    let context = commands::Context::new(backend.as_ref(), &config);
    commands::run(
        &context,
        matches,
        &mut std::io::stdin().lock(),
        &mut std::io::stdout().lock(),
    )
}
