//! Command handlers
//!
//! Handlers receive the parsed arguments of their subcommand, a reader for
//! the `-` stdin marker and a writer for their output.

use std::io::{Read, Write};

use anyhow::bail;
use aus_labels::{ApplyOptions, PolicyBackend};
use clap::ArgMatches;
use serde::Serialize;

use crate::config::CliConfig;

mod apply;
mod check_version;
mod delete;
mod gates;
mod get;
mod status;

/// What every command runs against
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    backend: &'a dyn PolicyBackend,
    config: &'a CliConfig,
}

impl<'a> Context<'a> {
    /// Create context
    #[must_use]
    pub fn new(backend: &'a dyn PolicyBackend, config: &'a CliConfig) -> Self {
        Self { backend, config }
    }

    /// Backend holding the policies
    #[must_use]
    pub fn backend(&self) -> &'a dyn PolicyBackend {
        self.backend
    }

    /// API URL the backend talks to
    #[must_use]
    pub fn api_url(&self) -> &'a str {
        &self.config.api_url
    }

    /// Organization from `--org-id`, falling back to the configured one
    #[must_use]
    pub fn organization_id<'b>(&'b self, args: &'b ArgMatches) -> Option<&'b str> {
        args.try_get_one::<String>("org-id")
            .ok()
            .flatten()
            .map(String::as_str)
            .or(self.config.organization_id.as_deref())
    }
}

/// Dispatch a parsed command line
///
/// # Errors
/// Returns the first error of the selected command
pub fn run(
    context: &Context<'_>,
    matches: &ArgMatches,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("apply", args)) => apply::run(context, args, input, output),
        Some(("get", args)) => get::run(context, args, output),
        Some(("delete", args)) => delete::run(context, args),
        Some(("status", args)) => status::run(context, args, output),
        Some(("check-version", args)) => check_version::run(context, args, output),
        Some((name, _)) => bail!("unknown command '{name}'"),
        None => bail!("no command given"),
    }
}

fn strings(args: &ArgMatches, name: &str) -> Vec<String> {
    args.get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn string<'a>(args: &'a ArgMatches, name: &str) -> Option<&'a str> {
    args.get_one::<String>(name).map(String::as_str)
}

fn reads_stdin(args: &ArgMatches) -> bool {
    string(args, "input") == Some("-")
}

fn apply_options(args: &ArgMatches) -> ApplyOptions {
    ApplyOptions::new(args.get_flag("dump"), args.get_flag("dry-run"))
}

fn print_json<T: Serialize + ?Sized>(output: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *output, value)?;
    writeln!(output)?;
    Ok(())
}
