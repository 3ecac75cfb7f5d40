// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forge admin CLI (forge)
//!
//! Thin client over the daemon's Unix socket: manage the project
//! catalog, trigger builds, and query progress.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};

use crate::client::{CloneResult, DaemonClient};

#[derive(Parser)]
#[command(name = "forge", version, about = "Admin client for the Forge build farm")]
struct Cli {
    /// Path to the daemon socket (defaults to the state directory)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the daemon is alive
    Ping,

    /// Add a project to the catalog
    Add {
        /// Repository URL
        url: String,
        /// Revision to build
        #[arg(long)]
        rev: String,
        /// Build configuration options
        #[arg(long, default_value = "")]
        options: String,
        /// Compilation unit (repeatable)
        #[arg(long = "file", value_name = "FILE")]
        files: Vec<String>,
    },

    /// Remove a project by URL or short name
    Remove { url: String },

    /// List catalog projects
    List,

    /// Dispatch a build to every connected worker
    Clone { url: String },

    /// Show progress of a project's most recent build
    Status { url: String },

    /// Stop the daemon
    Shutdown,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let socket_path = match cli.socket {
        Some(path) => path,
        None => forge_daemon::lifecycle::Config::load()?.socket_path,
    };
    let client = DaemonClient::new(socket_path);

    match cli.command {
        Command::Ping => {
            client.ping().await?;
            println!("pong");
        }

        Command::Add { url, rev, options, files } => {
            let count = files.len();
            client.add_project(url.clone(), rev.clone(), options, files).await?;
            println!("added {url}@{rev} ({count} files)");
        }

        Command::Remove { url } => {
            client.remove_project(&url).await?;
            println!("removed {url}");
        }

        Command::List => {
            let projects = client.list_projects().await?;
            if projects.is_empty() {
                println!("no projects");
            }
            for project in projects {
                println!("{}", format_project(&project));
            }
        }

        Command::Clone { url } => match client.clone_project(&url).await? {
            CloneResult::Started { build_id, workers } => {
                println!("work started: {build_id} on {workers} worker(s)");
            }
            CloneResult::NoWorkers => bail!("no workers available"),
            CloneResult::NotFound => bail!("not found: {url}"),
        },

        Command::Status { url } => match client.status(&url).await? {
            Some(status) => {
                println!(
                    "{}@{}: {}/{} artifacts ({} pending)",
                    status.url,
                    status.rev,
                    status.artifacts,
                    status.artifacts + status.pending,
                    status.pending,
                );
            }
            None => bail!("not found: {url}"),
        },

        Command::Shutdown => {
            client.shutdown().await?;
            println!("daemon shutting down");
        }
    }

    Ok(())
}

fn format_project(project: &forge_daemon::ProjectEntry) -> String {
    let mut line = format!("{}@{} [{} files]", project.url, project.rev, project.files);
    if !project.options.is_empty() {
        line.push_str(&format!(" options: {}", project.options));
    }
    line
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
