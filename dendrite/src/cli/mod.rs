//! The `dendrite` crate provides a Command Line Interface (CLI) for turning
//! the parameters of one executor shard into a complete Kubernetes
//! Deployment manifest, and for rolling that manifest out to a cluster.
//!
//! # Examples
//!
//! ```bash
//! # Print an annotated parameters file to start from
//! dendrite example-params > shard.yaml
//!
//! # Render the manifest for one shard
//! dendrite generate --params shard.yaml
//!
//! # Render with one field overridden
//! dendrite generate --params shard.yaml --set shardId=2
//!
//! # Apply the manifest and wait for the rollout to finish
//! dendrite apply --params shard.yaml --wait
//! ```

mod apply;
pub mod error;
mod generate;
mod internal;

use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use futures::FutureExt;
use snafu::ResultExt;
use tokio::runtime::Runtime;

pub use self::error::Error;
use self::{apply::ApplyCommand, generate::GenerateCommand};
use crate::{CLI_PROGRAM_NAME, config::Config, shadow};

/// `Cli` is the main entry point for the Dendrite Command Line Interface.
///
/// It parses command-line arguments and dispatches to the appropriate
/// subcommand for manifest generation or rollout.
#[derive(Parser)]
#[command(
    name = CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Dendrite CLI: Render and roll out sharded executor Deployments on Kubernetes.",
    long_about = "Dendrite turns the parameters of one executor shard into a complete \
                  Kubernetes Deployment manifest. Parameters are validated up front with \
                  every violated constraint reported at once, the fixed rollout and \
                  lifecycle policy is attached, and the manifest is either printed as \
                  YAML or applied to a cluster.",
    color = clap::ColorChoice::Always
)]
pub struct Cli {
    /// The subcommand to execute.
    #[clap(subcommand)]
    commands: Option<Commands>,

    /// Path to the configuration file.
    ///
    /// Defaults to `~/.config/dendrite/config.yaml` or the path specified by
    /// the `DENDRITE_CONFIG_FILE_PATH` environment variable.
    #[clap(
        long = "config",
        short = 'c',
        env = "DENDRITE_CONFIG_FILE_PATH",
        help = "Specify a configuration file. Defaults to ~/.config/dendrite/config.yaml or \
                DENDRITE_CONFIG_FILE_PATH env var."
    )]
    config_file: Option<PathBuf>,

    /// Sets the logging level for the application.
    ///
    /// Supported levels include `info`, `debug`, and `trace`.
    #[clap(
        long = "log-level",
        env = "DENDRITE_LOG_LEVEL",
        help = "Set the logging level (e.g., info, debug, trace)."
    )]
    log_level: Option<tracing::Level>,
}

/// `Commands` enumerates the available subcommands for the Dendrite CLI.
#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Displays client and server version information.
    #[command(about = "Display client and server version information")]
    Version {
        /// If true, shows only the client version and does not require a
        /// server connection.
        #[clap(long = "client", help = "If true, shows client version only (no server required).")]
        client: bool,
    },

    /// Generates a shell completion script for the specified shell.
    #[command(about = "Generate shell completion script for the specified shell (bash, zsh, fish)")]
    Completions { shell: clap_complete::Shell },

    /// Outputs the default configuration in YAML format to standard output.
    #[command(about = "Output the default configuration in YAML format")]
    DefaultConfig,

    /// Outputs an annotated example parameters file to standard output.
    #[command(about = "Output an annotated example parameters file in YAML format")]
    ExampleParams,

    /// Renders the Deployment manifest for one executor shard.
    #[command(alias = "g", about = "Render the Deployment manifest for one executor shard")]
    Generate(GenerateCommand),

    /// Renders the Deployment manifest for one executor shard and applies it
    /// to the cluster.
    #[command(
        alias = "a",
        about = "Render the Deployment manifest for one executor shard and apply it to the cluster"
    )]
    Apply(ApplyCommand),
}

impl Default for Cli {
    /// Creates a new `Cli` instance by parsing command-line arguments.
    fn default() -> Self { Self::parse() }
}

impl Cli {
    /// Loads the application configuration, applying any overrides from CLI
    /// arguments.
    ///
    /// If a configuration file path is provided via the `--config` flag or
    /// `DENDRITE_CONFIG_FILE_PATH` environment variable, it is required to
    /// exist. Otherwise the default locations are searched and a missing
    /// file falls back to the default configuration. The `log_level` from
    /// CLI arguments (if present) overrides the configuration file's
    /// setting.
    ///
    /// # Errors
    ///
    /// Returns an `Error` if the configuration file cannot be loaded or
    /// parsed.
    fn load_config(&self) -> Result<Config, Error> {
        let mut config = match self.config_file.clone() {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(Config::search_config_file_path())?,
        };

        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }

        Ok(config)
    }

    /// Executes the main logic of the CLI application based on the parsed
    /// command and arguments.
    ///
    /// Commands that need no configuration or cluster (`Version --client`,
    /// `Completions`, `DefaultConfig`, `ExampleParams`) run first.
    /// `Generate` needs only the configuration; everything else initializes
    /// the Kubernetes client inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an `Error` if:
    /// - Configuration loading fails via `load_config`.
    /// - The Kubernetes client cannot be initialized.
    /// - The Tokio runtime fails to initialize.
    /// - Any subcommand's `run` method returns an error.
    ///
    /// # Panics
    ///
    /// This method `expect`s on `std::io::stdout().write_all()` operations.
    /// In a typical CLI environment, writing to `stdout` or `stderr` is
    /// expected to succeed.
    pub fn run(self) -> Result<i32, Error> {
        let client_version = Self::command().get_version().unwrap_or_default().to_string();
        match self.commands {
            Some(Commands::Version { client }) if client => {
                std::io::stdout()
                    .write_all(Self::command().render_long_version().as_bytes())
                    .expect("Failed to write to stdout");
                std::io::stdout()
                    .write_all(format!("Client Version: {client_version}\n").as_bytes())
                    .expect("Failed to write to stdout");

                return Ok(0);
            }
            Some(Commands::Completions { shell }) => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Some(Commands::DefaultConfig) => {
                std::io::stdout()
                    .write_all(Config::template_basic().as_slice())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            Some(Commands::ExampleParams) => {
                std::io::stdout()
                    .write_all(generate::EXAMPLE_PARAMS.as_bytes())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            _ => {}
        }

        let config = self.load_config()?;
        config.log.registry();

        match self.commands {
            Some(Commands::Generate(cmd)) => {
                cmd.run(config)?;
                Ok(0)
            }
            commands => {
                let fut = async move {
                    let kube_client =
                        kube::Client::try_default().await.context(error::KubeConfigSnafu)?;
                    match commands {
                        Some(Commands::Version { .. }) => {
                            let server_version = kube_client.apiserver_version().await.map_or_else(
                                |_| "unknown".to_string(),
                                |info| format!("{}.{}", info.major, info.minor),
                            );
                            let info = format!(
                                "Client Version: {client_version}\nServer Version: \
                                 {server_version}\n",
                            );
                            std::io::stdout()
                                .write_all(Self::command().render_long_version().as_bytes())
                                .expect("Failed to write to stdout");
                            std::io::stdout()
                                .write_all(info.as_bytes())
                                .expect("Failed to write to stdout");

                            return Ok(0);
                        }
                        Some(Commands::Apply(cmd)) => cmd.run(kube_client, config).boxed().await?,
                        _ => {
                            let help = Self::command().render_long_help().ansi().to_string();
                            std::io::stderr()
                                .write_all(help.as_bytes())
                                .expect("Failed to write to stdout");
                            return Ok(-1);
                        }
                    }

                    Ok(0)
                };

                Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)
            }
        }
    }
}
