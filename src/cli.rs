//! CLI parsing and command execution
//!
//! This module handles command-line argument parsing and routes commands to the appropriate handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use media_token_rotator::media::RedGifsClient;
use media_token_rotator::publisher::SecretPublisher;
use media_token_rotator::rotation::{RotationOutcome, Rotator};
use media_token_rotator::store::AwsSecretsStore;
use media_token_rotator::Config;

#[derive(Parser)]
#[command(name = "mtr")]
#[command(about = "Rotate a media API access token into AWS Secrets Manager", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "ROTATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Secret id to publish to (overrides config file)
    #[arg(long)]
    pub secret_id: Option<String>,

    /// AWS region of the secret store (overrides config file)
    #[arg(long)]
    pub region: Option<String>,

    /// Resource id used to validate new tokens (overrides config file)
    #[arg(long)]
    pub probe_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a sample configuration file
    Init {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "rotator-config.toml")]
        output: PathBuf,
    },

    /// Obtain, validate and publish a new access token
    Run,
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    if let Commands::Init { output } = cli.command {
        Config::create_sample(&output)
            .with_context(|| format!("Failed to create sample config at {:?}", output))?;
        info!("Sample configuration created at {:?}", output);
        return Ok(());
    }

    let mut config = if let Some(config_path) = cli.config {
        Config::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        Config::from_env().context("Failed to load config from environment")?
    };

    if let Some(secret_id) = cli.secret_id {
        config.secret_store.secret_id = secret_id;
    }
    if let Some(region) = cli.region {
        config.secret_store.region = Some(region);
    }
    if let Some(probe_id) = cli.probe_id {
        config.media_api.probe_id = probe_id;
    }

    config.validate().context("Invalid configuration")?;

    let api = RedGifsClient::new(&config.media_api).context("Failed to create media API client")?;
    let store = AwsSecretsStore::new(config.secret_store.region.clone()).await;
    let publisher = SecretPublisher::new(Box::new(store), config.secret_store.secret_id.clone());
    let rotator = Rotator::from_config(&config, Box::new(api), publisher);

    // Outcome is reported through logs only; a missed rotation is not an error
    match rotator.run().await {
        RotationOutcome::Published { attempt, status } => {
            info!(
                "Rotation finished on attempt {} (stored: {})",
                attempt,
                status.is_written()
            );
        }
        RotationOutcome::Exhausted { attempts } => {
            info!(
                "Rotation finished without a new token after {} attempts (schedule {:?})",
                attempts,
                rotator.schedule()
            );
        }
    }

    Ok(())
}
