//! `luxfhe-kms` command line client
//!
//! Configuration comes from `LUXFHE_KMS_*` environment variables; logging from
//! `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use luxfhe_kms::{DecryptionRequest, KeyGenRequest, KmsClient, KmsConfig, WaitOptions};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "luxfhe-kms")]
#[command(about = "Threshold FHE key management and decryption client")]
#[command(version)]
struct Cli {
    /// KMS server URL, overriding LUXFHE_KMS_URL
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check server health
    Health,
    /// Run distributed key generation
    Keygen {
        /// Shares required to decrypt
        #[arg(requires = "parties")]
        threshold: Option<u32>,
        /// Total number of parties
        #[arg(requires = "threshold")]
        parties: Option<u32>,
    },
    /// Print the public key (base64)
    Publickey,
    /// Print the threshold party roster
    Parties,
    /// Submit a ciphertext and wait for the plaintext
    Decrypt {
        ciphertext: String,
        request_id: Option<String>,
    },
    /// Print the current status of a request
    Result { request_id: String },
    /// Wait for a submitted request
    Wait { request_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = KmsConfig::from_env().context("Failed to load KMS configuration")?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    let wait = WaitOptions::from_env().context("Failed to load wait options")?;
    let client = KmsClient::new(config).context("Failed to create KMS client")?;
    log::debug!("Using KMS at {}", client.server_url());

    match cli.command {
        Command::Health => print_json(&client.health().await?)?,
        Command::Keygen { threshold, parties } => {
            let request = match (threshold, parties) {
                (Some(t), Some(n)) => Some(KeyGenRequest::new(t, n)?),
                _ => None,
            };
            print_json(&client.generate_keys(request).await?)?
        }
        Command::Publickey => println!("{}", client.get_public_key().await?),
        Command::Parties => print_json(&client.get_parties().await?)?,
        Command::Decrypt { ciphertext, request_id } => {
            let mut request = DecryptionRequest::new(ciphertext);
            if let Some(request_id) = request_id {
                request = request.with_request_id(request_id);
            }
            println!("{}", client.decrypt(request, wait).await?);
        }
        Command::Result { request_id } => print_json(&client.get_decryption_result(&request_id).await?)?,
        Command::Wait { request_id } => println!("{}", client.wait_for_decryption(&request_id, wait).await?),
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
