// src/main.rs
//! Start-up self check for the key core.
//!
//! Loads the optional TOML config, applies `ION_KEYS_*` overrides, installs logging
//! and runs the sanity check against a randomized secp256k1 context. Exits with
//! status 1 when the check fails.
use anyhow::{Context, Result};
use clap::Parser;
use ion_keys::core::logging::init_tracing;
use ion_keys::{os_random, sanity_check, Engine, KeyCoreConfig, PrivateKey};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ion-keycheck")]
#[command(about = "secp256k1 key core self check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => KeyCoreConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => KeyCoreConfig::default(),
    };
    let config = config.from_env_overrides().context("applying environment overrides")?;

    init_tracing(&config.logging);
    info!("ion-keycheck v{}", env!("CARGO_PKG_VERSION"));

    let mut rng = os_random();
    let engine = Engine::randomized(&mut rng).context("seeding secp256k1 context")?;

    if !sanity_check(&engine, &mut rng) {
        error!("key core sanity check failed, refusing to continue");
        return Ok(ExitCode::from(1));
    }

    // Exercise the configured generation policy once as well.
    let key = PrivateKey::generate(&mut rng, &config.keygen, config.compressed_by_default)
        .context("generating probe key")?;
    let pubkey = key.public_key(&engine);
    info!(
        "probe key ok (compressed: {}, fingerprint: {})",
        pubkey.is_compressed(),
        pubkey.fingerprint()
    );
    Ok(ExitCode::SUCCESS)
}
