//! locale-vault - Entry Point
//!
//! Operator command line over the versioned localization store.

use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use locale_vault::cli::{Cli, Command};
use locale_vault::config::VaultConfig;
use locale_vault::error::handlers::handle_error;
use locale_vault::error::{Stage, StorageError, StorageResult};
use locale_vault::service::{StorageService, VaultHandle};
use locale_vault::storage::{Tree, UnitKey};
use locale_vault::utils::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let config = match VaultConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cli.config, e);
            return ExitCode::FAILURE;
        }
    };

    setup_logging(&config.log_level);
    info!("Launching locale-vault on {}", config.storage_root);

    let service = StorageService::from_config(&config);
    if let Err(e) = service.prepare() {
        report(&e);
        return ExitCode::FAILURE;
    }

    match run(&VaultHandle::new(service), cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(vault: &VaultHandle, command: Command) -> StorageResult<()> {
    match command {
        Command::Create { key, file } => {
            let payload = read_payload(file).await?;
            let written = vault.create(UnitKey::parse(&key)?, payload).await?;
            println!("{} v{} {}", written.unit, written.revision, written.path.display());
        }
        Command::Read { key } => {
            let payload = vault.read(UnitKey::parse(&key)?).await?;
            let mut stdout = tokio::io::stdout();
            let out = PathBuf::from("<stdout>");
            stdout
                .write_all(&payload)
                .await
                .map_err(|e| StorageError::from_io(Stage::Write, &out, e))?;
            stdout
                .flush()
                .await
                .map_err(|e| StorageError::from_io(Stage::Write, &out, e))?;
        }
        Command::Update { key, file } => {
            let payload = read_payload(file).await?;
            let outcome = vault.update(UnitKey::parse(&key)?, payload).await?;
            println!(
                "{} v{} archived to {}",
                outcome.archived.unit,
                outcome.archived.revision,
                outcome.archived.destination.display()
            );
            println!(
                "{} v{} {}",
                outcome.written.unit,
                outcome.written.revision,
                outcome.written.path.display()
            );
        }
        Command::Delete { key } => {
            let moved = vault.delete(UnitKey::parse(&key)?).await?;
            println!(
                "{} v{} trashed to {}",
                moved.unit,
                moved.revision,
                moved.destination.display()
            );
        }
        Command::Revisions { key, tree } => {
            let unit = UnitKey::parse(&key)?;
            match Tree::from(tree) {
                Tree::Latest => {
                    for revision in vault.revisions(unit, Tree::Latest).await? {
                        println!("{}", revision);
                    }
                }
                tree => {
                    for (revision, generation) in vault.generations(unit, tree).await? {
                        if generation == 0 {
                            println!("{}", revision);
                        } else {
                            println!("{}_{}", revision, generation);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Payload bytes from `--file`, or stdin when no file was given
async fn read_payload(file: Option<PathBuf>) -> StorageResult<Vec<u8>> {
    match file {
        Some(path) => tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::from_io(Stage::Read, &path, e)),
        None => {
            let mut payload = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut payload)
                .await
                .map_err(|e| StorageError::from_io(Stage::Read, &PathBuf::from("<stdin>"), e))?;
            Ok(payload)
        }
    }
}

fn report(err: &StorageError) {
    eprintln!("{}", handle_error(err).to_json());
}
