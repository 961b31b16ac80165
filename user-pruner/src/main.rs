/*!
Inactive-user pruner CLI
*/

use std::path::PathBuf;

use clap::{Arg, Command};
use tracing::{error, info};

use user_pruner::core::{config::PrunerConfig, pruner::InactiveUserPruner};

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("user-pruner")
        .join("config.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let matches = Command::new("user-pruner")
        .version("0.0.0")
        .about("Deletes analytics platform users that have authored no tracked content")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to the TOML configuration file")
                .value_name("PATH")
        )
        .arg(
            Arg::new("host")
                .long("host")
                .help("Override the platform base URL")
                .value_name("URL")
        )
        .arg(
            Arg::new("username")
                .long("username")
                .help("Override the administrative username")
                .value_name("NAME")
        )
        .arg(
            Arg::new("password")
                .long("password")
                .help("Override the administrative password")
                .value_name("PASSWORD")
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let mut config = if config_path.exists() {
        PrunerConfig::load(&config_path).await?
    } else {
        info!("No config file at {:?}, using built-in defaults", config_path);
        PrunerConfig::default()
    };

    if let Some(host) = matches.get_one::<String>("host") {
        config.platform.host = host.clone();
    }
    if let Some(username) = matches.get_one::<String>("username") {
        config.platform.username = username.clone();
    }
    if let Some(password) = matches.get_one::<String>("password") {
        config.platform.password = password.clone();
    }

    let pruner = InactiveUserPruner::new(config)?;

    tokio::select! {
        result = pruner.run() => {
            match result {
                Ok(report) => {
                    info!(
                        "Run finished: {} users deleted (delete status {})",
                        report.deleted.len(),
                        report.delete_status
                    );
                }
                Err(e) => {
                    error!("Run failed: {}", e);
                    return Err(e);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Interrupted");
        }
    }

    Ok(())
}
