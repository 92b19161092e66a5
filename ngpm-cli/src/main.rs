//! ngpm - a minimal local package manager
//!
//! Lists fetched packages, fetches and installs packages from a registry, and
//! runs their build scripts.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ngpm_core::config::NgpmConfig;
use ngpm_core::error::PackageError;
use ngpm_core::package::{ExitClass, IdentifierError, PackageIdentifier, PackageManager};

mod commands;
mod menu;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "ngpm", about = "A minimal local package manager", version)]
struct Cli {
    /// Command to run; opens the interactive menu when omitted
    #[clap(subcommand)]
    command: Option<Command>,

    /// Set log level (RUST_LOG takes precedence when set)
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Configuration file (defaults to the platform config directory)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Override the packages directory
    #[clap(long, global = true)]
    packages_dir: Option<PathBuf>,

    /// Override the installed directory
    #[clap(long, global = true)]
    installed_dir: Option<PathBuf>,

    /// Override the registry base URL
    #[clap(long, global = true)]
    registry_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List packages in the packages directory
    List {
        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Download a package archive from the registry
    Fetch(PackageArgs),

    /// Fetch a package and install it
    Install(PackageArgs),

    /// Run an installed package's build script
    Build(PackageArgs),

    /// Interactive numbered menu
    Menu,
}

/// A package named either as `<name> <version>` or as `<name>@<version>`
#[derive(Args, Debug)]
struct PackageArgs {
    /// Package name, or `name@version`
    package: String,

    /// Package version; omit when given as `name@version`
    version: Option<String>,
}

impl PackageArgs {
    fn identifier(self) -> Result<PackageIdentifier, IdentifierError> {
        match self.version {
            Some(version) => PackageIdentifier::new(self.package, version),
            None => self.package.parse(),
        }
    }
}

fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    // Logs go to stderr; stdout carries status lines and listings
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<NgpmConfig> {
    let mut config = NgpmConfig::load(cli.config.as_deref())?;

    if let Some(dir) = &cli.packages_dir {
        config.packages_dir = dir.clone();
    }
    if let Some(dir) = &cli.installed_dir {
        config.installed_dir = dir.clone();
    }
    if let Some(url) = &cli.registry_url {
        config.registry_url = url.clone();
    }

    config.validate().context("Invalid configuration")?;
    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}

async fn run(cli: Cli) -> Result<ExitClass> {
    let config = load_config(&cli)?;
    let manager = PackageManager::from_config(&config)?;

    manager.layout().ensure_installed_dir().with_context(|| {
        format!(
            "Failed to create installed directory: {}",
            config.installed_dir.display()
        )
    })?;

    match cli.command {
        Some(Command::List { json }) => commands::list(&manager, json),
        Some(Command::Fetch(args)) => commands::fetch(&manager, &args.identifier()?).await,
        Some(Command::Install(args)) => commands::install(&manager, &args.identifier()?).await,
        Some(Command::Build(args)) => commands::build(&manager, &args.identifier()?).await,
        Some(Command::Menu) | None => {
            // Piped input past the last answer stays in Stdin's buffer
            let stdin = io::stdin();
            let choice = menu::prompt(&mut stdin.lock(), &mut io::stdout())?;
            commands::run_choice(&manager, choice).await
        }
    }
}

/// Exit class for a failed run
fn classify(err: &anyhow::Error) -> ExitClass {
    if let Some(package_err) = err.downcast_ref::<PackageError>() {
        return package_err.exit_class();
    }
    if err.downcast_ref::<IdentifierError>().is_some() {
        return ExitClass::InvalidInput;
    }
    ExitClass::Internal
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    let class = match run(cli).await {
        Ok(class) => class,
        Err(err) => {
            let class = classify(&err);
            tracing::debug!(?class, "Command failed");
            eprintln!("Error: {err:#}");
            class
        }
    };

    ExitCode::from(class.code())
}
