//! Command implementations shared by subcommands and the interactive menu
//!
//! Each command prints status lines to stdout and returns the exit class of
//! its outcome. Fatal errors propagate to `main`.

use anyhow::Result;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use ngpm_core::package::{ExitClass, PackageIdentifier, PackageManager, Registry};

use crate::menu::MenuChoice;

/// Table row for listed packages
#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Location")]
    location: String,
}

pub fn list<R: Registry>(manager: &PackageManager<R>, json_output: bool) -> Result<ExitClass> {
    let packages = manager.list()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(ExitClass::Success);
    }

    if packages.is_empty() {
        println!(
            "No packages found in {}.",
            manager.layout().packages_dir().display()
        );
        return Ok(ExitClass::Success);
    }

    let table_rows: Vec<PackageRow> = packages
        .into_iter()
        .map(|pkg| PackageRow {
            name: pkg.name,
            version: pkg.version,
            location: pkg.path.display().to_string(),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");

    Ok(ExitClass::Success)
}

pub async fn fetch<R: Registry>(
    manager: &PackageManager<R>,
    id: &PackageIdentifier,
) -> Result<ExitClass> {
    let outcome = manager.fetch(id).await?;
    println!("{outcome}");
    Ok(outcome.exit_class())
}

/// Fetch, then install; the exit class is the install step's
pub async fn install<R: Registry>(
    manager: &PackageManager<R>,
    id: &PackageIdentifier,
) -> Result<ExitClass> {
    let fetched = manager.fetch(id).await?;
    println!("{fetched}");

    let installed = manager.install(id)?;
    println!("{installed}");
    Ok(installed.exit_class())
}

pub async fn build<R: Registry>(
    manager: &PackageManager<R>,
    id: &PackageIdentifier,
) -> Result<ExitClass> {
    let outcome = manager.build(id).await?;
    println!("{outcome}");
    Ok(outcome.exit_class())
}

pub async fn run_choice<R: Registry>(
    manager: &PackageManager<R>,
    choice: MenuChoice,
) -> Result<ExitClass> {
    match choice {
        MenuChoice::List => list(manager, false),
        MenuChoice::Install { name, version } => {
            install(manager, &PackageIdentifier::new(name, version)?).await
        }
        MenuChoice::Build { name, version } => {
            build(manager, &PackageIdentifier::new(name, version)?).await
        }
        MenuChoice::Invalid(selection) => {
            tracing::debug!("Invalid menu selection: {:?}", selection);
            println!("Invalid option.");
            Ok(ExitClass::Success)
        }
    }
}
