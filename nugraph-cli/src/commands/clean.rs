use anyhow::Result;
use clap::Args;
use nugraph_core::{NugraphConfig, console};
use std::fs;

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Show what would be removed without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: CleanArgs, config: &NugraphConfig) -> Result<()> {
    console::header("clean", env!("CARGO_PKG_VERSION"));

    let packages_dir = config.packages_dir();

    if !packages_dir.is_dir() {
        console::info("Cache is already empty");
        return Ok(());
    }

    let count = fs::read_dir(&packages_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .count();

    if args.dry_run {
        let noun = if count == 1 { "archive" } else { "archives" };
        console::info(&format!(
            "Would remove {} cached {} from {}",
            count,
            noun,
            packages_dir.display()
        ));
        return Ok(());
    }

    fs::remove_dir_all(&packages_dir)?;

    let noun = if count == 1 { "archive" } else { "archives" };
    console::info(&format!("Removed {} cached {}", count, noun));

    Ok(())
}
