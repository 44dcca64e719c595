use anyhow::Result;
use clap::Args;
use nugraph_core::registry::RegistryClient;
use nugraph_core::resolve::{self, PackageRef};
use nugraph_core::{NugraphConfig, console};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct AuthorsArgs {
    /// Package id, e.g. Newtonsoft.Json.Bson
    pub id: String,

    /// Exact package version, e.g. 1.0.3
    pub version: String,

    /// Maximum recursion depth below the root package
    #[arg(long, default_value_t = 1)]
    pub depth: u32,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct AuthorsEntry {
    package: String,
    authors: Vec<String>,
}

pub async fn run(args: AuthorsArgs, config: &NugraphConfig) -> Result<()> {
    if !args.json {
        console::header("authors", env!("CARGO_PKG_VERSION"));
    }

    let root = PackageRef::new(args.id, args.version);
    let client = RegistryClient::new(config);
    let graph = resolve::resolve(&client, root, args.depth).await;

    if args.json {
        let entries: Vec<AuthorsEntry> = graph
            .packages
            .iter()
            .map(|(package, record)| AuthorsEntry {
                package: package.to_string(),
                authors: record.authors.iter().cloned().collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if graph.packages.is_empty() {
        console::info("No packages resolved");
        return Ok(());
    }

    for (package, record) in &graph.packages {
        if record.authors.is_empty() {
            println!("{}: no author information", package);
        } else {
            let authors: Vec<&str> = record.authors.iter().map(|a| a.as_str()).collect();
            println!("{}: {}", package, authors.join(", "));
        }
    }

    Ok(())
}
