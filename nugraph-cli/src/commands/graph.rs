use anyhow::Result;
use clap::Args;
use nugraph_core::registry::RegistryClient;
use nugraph_core::resolve::{self, DependencyGraph, PackageRef};
use nugraph_core::{NugraphConfig, console, render};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Package id, e.g. Newtonsoft.Json.Bson
    pub id: String,

    /// Exact package version, e.g. 1.0.3
    pub version: String,

    /// Maximum recursion depth below the root package
    #[arg(long, default_value_t = 1)]
    pub depth: u32,

    /// Path of the PlantUML file to write
    #[arg(long, default_value = "graph_dependencies.puml")]
    pub output: PathBuf,

    /// Also render a PNG into this directory via PlantUML
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// Path to plantuml.jar (overrides NUGRAPH_PLANTUML_JAR)
    #[arg(long)]
    pub plantuml_jar: Option<PathBuf>,

    /// Print the resolved graph as JSON instead of writing a diagram
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct GraphView {
    root: String,
    packages: Vec<PackageView>,
    failures: Vec<FailureView>,
}

#[derive(Serialize)]
struct PackageView {
    id: String,
    version: String,
    dependencies: Vec<String>,
    authors: Vec<String>,
}

#[derive(Serialize)]
struct FailureView {
    package: String,
    kind: String,
}

pub async fn run(args: GraphArgs, config: &NugraphConfig) -> Result<()> {
    if !args.json {
        console::header("graph", env!("CARGO_PKG_VERSION"));
    }

    let root = PackageRef::new(args.id, args.version);
    let client = RegistryClient::new(config);

    if !args.json {
        console::step(&format!("Resolving {} to depth {}", root, args.depth));
    }

    let started = Instant::now();
    let graph = resolve::resolve(&client, root, args.depth).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&graph_view(&graph))?);
        return Ok(());
    }

    console::step_with_count("Resolved packages", graph.packages.len());

    if !graph.failures.is_empty() {
        let count = graph.failures.len();
        let noun = if count == 1 { "package" } else { "packages" };
        console::warn(&format!("{} {} could not be resolved", count, noun));
    }

    render::write_plantuml(&graph, &args.output)?;
    console::info(&format!("Diagram written to {}", args.output.display()));

    if let Some(png_dir) = &args.png {
        let jar = args
            .plantuml_jar
            .clone()
            .or_else(|| config.plantuml_jar.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no plantuml.jar configured; pass --plantuml-jar or set NUGRAPH_PLANTUML_JAR"
                )
            })?;

        render::rasterize(&jar, &args.output, png_dir)?;
        console::info(&format!("PNG written to {}", png_dir.display()));
    }

    console::summary(graph.packages.len(), started.elapsed().as_secs_f32());

    Ok(())
}

fn graph_view(graph: &DependencyGraph) -> impl Serialize {
    let packages = graph
        .packages
        .iter()
        .map(|(package, record)| PackageView {
            id: package.id.clone(),
            version: package.version.clone(),
            dependencies: record.dependencies.iter().map(|d| d.to_string()).collect(),
            authors: record.authors.iter().cloned().collect(),
        })
        .collect();

    let failures = graph
        .failures
        .iter()
        .map(|(package, kind)| FailureView {
            package: package.to_string(),
            kind: kind.to_string(),
        })
        .collect();

    GraphView {
        root: graph.root.to_string(),
        packages,
        failures,
    }
}
