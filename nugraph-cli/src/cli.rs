use crate::commands;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "nugraph",
    about = "NuGet dependency graph visualizer",
    version,
    color = clap::ColorChoice::Auto
)]
pub struct Cli {
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a package's dependency closure and emit a PlantUML diagram
    Graph(commands::graph::GraphArgs),
    /// List the declared authors of every package in the closure
    Authors(commands::authors::AuthorsArgs),
    /// Remove cached package archives to free disk space
    Clean(commands::clean::CleanArgs),
}
