use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod build;
mod commands;
mod config;
mod data;
mod directives;
mod logger;
mod util;

#[derive(Parser)]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: SitepressCommand,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the site configuration file
    #[arg(short, long, default_value = "config.json")]
    config_file: PathBuf,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "5500")]
    port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// The path to the site configuration file
    #[arg(short, long, default_value = "config.json")]
    config_file: PathBuf,

    /// Whether to watch for changes and rebuild automatically
    #[arg(short, long, default_value = "true")]
    watch: bool,
}

#[derive(Subcommand)]
enum SitepressCommand {
    /// Build the site once
    Build(BuildArgs),

    /// Build the site, then serve it locally with live reload
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    match args.command {
        SitepressCommand::Build(args) => {
            commands::build::run(&args)?;
        }
        SitepressCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
    }

    Ok(())
}
