//! `frankenstyle`: inspect a site's component registry and maintain its
//! alternative cache artifact.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "frankenstyle", version, about = "Component registry admin tool")]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "FRANKENSTYLE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Site root; overrides `dirroot` from the configuration file
    #[arg(long, global = true, value_name = "DIR")]
    dirroot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate the alternative component cache file from a fresh scan
    Build {
        /// Write here instead of `alternative_component_cache`
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Check the alternative component cache file against a fresh scan
    Verify {
        /// Check this file instead of `alternative_component_cache`
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// List plugin types, or the plugins of one type
    List {
        plugintype: Option<String>,

        /// Print JSON instead of tab separated lines
        #[arg(long)]
        json: bool,
    },
    /// Resolve a class name to the file defining it
    Resolve { classname: String },
    /// Normalise a component name and locate its directory
    Component { name: String },
    /// Print the digest over core and every plugin version
    VersionsHash,
}

fn main() -> anyhow::Result<()> {
    frankenstyle_core::tracing::init_tracing();
    let args = Args::parse();
    let config = commands::load_config(args.config.as_deref(), args.dirroot.as_deref())?;

    let output = match args.command {
        Command::Build { output } => commands::build(&config, output.as_deref())?,
        Command::Verify { file } => commands::verify(&config, file.as_deref())?,
        Command::List { plugintype, json } => commands::list(&config, plugintype.as_deref(), json)?,
        Command::Resolve { classname } => commands::resolve(&config, &classname)?,
        Command::Component { name } => commands::component(&config, &name)?,
        Command::VersionsHash => commands::versions_hash(&config)?,
    };
    print!("{output}");
    Ok(())
}
