//! hpctk: resolve compiler toolkits into build environments.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "hpctk", version, about = "Compiler toolkit environment resolver")]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare a toolkit and print the resulting environment
    Prepare {
        /// Toolkit declaration (TOML)
        #[arg(long)]
        config: PathBuf,
        /// Root of the module tree
        #[arg(long)]
        modules: PathBuf,
        /// Only load modules; print nothing
        #[arg(long)]
        only_modules: bool,
        /// Comma-separated variables not to set directly
        #[arg(long)]
        exclude: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Shell)]
        format: OutputFormat,
        /// CPU information file (default: /proc/cpuinfo)
        #[arg(long)]
        cpuinfo: Option<PathBuf>,
    },
    /// Print the module each declared dependency resolves to
    Resolve {
        /// Toolkit declaration (TOML)
        #[arg(long)]
        config: PathBuf,
        /// Root of the module tree
        #[arg(long)]
        modules: PathBuf,
    },
    /// Show the detected CPU vendor and its architecture flag
    Arch {
        /// CPU information file (default: /proc/cpuinfo)
        #[arg(long)]
        cpuinfo: Option<PathBuf>,
    },
    /// List available versions of a module
    Avail {
        /// Module name
        name: String,
        /// Root of the module tree
        #[arg(long)]
        modules: PathBuf,
        /// Only versions ending with this suffix
        #[arg(long, default_value = "")]
        suffix: String,
    },
}

/// How `prepare` prints the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `export KEY='value'` lines
    Shell,
    /// One JSON object
    Json,
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Prepare {
            config,
            modules,
            only_modules,
            exclude,
            format,
            cpuinfo,
        } => {
            let args = commands::prepare::PrepareArgs {
                config,
                modules,
                only_modules,
                exclude,
                format,
                cpuinfo,
            };
            let out = commands::prepare::run(&args)?;
            print!("{out}");
            Ok(())
        }

        Commands::Resolve { config, modules } => {
            for line in commands::resolve::run(&config, &modules)? {
                println!("{line}");
            }
            Ok(())
        }

        Commands::Arch { cpuinfo } => {
            println!("{}", commands::arch::run(cpuinfo.as_deref())?);
            Ok(())
        }

        Commands::Avail {
            name,
            modules,
            suffix,
        } => {
            let versions = commands::avail::run(&modules, &name, &suffix)?;
            if versions.is_empty() {
                anyhow::bail!("no versions of '{name}' match suffix '{suffix}'");
            }
            for version in versions {
                println!("{name}/{version}");
            }
            Ok(())
        }
    }
}
