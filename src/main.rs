use anyhow::Result;
use clap::Parser;
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use tagsite::build::build_site;
use tagsite::config::Config;

/// Builds a static site from tagged markdown documents.
#[derive(Parser)]
#[command(name = "tagsite", version, about)]
struct Cli {
    /// Path to the project file. Defaults to the nearest `site.yaml` in the
    /// current directory or its parents.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory, overriding the project file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }

    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_project_file(path)?,
            None => Config::from_directory(&std::env::current_dir()?)?,
        };
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = SimpleLogger::new().with_level(cli.log_level()).init() {
        eprintln!("Initializing logger: {}", e);
    }

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config()?;
    let summary = build_site(&config)?;
    println!(
        "Site built successfully with {} posts and {} tags",
        summary.posts, summary.tags
    );
    Ok(())
}
