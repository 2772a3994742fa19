//! texmk - Run LaTeX, bibtex and makeindex until the document converges.

mod build;
mod citecheck;
mod clean;
mod cli;
mod config;
mod detect;
mod logger;
mod preview;
mod project;
mod state;
mod toolchain;
mod utils;

use anyhow::{Result, bail};
use build::Maker;
use clap::Parser;
use clean::Listing;
use cli::Cli;
use config::MakeConfig;
use project::Project;
use toolchain::ProcessToolchain;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let project = Project::resolve(&config.root, cli.filename.as_deref())?;
    if !project.source().is_file() {
        bail!("`{}` not found", project.source().display());
    }

    make(&config, &project)
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<MakeConfig> {
    let config = MakeConfig::load(cli)?;
    logger::set_quiet(config.build.quiet);
    if config.config_path.is_file() {
        log!("config"; "using {}", config.config_path.display());
    }
    config.validate()?;
    Ok(config)
}

/// Build the document, then run the requested post-build steps.
fn make(config: &MakeConfig, project: &Project) -> Result<()> {
    let listing = if config.build.clean {
        Listing::capture(project.root())?
    } else {
        Listing::default()
    };

    let mut maker = Maker::new(project, &config.build, ProcessToolchain::new(config));
    let report = maker.run()?;

    if config.build.check_cite {
        citecheck::check(project)?;
    }

    let document = project.output(config.build.pdf);
    if config.build.clean {
        listing.remove_new(project, &document)?;
    }
    if config.build.preview {
        preview::open_document(&document);
    }

    if report.failed_passes > 0 {
        log!("warn"; "{} pass(es) reported errors", report.failed_passes);
    }
    if !report.indexed.is_empty() {
        log!("done"; "regenerated: {}", report.indexed.join(", "));
    }
    log!(
        "done";
        "{} after {} pass(es){}{}",
        document.display(),
        report.passes,
        if report.bibliography { ", bibliography updated" } else { "" },
        if report.converged { "" } else { ", references unresolved" }
    );
    Ok(())
}
