//! Command-line interface definitions.
//!
//! Defines all CLI arguments using clap.

use clap::Parser;
use std::path::PathBuf;

/// Run LaTeX, bibtex and makeindex as often as needed to produce a
/// complete document.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input file, with or without `.tex`. `.texlipse` reads the main file
    /// from a Texlipse project. If omitted the root directory is searched
    /// for a single `*.tex` file.
    pub filename: Option<String>,

    /// Working directory for all tools (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name, relative to root (default: texmk.toml)
    #[arg(short = 'C', long, default_value = "texmk.toml")]
    pub config: PathBuf,

    /// Don't print status messages to stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Don't exit if an error occurs
    #[arg(short = 'n', long = "no-exit")]
    pub no_exit: bool,

    /// Try to open a preview of the generated document
    #[arg(short, long)]
    pub preview: bool,

    /// Clean all temporary files after converting
    #[arg(short, long)]
    pub clean: bool,

    /// Use `latex` instead of `pdflatex`
    #[arg(long)]
    pub dvi: bool,

    /// Check the bibtex file for uncited entries
    #[arg(long = "check-cite")]
    pub check_cite: bool,

    /// Maximum number of compiler passes
    #[arg(long = "max-runs")]
    pub max_runs: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["texmk"]);
        assert!(cli.filename.is_none());
        assert_eq!(cli.config, PathBuf::from("texmk.toml"));
        assert!(!cli.quiet && !cli.no_exit && !cli.dvi);
        assert!(cli.max_runs.is_none());
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "texmk",
            "-qnpc",
            "--dvi",
            "--check-cite",
            "--max-runs",
            "6",
            "thesis.tex",
        ]);
        assert_eq!(cli.filename.as_deref(), Some("thesis.tex"));
        assert!(cli.quiet && cli.no_exit && cli.preview && cli.clean);
        assert!(cli.dvi && cli.check_cite);
        assert_eq!(cli.max_runs, Some(6));
    }

    #[test]
    fn test_command_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
