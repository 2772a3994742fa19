//! `[latex]`, `[bibtex]` and `[makeindex]` section configuration.
//!
//! Each command is a list: the binary followed by fixed leading arguments.

use super::defaults;
use educe::Educe;
use serde::Deserialize;

/// `[latex]` section in texmk.toml - the primary compiler.
///
/// # Example
/// ```toml
/// [latex]
/// pdf = ["lualatex"]
/// flags = ["-interaction=nonstopmode", "-shell-escape"]
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct LatexConfig {
    /// Compiler producing PDF output.
    #[serde(default = "defaults::latex::pdf")]
    #[educe(Default = defaults::latex::pdf())]
    pub pdf: Vec<String>,

    /// Compiler producing DVI output (`--dvi`).
    #[serde(default = "defaults::latex::dvi")]
    #[educe(Default = defaults::latex::dvi())]
    pub dvi: Vec<String>,

    /// Flags passed before the source file. Must keep the compiler
    /// non-interactive.
    #[serde(default = "defaults::latex::flags")]
    #[educe(Default = defaults::latex::flags())]
    pub flags: Vec<String>,
}

/// `[bibtex]` section - bibliography tool (`biber` works too).
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BibtexConfig {
    #[serde(default = "defaults::bibtex::command")]
    #[educe(Default = defaults::bibtex::command())]
    pub command: Vec<String>,
}

/// `[makeindex]` section - index and glossary sorter.
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MakeindexConfig {
    #[serde(default = "defaults::makeindex::command")]
    #[educe(Default = defaults::makeindex::command())]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::super::MakeConfig;

    #[test]
    fn test_tool_sections() {
        let config: MakeConfig = toml::from_str(
            r#"
            [latex]
            pdf = ["lualatex", "--output-format=pdf"]
            flags = ["-interaction=batchmode"]

            [bibtex]
            command = ["biber"]
        "#,
        )
        .unwrap();

        assert_eq!(config.latex.pdf, vec!["lualatex", "--output-format=pdf"]);
        assert_eq!(config.latex.dvi, vec!["latex"]);
        assert_eq!(config.latex.flags, vec!["-interaction=batchmode"]);
        assert_eq!(config.bibtex.command, vec!["biber"]);
        assert_eq!(config.makeindex.command, vec!["makeindex"]);
    }

    #[test]
    fn test_tool_defaults() {
        let config: MakeConfig = toml::from_str("").unwrap();

        assert_eq!(config.latex.pdf, vec!["pdflatex"]);
        assert_eq!(
            config.latex.flags,
            vec!["-interaction=nonstopmode", "-shell-escape", "--synctex=1"]
        );
        assert_eq!(config.bibtex.command, vec!["bibtex"]);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let result: Result<MakeConfig, _> = toml::from_str(
            r#"
            [makeindex]
            style = "custom.ist"
        "#,
        );
        assert!(result.is_err());
    }
}
