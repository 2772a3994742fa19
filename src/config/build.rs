//! `[build]` section configuration.
//!
//! Contains the convergence policy and the optional post-build steps.

use super::defaults;
use educe::Educe;
use serde::Deserialize;

/// `[build]` section in texmk.toml.
///
/// # Example
/// ```toml
/// [build]
/// max_runs = 5          # Compiler passes before giving up on references
/// exit_on_error = true  # Stop at the first LaTeX error
/// pdf = true            # pdflatex instead of latex
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Maximum number of compiler passes, including the mandatory ones.
    #[serde(default = "defaults::build::max_runs")]
    #[educe(Default = defaults::build::max_runs())]
    pub max_runs: usize,

    /// Stop the build when the compiler reports an error.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub exit_on_error: bool,

    /// Produce PDF with `[latex].pdf`; DVI with `[latex].dvi` otherwise.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub pdf: bool,

    /// Remove files created during the build, except the document.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Open the document in the system viewer afterwards.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub preview: bool,

    /// Report bibliography entries that are never cited.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub check_cite: bool,

    /// Only print warnings and errors.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub quiet: bool,
}
