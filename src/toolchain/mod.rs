//! Tool invokers.
//!
//! The controller only talks to the [`Toolchain`] trait. [`ProcessToolchain`]
//! runs the real binaries; tests substitute a scripted implementation that
//! writes fabricated artifacts.

mod process;

pub use process::ProcessToolchain;

use crate::{detect::PassOutput, project::Project, state::Glossary};
use std::{fs, io, path::PathBuf, process::ExitStatus};
use thiserror::Error;

/// Errors raised while running an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("could not run command `{tool}`, is it installed and on your PATH?")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("`{tool}` exited with {status}")]
    Failed { tool: String, status: ExitStatus },

    #[error("empty command")]
    EmptyCommand,

    #[error("IO error when copying `{0}`")]
    Io(PathBuf, #[source] io::Error),
}

/// The three external tools a build may invoke.
///
/// Every call blocks until the tool has exited.
pub trait Toolchain {
    /// Run one compiler pass and return its log.
    fn compile(&mut self, project: &Project) -> Result<PassOutput, ToolError>;

    /// Run the bibliography tool on the project's aux file.
    fn bibliography(&mut self, project: &Project) -> Result<(), ToolError>;

    /// Regenerate the sorted input file of one glossary.
    fn index(
        &mut self,
        project: &Project,
        name: &str,
        glossary: &Glossary,
    ) -> Result<(), ToolError>;
}

/// Save `<src>.bib` as `<src>.bib.old` for every database, so the next
/// build can tell whether it was edited.
pub fn persist_bib_sources(project: &Project, sources: &[String]) -> Result<(), ToolError> {
    for source in sources {
        let from = project.path(format!("{source}.bib"));
        let to = project.path(format!("{source}.bib.old"));
        fs::copy(&from, &to).map_err(|e| ToolError::Io(from.clone(), e))?;
    }
    Ok(())
}
