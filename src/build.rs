//! Convergence controller.
//!
//! Drives the compiler and its helper tools until the document stops
//! changing.
//!
//! # Stages
//!
//! ```text
//! Init ──► FirstPass ──► IndexCheck ──► BibCheck ──► RerunLoop ──► Done
//!              │           │   ▲          │   ▲        │   ▲
//!              │           ▼   │          ▼   │        └───┘
//!              │        makeindex +    bibtex +     one pass per
//!              │        one pass       one pass     rerun trigger
//!              │
//!              └──────────── any stage ──────────────► Fatal
//! ```
//!
//! - `Init`: snapshot citations, the table of contents and glossary outputs
//! - `IndexCheck`: makeindex for each changed glossary; one more pass if
//!   any ran or the table of contents changed
//! - `BibCheck`: compared against the `Init` citation baseline
//! - `RerunLoop`: bounded by `[build.max_runs]`; running out of passes is a
//!   warning, not an error
//!
//! Index regeneration precedes the bibliography check, which precedes the
//! rerun loop: each tool reads the aux file written by the pass right
//! before it.

use crate::{
    config::BuildConfig,
    detect::{self, CompileError, PassOutput, triggers::ErrorKind},
    log,
    project::Project,
    state::{self, CitationCounter, Glossary, GlossaryRegistry, Snapshot},
    toolchain::{self, ToolError, Toolchain},
};
use std::{collections::BTreeMap, path::PathBuf};
use thiserror::Error;

/// Conditions that end a build early.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("compiler reported {count} error(s) in pass {pass}", count = .errors.len())]
    Compile { pass: usize, errors: Vec<CompileError> },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("`{0}` was not written by the compiler")]
    MissingArtifact(PathBuf),
}

/// Position of the controller in the pass sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    FirstPass,
    IndexCheck,
    BibCheck,
    RerunLoop,
    Done,
    Fatal,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Compiler passes run.
    pub passes: usize,
    /// `false` when the pass limit was hit with references still unresolved.
    pub converged: bool,
    /// Glossaries regenerated by makeindex, in order.
    pub indexed: Vec<String>,
    /// bibtex ran.
    pub bibliography: bool,
    /// Passes whose output contained errors (only with exit-on-error off).
    pub failed_passes: usize,
}

/// State captured before the first pass.
struct Baseline {
    citations: CitationCounter,
    toc: Snapshot,
    glossaries: BTreeMap<String, Snapshot>,
}

/// One document build.
///
/// Owns every piece of mutable state for the lifetime of the build; nothing
/// is kept between builds.
pub struct Maker<'a, T: Toolchain> {
    project: &'a Project,
    settings: &'a BuildConfig,
    tools: T,
    stage: Stage,
    output: PassOutput,
    glossaries: GlossaryRegistry,
    report: BuildReport,
}

impl<'a, T: Toolchain> Maker<'a, T> {
    pub fn new(project: &'a Project, settings: &'a BuildConfig, tools: T) -> Self {
        Self {
            project,
            settings,
            tools,
            stage: Stage::Init,
            output: PassOutput::default(),
            glossaries: GlossaryRegistry::default(),
            report: BuildReport::default(),
        }
    }

    #[cfg(test)]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[cfg(test)]
    /// Compiler passes run so far.
    pub const fn passes(&self) -> usize {
        self.report.passes
    }

    #[cfg(test)]
    pub const fn tools(&self) -> &T {
        &self.tools
    }

    /// Run the build to completion.
    ///
    /// # Errors
    /// Fails when a tool cannot be launched, when the compiler reports an
    /// error under exit-on-error, or when a pass leaves no aux file.
    pub fn run(&mut self) -> Result<BuildReport, BuildError> {
        let result = self.drive();
        if result.is_err() {
            self.stage = Stage::Fatal;
        }
        result
    }

    fn drive(&mut self) -> Result<BuildReport, BuildError> {
        self.stage = Stage::Init;
        let baseline = self.capture_baseline();

        self.stage = Stage::FirstPass;
        while self.stage != Stage::Done {
            self.stage = self.step(&baseline)?;
        }

        Ok(self.report.clone())
    }

    /// Execute the current stage and return the next one.
    fn step(&mut self, baseline: &Baseline) -> Result<Stage, BuildError> {
        match self.stage {
            Stage::FirstPass => {
                self.pass()?;
                Ok(Stage::IndexCheck)
            }
            Stage::IndexCheck => {
                let indexed = self.run_index_tools(&baseline.glossaries)?;
                if indexed || detect::toc_changed(self.project, &baseline.toc) {
                    self.pass()?;
                }
                Ok(Stage::BibCheck)
            }
            Stage::BibCheck => {
                let sources = detect::bibliography_sources(self.project);
                if let Some(reason) = detect::bibliography_needed(
                    self.project,
                    &sources,
                    &self.output,
                    &baseline.citations,
                ) {
                    log!("bibtex"; "{reason}");
                    self.run_bibliography(&sources)?;
                    self.pass()?;
                }
                Ok(Stage::RerunLoop)
            }
            Stage::RerunLoop => {
                let trigger = detect::rerun_needed(&self.output);
                match trigger {
                    Some(trigger) if self.report.passes < self.settings.max_runs => {
                        log!("latex"; "rerun: {trigger}");
                        self.pass()?;
                        Ok(Stage::RerunLoop)
                    }
                    Some(trigger) => {
                        log!(
                            "warn";
                            "stopped after {} passes, still: {trigger}",
                            self.report.passes
                        );
                        Ok(Stage::Done)
                    }
                    None => {
                        self.report.converged = true;
                        Ok(Stage::Done)
                    }
                }
            }
            Stage::Init | Stage::Done | Stage::Fatal => Ok(Stage::Done),
        }
    }

    fn capture_baseline(&mut self) -> Baseline {
        let citations = state::capture_citations(self.project);
        state::capture_glossaries(self.project, &mut self.glossaries);

        Baseline {
            citations,
            toc: Snapshot::capture(&self.project.toc()),
            glossaries: state::capture_glossary_outputs(self.project, &self.glossaries),
        }
    }

    /// One compiler pass: run, scan for errors, refresh the glossary registry.
    fn pass(&mut self) -> Result<(), BuildError> {
        self.output = self.tools.compile(self.project)?;
        self.report.passes += 1;

        let errors = self.output.errors();
        if !errors.is_empty() {
            self.report_errors(&errors);
            if self.settings.exit_on_error {
                return Err(BuildError::Compile {
                    pass: self.report.passes,
                    errors,
                });
            }
            self.report.failed_passes += 1;
        }

        if !state::capture_glossaries(self.project, &mut self.glossaries) {
            return Err(BuildError::MissingArtifact(self.project.aux()));
        }
        Ok(())
    }

    fn report_errors(&self, errors: &[CompileError]) {
        log!("error"; "errors occurred:");
        for error in errors {
            match error.kind {
                ErrorKind::NoPages => log!("error"; "no pages of output"),
                _ => log!("error"; "{}", error.message),
            }
        }
        log!("error"; "See \"{}\" for details.", self.project.file_name("log"));
        if self.settings.exit_on_error {
            log!("error"; "exiting...");
        }
    }

    /// Run makeindex for every glossary that needs it. Returns whether any ran.
    fn run_index_tools(
        &mut self,
        prior: &BTreeMap<String, Snapshot>,
    ) -> Result<bool, BuildError> {
        let glossaries: Vec<(String, Glossary)> = self
            .glossaries
            .iter()
            .map(|(name, glossary)| (name.to_owned(), glossary.clone()))
            .collect();

        let mut ran = false;
        for (name, glossary) in glossaries {
            let Some(reason) =
                detect::index_needed(self.project, &self.output, &name, &glossary, prior)
            else {
                continue;
            };

            log!("makeindex"; "{name}: {reason}");
            let result = self.tools.index(self.project, &name, &glossary);
            tolerate(result)?;
            self.report.indexed.push(name);
            ran = true;
        }
        Ok(ran)
    }

    /// Run bibtex and save the databases for the next build's comparison.
    fn run_bibliography(&mut self, sources: &[String]) -> Result<(), BuildError> {
        let result = self.tools.bibliography(self.project);
        tolerate(result)?;
        toolchain::persist_bib_sources(self.project, sources)?;
        self.report.bibliography = true;
        Ok(())
    }
}

/// bibtex and makeindex exit non-zero on mere warnings, so a non-zero exit
/// is only reported. Launch failures are fatal.
fn tolerate(result: Result<(), ToolError>) -> Result<(), BuildError> {
    match result {
        Ok(()) => Ok(()),
        Err(err @ ToolError::Failed { .. }) => {
            log!("warn"; "{err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

// ============================================================================
// Tests
// ============================================================================
