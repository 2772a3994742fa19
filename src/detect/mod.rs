//! Change detectors.
//!
//! Each detector answers "must tool X run again?" from the latest compiler
//! output, the files on disk and a snapshot taken before the pass. A
//! positive answer carries the reason, which the controller logs.
//!
//! Detectors never fail: a missing file is an input, not an error.

pub mod triggers;

use crate::{
    log,
    project::Project,
    state::{self, CitationCounter, Glossary, Snapshot},
};
use std::{collections::BTreeMap, fmt, fs};
use triggers::{ERROR_KINDS, ERROR_SIGNATURES, ErrorKind, RERUN_TRIGGERS, TriggerKind};

// ============================================================================
// Pass Output
// ============================================================================

/// Combined log of the most recent compiler pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOutput(String);

impl PassOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Decode raw log bytes, replacing invalid UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fatal errors reported in this output, in order of appearance.
    pub fn errors(&self) -> Vec<CompileError> {
        ERROR_SIGNATURES
            .captures_iter(&self.0)
            .filter_map(|caps| {
                let (index, group) = caps
                    .iter()
                    .enumerate()
                    .skip(1)
                    .find_map(|(i, m)| m.map(|m| (i, m)))?;
                let message = group
                    .as_str()
                    .lines()
                    .map(|line| line.replace('\r', "").trim().to_owned())
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(CompileError {
                    kind: ERROR_KINDS[index - 1],
                    message,
                })
            })
            .collect()
    }
}

/// One error found in compiler output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub kind: ErrorKind,
    /// Error line, followed by the `l.<num>` context line when present.
    pub message: String,
}

// ============================================================================
// Rerun
// ============================================================================

/// The first rerun trigger found in `output`, if any.
pub fn rerun_needed(output: &PassOutput) -> Option<TriggerKind> {
    RERUN_TRIGGERS
        .iter()
        .find(|trigger| trigger.pattern.is_match(output.as_str()))
        .map(|trigger| trigger.kind)
}

// ============================================================================
// Table of Contents
// ============================================================================

/// The table of contents exists and differs from its pre-pass snapshot.
pub fn toc_changed(project: &Project, prior: &Snapshot) -> bool {
    match Snapshot::capture(&project.toc()) {
        Snapshot::Absent => false,
        current => current != *prior,
    }
}

// ============================================================================
// Index / Glossary
// ============================================================================

/// Why makeindex must run for a glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexReason {
    /// LaTeX reported the sorted input file as missing.
    InputMissing,
    /// LaTeX did not write the raw entries file.
    OutputMissing,
    /// The raw entries changed during the pass.
    OutputChanged,
}

impl fmt::Display for IndexReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InputMissing => "input file missing",
            Self::OutputMissing => "output file missing",
            Self::OutputChanged => "entries changed",
        })
    }
}

/// Decide whether the glossary `name` must be regenerated.
///
/// `prior` holds the output-file snapshots taken before the pass; a
/// glossary missing from it counts as changed.
pub fn index_needed(
    project: &Project,
    output: &PassOutput,
    name: &str,
    glossary: &Glossary,
    prior: &BTreeMap<String, Snapshot>,
) -> Option<IndexReason> {
    let input = project.file_name(&glossary.input_ext);
    if triggers::missing_file(&input).is_match(output.as_str()) {
        return Some(IndexReason::InputMissing);
    }

    let current = Snapshot::capture(&project.artifact(&glossary.output_ext));
    if !current.is_present() {
        return Some(IndexReason::OutputMissing);
    }

    match prior.get(name) {
        Some(before) if *before == current => None,
        _ => Some(IndexReason::OutputChanged),
    }
}

// ============================================================================
// Bibliography
// ============================================================================

/// Why bibtex must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BibReason {
    /// LaTeX could not find `<name>.bbl`.
    MissingBbl,
    /// LaTeX reported an undefined citation.
    UndefinedCitation,
    /// Citation counts differ from the pre-build baseline.
    CitationsChanged,
    /// A database differs from the copy saved after the last bibtex run.
    SourceChanged(String),
}

impl fmt::Display for BibReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBbl => f.write_str("bibliography missing"),
            Self::UndefinedCitation => f.write_str("undefined citations"),
            Self::CitationsChanged => f.write_str("citations changed"),
            Self::SourceChanged(name) => write!(f, "`{name}.bib` changed"),
        }
    }
}

/// Base names of the bibliography databases that exist on disk.
///
/// Databases come from `\bibdata` in the main aux file. Without it the
/// document does not use bibtex (e.g. biblatex with biber) and the list is
/// empty. A database named by `\bibdata` but missing on disk is reported
/// and skipped.
pub fn bibliography_sources(project: &Project) -> Vec<String> {
    Snapshot::capture(&project.aux())
        .text()
        .map(|text| state::aux::bib_sources(&text))
        .unwrap_or_default()
        .into_iter()
        .filter(|source| {
            let exists = project.path(format!("{source}.bib")).is_file();
            if !exists {
                log!("warn"; "could not find `{source}.bib`, skipping bibliography");
            }
            exists
        })
        .collect()
}

/// Decide whether bibtex must run.
///
/// `sources` comes from [`bibliography_sources`]; with none, bibtex never
/// runs. Otherwise the signals are checked in order and the first one found
/// is returned; any of them alone is enough.
pub fn bibliography_needed(
    project: &Project,
    sources: &[String],
    output: &PassOutput,
    baseline: &CitationCounter,
) -> Option<BibReason> {
    if sources.is_empty() {
        return None;
    }

    if triggers::missing_bbl(project.name()).is_match(output.as_str()) {
        return Some(BibReason::MissingBbl);
    }
    if triggers::UNDEFINED_CITATION.is_match(output.as_str()) {
        return Some(BibReason::UndefinedCitation);
    }
    if state::capture_citations(project) != *baseline {
        return Some(BibReason::CitationsChanged);
    }

    sources
        .iter()
        .find(|source| source_changed(project, source))
        .cloned()
        .map(BibReason::SourceChanged)
}

/// `<source>.bib` differs byte for byte from `<source>.bib.old`.
///
/// False when no saved copy exists yet.
fn source_changed(project: &Project, source: &str) -> bool {
    let Ok(saved) = fs::read(project.path(format!("{source}.bib.old"))) else {
        return false;
    };
    fs::read(project.path(format!("{source}.bib"))).map_or(true, |current| current != saved)
}

// ============================================================================
// Tests
// ============================================================================
