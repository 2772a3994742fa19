//! Run-state tracker.
//!
//! Captures the "before" state that the change detectors compare against,
//! and recomputes the "after" state once a pass has finished.
//!
//! | Capture                     | Source                         |
//! |-----------------------------|--------------------------------|
//! | [`capture_citations`]       | `<name>.aux` + `\@input` files |
//! | [`capture_glossaries`]      | `\@newglossary` in `<name>.aux`|
//! | [`capture_glossary_outputs`]| `<name>.<output-ext>` files    |
//! | [`Snapshot::capture`]       | any single artifact            |
//!
//! None of these fail on a missing file: absence is a valid state.

pub mod aux;
mod snapshot;

pub use snapshot::Snapshot;

use crate::project::Project;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

// ============================================================================
// Citation Counter
// ============================================================================

/// Citation key occurrences per auxiliary file.
///
/// Only ever compared for equality. Two counters are equal iff they cover
/// the same aux files and every key has the same count in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationCounter(FxHashMap<String, FxHashMap<String, usize>>);

impl CitationCounter {
    /// Baseline for a project that has never been compiled: one empty
    /// counter for the main aux file, so any citation found later differs.
    pub fn unseeded(project: &Project) -> Self {
        let mut files = FxHashMap::default();
        files.insert(project.file_name("aux"), FxHashMap::default());
        Self(files)
    }

    /// Count the citations of one aux file and record them under `file`.
    pub fn record(&mut self, file: impl Into<String>, text: &str) {
        let counts = self.0.entry(file.into()).or_default();
        for key in aux::citations(text) {
            *counts.entry(key.to_owned()).or_default() += 1;
        }
    }

    /// Occurrences of `key` in `file`, zero when unknown.
    #[cfg(test)]
    pub fn count(&self, file: &str, key: &str) -> usize {
        self.0
            .get(file)
            .and_then(|counts| counts.get(key))
            .copied()
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Count the citations of the main aux file and every aux file it
/// `\@input`s.
///
/// Returns [`CitationCounter::unseeded`] when the main aux file does not
/// exist. Referenced files that cannot be read are skipped.
pub fn capture_citations(project: &Project) -> CitationCounter {
    let main = project.file_name("aux");
    let aux = Snapshot::capture(&project.aux());
    let Some(text) = aux.text() else {
        return CitationCounter::unseeded(project);
    };

    let mut counter = CitationCounter::default();
    counter.record(main, &text);

    for input in aux::inputs(&text) {
        if let Some(included) = Snapshot::capture(&project.path(input)).text() {
            counter.record(input, &included);
        }
    }

    counter
}

// ============================================================================
// Glossary Registry
// ============================================================================

/// File extensions of one glossary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glossary {
    /// Sorted file written by makeindex and read by LaTeX (e.g. `gls`).
    pub input_ext: String,
    /// Raw entries written by LaTeX and read by makeindex (e.g. `glo`).
    pub output_ext: String,
}

/// Glossaries declared by the document, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossaryRegistry(BTreeMap<String, Glossary>);

impl GlossaryRegistry {
    /// Merge the declarations found in `text`. Known glossaries are kept.
    pub fn refresh(&mut self, text: &str) {
        for (name, input, output) in aux::glossaries(text) {
            self.0.insert(
                name.to_owned(),
                Glossary {
                    input_ext: input.to_owned(),
                    output_ext: output.to_owned(),
                },
            );
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Glossary> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Glossary)> {
        self.0.iter().map(|(name, gloss)| (name.as_str(), gloss))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Merge the glossary declarations of the main aux file into `registry`.
///
/// Returns `false` when the aux file does not exist, leaving the registry
/// untouched.
pub fn capture_glossaries(project: &Project, registry: &mut GlossaryRegistry) -> bool {
    match Snapshot::capture(&project.aux()).text() {
        Some(text) => {
            registry.refresh(&text);
            true
        }
        None => false,
    }
}

/// Output-file snapshots of the registered glossaries, keyed by name.
///
/// Glossaries whose output file does not exist are left out.
pub fn capture_glossary_outputs(
    project: &Project,
    registry: &GlossaryRegistry,
) -> BTreeMap<String, Snapshot> {
    registry
        .iter()
        .filter_map(|(name, gloss)| {
            let snapshot = Snapshot::capture(&project.artifact(&gloss.output_ext));
            snapshot.is_present().then(|| (name.to_owned(), snapshot))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
