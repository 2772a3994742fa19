//! Textual signals in compiler output.
//!
//! Every pattern the detectors react to is declared here, so the conditions
//! under which the controller changes state can be read in one place.

use regex::Regex;
use std::{fmt, sync::LazyLock};

// ============================================================================
// Rerun Triggers
// ============================================================================

/// Why another compiler pass is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    UndefinedReference,
    UndefinedReferencesSummary,
    LabelsChanged,
    MissingTocOrLof,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UndefinedReference => "undefined reference",
            Self::UndefinedReferencesSummary => "there were undefined references",
            Self::LabelsChanged => "labels may have changed",
            Self::MissingTocOrLof => "table of contents or list of figures missing",
        })
    }
}

/// One rerun trigger.
pub struct Trigger {
    pub kind: TriggerKind,
    pub pattern: Regex,
}

/// Any match means the compiler must run again.
pub static RERUN_TRIGGERS: LazyLock<[Trigger; 4]> = LazyLock::new(|| {
    [
        Trigger {
            kind: TriggerKind::UndefinedReference,
            pattern: Regex::new(r"LaTeX Warning: Reference .* undefined").unwrap(),
        },
        Trigger {
            kind: TriggerKind::UndefinedReferencesSummary,
            pattern: Regex::new(r"LaTeX Warning: There were undefined references\.").unwrap(),
        },
        Trigger {
            kind: TriggerKind::LabelsChanged,
            pattern: Regex::new(r"LaTeX Warning: Label\(s\) may have changed\.").unwrap(),
        },
        Trigger {
            kind: TriggerKind::MissingTocOrLof,
            pattern: Regex::new(r"No file .*(\.toc|\.lof)\.").unwrap(),
        },
    ]
});

// ============================================================================
// Error Signatures
// ============================================================================

/// Shape of a fatal error reported by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `! message` followed by an `l.<num>` context line
    BangLineWithContext,
    /// `! message` alone
    BangLine,
    /// `No pages of output.`
    NoPages,
}

/// All error signatures, as alternatives of one pattern so that a
/// `! ...` line is reported once, with its context when there is one.
/// Capture group `n` belongs to `ERROR_KINDS[n - 1]`.
pub static ERROR_SIGNATURES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^! (.*\nl\..*)$)|(?:^! (.*)$)|(No pages of output\.)").unwrap()
});

pub const ERROR_KINDS: [ErrorKind; 3] = [
    ErrorKind::BangLineWithContext,
    ErrorKind::BangLine,
    ErrorKind::NoPages,
];

// ============================================================================
// Project-specific Signals
// ============================================================================

/// `No file <name>.bbl.`: the bibliography has never been generated.
pub fn missing_bbl(project_name: &str) -> Regex {
    missing_file(&format!("{project_name}.bbl"))
}

/// `No file <file>.`: LaTeX tried to read a file that does not exist.
pub fn missing_file(file_name: &str) -> Regex {
    Regex::new(&format!(r"No file {}\.", regex::escape(file_name))).unwrap()
}

/// `Citation ... undefined`: a key is not in the current `.bbl`.
pub static UNDEFINED_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"LaTeX Warning: Citation .* undefined").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_matching(line: &str) -> Vec<TriggerKind> {
        RERUN_TRIGGERS
            .iter()
            .filter(|t| t.pattern.is_match(line))
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_each_rerun_trigger() {
        assert_eq!(
            kinds_matching("LaTeX Warning: Reference `fig:a' on page 1 undefined on input line 3."),
            vec![TriggerKind::UndefinedReference]
        );
        assert_eq!(
            kinds_matching("LaTeX Warning: There were undefined references."),
            vec![TriggerKind::UndefinedReferencesSummary]
        );
        assert_eq!(
            kinds_matching(
                "LaTeX Warning: Label(s) may have changed. Rerun to get cross-references right.",
            ),
            vec![TriggerKind::LabelsChanged]
        );
        assert_eq!(kinds_matching("No file doc.toc."), vec![TriggerKind::MissingTocOrLof]);
        assert_eq!(kinds_matching("No file doc.lof."), vec![TriggerKind::MissingTocOrLof]);
    }

    #[test]
    fn test_rerun_triggers_ignore_other_files() {
        assert!(kinds_matching("No file doc.lot.").is_empty());
        assert!(kinds_matching("No file doc.bbl.").is_empty());
        assert!(kinds_matching("Output written on doc.pdf (1 page).").is_empty());
    }

    #[test]
    fn test_missing_bbl_escapes_name() {
        let re = missing_bbl("my.doc");
        assert!(re.is_match("No file my.doc.bbl."));
        assert!(!re.is_match("No file myXdoc.bbl."));
    }

    #[test]
    fn test_undefined_citation() {
        assert!(
            UNDEFINED_CITATION.is_match("LaTeX Warning: Citation `knuth84' on page 1 undefined")
        );
        assert!(!UNDEFINED_CITATION.is_match("LaTeX Warning: Reference `x' on page 1 undefined"));
    }

    #[test]
    fn test_error_signature_groups() {
        let caps = ERROR_SIGNATURES
            .captures("! Undefined control sequence.\nl.12 \\foo\n")
            .unwrap();
        assert!(caps.get(1).is_some());
        assert_eq!(ERROR_KINDS[0], ErrorKind::BangLineWithContext);

        let caps = ERROR_SIGNATURES.captures("! Emergency stop.\n").unwrap();
        assert!(caps.get(1).is_none());
        assert_eq!(caps.get(2).unwrap().as_str(), "Emergency stop.");

        let caps = ERROR_SIGNATURES.captures("No pages of output.").unwrap();
        assert!(caps.get(3).is_some());
    }
}
