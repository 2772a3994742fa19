//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [latex] Section Defaults
// ============================================================================

pub mod latex {
    pub fn pdf() -> Vec<String> {
        vec!["pdflatex".into()]
    }

    pub fn dvi() -> Vec<String> {
        vec!["latex".into()]
    }

    pub fn flags() -> Vec<String> {
        vec![
            "-interaction=nonstopmode".into(),
            "-shell-escape".into(),
            "--synctex=1".into(),
        ]
    }
}

// ============================================================================
// [bibtex] / [makeindex] Section Defaults
// ============================================================================

pub mod bibtex {
    pub fn command() -> Vec<String> {
        vec!["bibtex".into()]
    }
}

pub mod makeindex {
    pub fn command() -> Vec<String> {
        vec!["makeindex".into()]
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    /// Upper bound on compiler passes per build.
    pub fn max_runs() -> usize {
        4
    }
}
