//! Pattern scanners for `.aux` files.
//!
//! The auxiliary format is never parsed as a whole; each marker is matched
//! line by line.

use regex::Regex;
use std::sync::LazyLock;

static CITATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\citation\{(.*)\}").unwrap());

static INPUT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\@input\{(.*\.aux)\}").unwrap());

static NEW_GLOSSARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\@newglossary\{(.*)\}\{.*\}\{(.*)\}\{(.*)\}").unwrap()
});

static BIBDATA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\bibdata\{(.*)\}").unwrap());

static BIBCITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\bibcite\{(.*)\}\{(.*)\}").unwrap());

/// Keys of every `\citation{key}` marker, one item per occurrence.
pub fn citations(text: &str) -> impl Iterator<Item = &str> {
    CITATION
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Paths of every `\@input{file.aux}` marker.
pub fn inputs(text: &str) -> impl Iterator<Item = &str> {
    INPUT
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `(name, input-ext, output-ext)` of every `\@newglossary` marker.
pub fn glossaries(text: &str) -> impl Iterator<Item = (&str, &str, &str)> {
    NEW_GLOSSARY.captures_iter(text).map(|c| {
        let (_, [name, input, output]) = c.extract();
        (name, input, output)
    })
}

/// Bibliography database names from `\bibdata{a,b}`, in order.
pub fn bib_sources(text: &str) -> Vec<String> {
    BIBDATA
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .flat_map(|m| m.as_str().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.strip_suffix(".bib").unwrap_or(s).to_owned())
        .collect()
}

/// Keys of every `\bibcite{key}{label}` marker.
pub fn bibcites(text: &str) -> impl Iterator<Item = &str> {
    BIBCITE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUX: &str = r"\relax
\citation{knuth84}
\citation{lamport94}
\citation{knuth84}
\@input{chapter1.aux}
\@newglossary{main}{glg}{gls}{glo}
\@newglossary{acronym}{alg}{acr}{acn}
\bibstyle{plain}
\bibdata{refs,extra.bib}
\bibcite{knuth84}{1}
\bibcite{lamport94}{2}
";

    #[test]
    fn test_citations_counts_every_occurrence() {
        let keys: Vec<_> = citations(AUX).collect();
        assert_eq!(keys, vec!["knuth84", "lamport94", "knuth84"]);
    }

    #[test]
    fn test_inputs() {
        let files: Vec<_> = inputs(AUX).collect();
        assert_eq!(files, vec!["chapter1.aux"]);
    }

    #[test]
    fn test_inputs_ignore_non_aux() {
        assert_eq!(inputs(r"\@input{notes.tex}").count(), 0);
    }

    #[test]
    fn test_glossaries() {
        let found: Vec<_> = glossaries(AUX).collect();
        assert_eq!(
            found,
            vec![("main", "gls", "glo"), ("acronym", "acr", "acn")]
        );
    }

    #[test]
    fn test_bib_sources_split_and_strip() {
        assert_eq!(bib_sources(AUX), vec!["refs", "extra"]);
        assert!(bib_sources(r"\relax").is_empty());
    }

    #[test]
    fn test_bibcites() {
        let keys: Vec<_> = bibcites(AUX).collect();
        assert_eq!(keys, vec!["knuth84", "lamport94"]);
    }
}
