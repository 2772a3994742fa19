//! Bibliography entries the document never cites.

use crate::{log, project::Project, state::aux};
use anyhow::{Context, Result};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::{fs, sync::LazyLock};

/// `@type{key,`
static BIB_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)\s*\{\s*([^,\s{}]+)\s*,").unwrap());

/// Entry types that define no citable key.
const NON_ENTRIES: &[&str] = &["string", "comment", "preamble"];

/// Entry keys of one `.bib` file, in file order.
fn entry_keys(text: &str) -> impl Iterator<Item = &str> {
    BIB_ENTRY.captures_iter(text).filter_map(|c| {
        let (_, [kind, key]) = c.extract();
        (!NON_ENTRIES.contains(&kind.to_ascii_lowercase().as_str())).then_some(key)
    })
}

/// `(source, key)` of every entry missing from the aux file's `\bibcite`s.
pub fn uncited(project: &Project) -> Result<Vec<(String, String)>> {
    let aux_path = project.aux();
    let aux_text = fs::read_to_string(&aux_path)
        .with_context(|| format!("failed to read `{}`", aux_path.display()))?;
    let cited: FxHashSet<&str> = aux::bibcites(&aux_text).collect();

    let mut missing = Vec::new();
    for source in aux::bib_sources(&aux_text) {
        let path = project.path(format!("{source}.bib"));
        if !path.is_file() {
            continue;
        }
        let bib = fs::read_to_string(&path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;

        missing.extend(
            entry_keys(&bib)
                .filter(|key| !cited.contains(key))
                .map(|key| (source.clone(), key.to_owned())),
        );
    }
    Ok(missing)
}

/// Log every uncited entry.
pub fn check(project: &Project) -> Result<()> {
    let missing = uncited(project)?;
    if missing.is_empty() {
        log!("cite"; "every bibliography entry is cited");
    }
    for (source, key) in missing {
        log!("cite"; "not cited: `{key}` ({source}.bib)");
    }
    Ok(())
}
