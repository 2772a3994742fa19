//! Open the finished document in the system viewer.

use crate::log;
use std::path::Path;

/// Hand `document` to the platform opener. Failure is only a warning.
pub fn open_document(document: &Path) {
    if !document.is_file() {
        log!("warn"; "no preview: `{}` was not generated", document.display());
        return;
    }

    log!("preview"; "opening {}...", document.display());
    if let Err(err) = open::that(document) {
        log!("warn"; "could not open `{}`: {err}", document.display());
    }
}
