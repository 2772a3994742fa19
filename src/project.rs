//! Project identity.
//!
//! A project is a working directory plus a base name. Every artifact the
//! toolchain reads or writes is `<root>/<name>.<ext>`.

use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
    thread,
    time::Duration,
};
use thiserror::Error;
use walkdir::WalkDir;

/// Texlipse keeps the main document name in this file.
pub const TEXLIPSE_FILE: &str = ".texlipse";

static TEXLIPSE_MAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^mainTexFile=(.*)\.tex\r?$").unwrap());

/// Errors raised while deciding which document to build.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("could not find a single *.tex file in `{0}`")]
    NoSingleSource(PathBuf),

    #[error("file `{0}` is missing")]
    TexlipseMissing(PathBuf),

    #[error("parsing `{0}` failed: no mainTexFile entry")]
    TexlipseInvalid(PathBuf),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

/// The document being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    name: String,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    /// Resolve the project from an optional CLI argument.
    ///
    /// - `None`: the single `*.tex` file directly inside `root`
    /// - `.texlipse`: the `mainTexFile` entry of that file
    /// - otherwise a file name with or without the `.tex` suffix; directory
    ///   components are moved into the root
    pub fn resolve(root: &Path, arg: Option<&str>) -> Result<Self, ProjectError> {
        let arg = match arg {
            None => find_single_source(root)?,
            Some(TEXLIPSE_FILE) => read_texlipse(&root.join(TEXLIPSE_FILE))?,
            Some(arg) => arg.to_owned(),
        };

        let arg = arg.strip_suffix(".tex").unwrap_or(&arg);
        let path = Path::new(arg);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| arg.to_owned());
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => root.join(parent),
            _ => root.to_path_buf(),
        };

        Ok(Self::new(root, name))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<name>.<ext>` without the root, as passed on tool command lines.
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{ext}", self.name)
    }

    /// `<root>/<name>.<ext>`
    pub fn artifact(&self, ext: &str) -> PathBuf {
        self.root.join(self.file_name(ext))
    }

    /// Resolve a path written inside an artifact (e.g. `\@input{ch1.aux}`).
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn source(&self) -> PathBuf {
        self.artifact("tex")
    }

    pub fn aux(&self) -> PathBuf {
        self.artifact("aux")
    }

    pub fn log(&self) -> PathBuf {
        self.artifact("log")
    }

    pub fn toc(&self) -> PathBuf {
        self.artifact("toc")
    }

    /// Final document, `pdf` or `dvi` depending on the compiler.
    pub fn output(&self, pdf: bool) -> PathBuf {
        self.artifact(if pdf { "pdf" } else { "dvi" })
    }
}

/// The only `*.tex` file directly inside `root`.
fn find_single_source(root: &Path) -> Result<String, ProjectError> {
    let sources: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .filter(|name| name.ends_with(".tex"))
        .collect();

    match <[String; 1]>::try_from(sources) {
        Ok([name]) => Ok(name),
        Err(_) => Err(ProjectError::NoSingleSource(root.to_path_buf())),
    }
}

/// Read the main file name from a texlipse project file.
///
/// Eclipse recreates the file on workspace refresh, so a missing file is
/// retried once after a short pause.
fn read_texlipse(path: &Path) -> Result<String, ProjectError> {
    if !path.is_file() {
        thread::sleep(Duration::from_millis(100));
        if !path.is_file() {
            return Err(ProjectError::TexlipseMissing(path.to_path_buf()));
        }
    }

    let content = fs::read_to_string(path).map_err(|e| ProjectError::Io(path.to_path_buf(), e))?;
    let name = TEXLIPSE_MAIN
        .captures(&content)
        .map(|c| c[1].to_owned())
        .ok_or_else(|| ProjectError::TexlipseInvalid(path.to_path_buf()))?;

    crate::log!("project"; "found input file in `{TEXLIPSE_FILE}`: {name}.tex");
    Ok(name)
}
