//! Toolchain backed by real processes.

use super::{ToolError, Toolchain};
use crate::{
    config::MakeConfig,
    detect::PassOutput,
    exec, log,
    project::Project,
    state::Glossary,
    utils::exec::combined_output,
};
use std::{fs, process::Output};

/// Runs the binaries named in the configuration inside the project root.
pub struct ProcessToolchain<'a> {
    config: &'a MakeConfig,
}

impl<'a> ProcessToolchain<'a> {
    pub const fn new(config: &'a MakeConfig) -> Self {
        Self { config }
    }

    /// Map a non-zero exit status to [`ToolError::Failed`].
    fn check(command: &[String], output: Output) -> Result<(), ToolError> {
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            log!("warn"; "{}", stderr.trim());
        }
        Err(ToolError::Failed {
            tool: command.first().cloned().unwrap_or_default(),
            status: output.status,
        })
    }
}

impl Toolchain for ProcessToolchain<'_> {
    /// `{compiler} {flags..} <name>.tex`
    ///
    /// The exit status is ignored: LaTeX exits non-zero for every error, and
    /// errors are read from the log instead. When the compiler did not write
    /// `<name>.log`, its captured output stands in.
    fn compile(&mut self, project: &Project) -> Result<PassOutput, ToolError> {
        let command = self.config.compiler();
        log!("latex"; "running {}...", command.join(" "));

        let cmd: Vec<String> = command
            .iter()
            .chain(&self.config.latex.flags)
            .cloned()
            .collect();
        let output = exec!(project.root(); &cmd; project.file_name("tex"))?;

        Ok(match fs::read(project.log()) {
            Ok(log) => PassOutput::from_bytes(&log),
            Err(_) => PassOutput::new(combined_output(&output)),
        })
    }

    /// `{bibtex} <name>`
    fn bibliography(&mut self, project: &Project) -> Result<(), ToolError> {
        let command = &self.config.bibtex.command;
        log!("bibtex"; "running {}...", command.join(" "));

        let output = exec!(discard; project.root(); command; project.name())?;
        Self::check(command, output)
    }

    /// `{makeindex} -q -s <name>.ist -o <name>.<in> <name>.<out>`
    fn index(
        &mut self,
        project: &Project,
        name: &str,
        glossary: &Glossary,
    ) -> Result<(), ToolError> {
        let command = &self.config.makeindex.command;
        log!("makeindex"; "running {} ({name})...", command.join(" "));

        let output = exec!(
            discard;
            project.root();
            command;
            "-q",
            "-s",
            project.file_name("ist"),
            "-o",
            project.file_name(&glossary.input_ext),
            project.file_name(&glossary.output_ext),
        )?;
        Self::check(command, output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// `sh -c <script> sh <args..>`: the tool arguments become `$1..`.
    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into(), "sh".into()]
    }

    fn config(latex: &str, bibtex: &str, makeindex: &str) -> MakeConfig {
        let mut config = MakeConfig::default();
        config.latex.pdf = sh(latex);
        config.latex.flags = Vec::new();
        config.bibtex.command = sh(bibtex);
        config.makeindex.command = sh(makeindex);
        config
    }

    #[test]
    fn test_compile_reads_log_file() {
        let dir = tempdir().unwrap();
        let project = Project::new(dir.path(), "doc");
        let config = config(r#"test "$1" = doc.tex && printf 'from log' > doc.log"#, "", "");

        let output = ProcessToolchain::new(&config).compile(&project).unwrap();
        assert_eq!(output.as_str(), "from log");
    }

    #[test]
    fn test_compile_falls_back_to_stdout() {
        let dir = tempdir().unwrap();
        let project = Project::new(dir.path(), "doc");
        let config = config("echo '! Emergency stop.'; exit 1", "", "");

        let output = ProcessToolchain::new(&config).compile(&project).unwrap();
        assert_eq!(output.errors().len(), 1);
    }

    #[test]
    fn test_bibliography_receives_project_name() {
        let dir = tempdir().unwrap();
        let project = Project::new(dir.path(), "doc");
        let config = config("", r#"printf '%s' "$1" > called"#, "");

        ProcessToolchain::new(&config).bibliography(&project).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("called")).unwrap(), "doc");
    }

    #[test]
    fn test_bibliography_failure() {
        let dir = tempdir().unwrap();
        let project = Project::new(dir.path(), "doc");
        let config = config("", "exit 3", "");

        let result = ProcessToolchain::new(&config).bibliography(&project);
        assert!(matches!(result, Err(ToolError::Failed { .. })));
    }

    #[test]
    fn test_index_arguments() {
        let dir = tempdir().unwrap();
        let project = Project::new(dir.path(), "doc");
        let config = config("", "", r#"echo "$@" > called"#);
        let glossary = Glossary {
            input_ext: "gls".into(),
            output_ext: "glo".into(),
        };

        ProcessToolchain::new(&config)
            .index(&project, "main", &glossary)
            .unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("called")).unwrap().trim(),
            "-q -s doc.ist -o doc.gls doc.glo"
        );
    }

    #[test]
    fn test_missing_compiler() {
        let dir = tempdir().unwrap();
        let project = Project::new(dir.path(), "doc");
        let mut config = MakeConfig::default();
        config.latex.pdf = vec!["texmk-no-such-latex".into()];

        let result = ProcessToolchain::new(&config).compile(&project);
        assert!(matches!(result, Err(ToolError::Launch { .. })));
    }
}
