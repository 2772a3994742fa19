//! External command execution utilities.
//!
//! Provides the `exec!` macro for running one tool to completion inside the
//! project root. Failing to launch the binary is reported as
//! [`ToolError::Launch`]; the exit status is returned to the caller, which
//! decides whether a non-zero status matters.

use crate::toolchain::ToolError;
use std::{
    ffi::OsString,
    path::Path,
    process::{Command, Output, Stdio},
};

// ============================================================================
// Macros
// ============================================================================

/// Run an external command inside a working directory.
///
/// # Examples
/// ```ignore
/// // Capture stdout and stderr
/// exec!(root; &config.latex.pdf; "-interaction=nonstopmode", "main.tex")?;
///
/// // Discard stdout, keep stderr for error reporting
/// exec!(discard; root; &config.bibtex.command; "main")?;
/// ```
#[macro_export]
macro_rules! exec {
    (discard; $root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            $root,
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
            $crate::utils::exec::Stdout::Discard,
        )
    };
    ($root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            $root,
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
            $crate::utils::exec::Stdout::Capture,
        )
    };
}

// ============================================================================
// Argument Conversion
// ============================================================================

#[doc(hidden)]
#[allow(clippy::wildcard_imports)] // Needed for macro internal module
pub mod internal {
    use super::*;

    /// Convert to `OsString`.
    #[inline]
    pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
        s.into()
    }

    /// Trait for converting to command vector.
    pub trait ToCmd {
        fn to_cmd(self) -> Vec<OsString>;
    }

    impl<const N: usize> ToCmd for [&str; N] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.into_iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &[String] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &Vec<String> {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    /// Convert command to `Vec<OsString>`.
    #[inline]
    pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
        cmd.to_cmd()
    }

    /// Filter out empty args.
    #[inline]
    pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
        args.iter().filter(|a| !a.is_empty()).cloned().collect()
    }
}

// ============================================================================
// Command Execution
// ============================================================================

/// What to do with the child's stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stdout {
    Capture,
    Discard,
}

/// Execute a command to completion.
///
/// stdin is closed so an interactive prompt can never block the build.
///
/// # Errors
/// Returns [`ToolError::Launch`] if the binary cannot be started.
pub fn exec(
    root: &Path,
    cmd: &[OsString],
    args: &[OsString],
    stdout: Stdout,
) -> Result<Output, ToolError> {
    let (name, mut command) = prepare(root, cmd, args)?;

    command.stdin(Stdio::null()).stderr(Stdio::piped());
    match stdout {
        Stdout::Capture => command.stdout(Stdio::piped()),
        Stdout::Discard => command.stdout(Stdio::null()),
    };

    command
        .output()
        .map_err(|source| ToolError::Launch { tool: name, source })
}

/// Prepare a Command from components.
fn prepare(
    root: &Path,
    cmd: &[OsString],
    args: &[OsString],
) -> Result<(String, Command), ToolError> {
    let Some(program) = cmd.first() else {
        return Err(ToolError::EmptyCommand);
    };
    let name = program.to_string_lossy().into_owned();

    let mut command = Command::new(program);
    command.args(&cmd[1..]).args(args).current_dir(root);

    Ok((name, command))
}

/// Combined stdout and stderr of a finished command, decoded lossily.
pub fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (_, true) => stdout.into_owned(),
        (true, false) => stderr.into_owned(),
        (false, false) => format!("{stdout}\n{stderr}"),
    }
}

// ============================================================================
// Tests
// ============================================================================
