use crate::RuntimeError;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::Command;

/// Captured result of a finished external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub command: String,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Non-empty stdout lines, trimmed.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .collect()
    }

    pub fn first_line(&self) -> Option<&str> {
        self.lines().into_iter().next().map(str::trim)
    }

    pub fn into_failure(self) -> RuntimeError {
        RuntimeError::CommandFailed {
            command: self.command,
            code: self.code,
            stderr: self.stderr.trim().to_owned(),
        }
    }
}

/// Run `program` with `args`, capturing both output streams.
///
/// A non-zero exit is not an error here; callers decide what each exit code means.
pub fn run<I, S>(program: &str, args: I) -> Result<CommandOutput, RuntimeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let command = std::iter::once(program.to_owned())
        .chain(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::trace!("exec: {command}");

    let output = Command::new(program).args(&args).output().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            RuntimeError::ToolUnavailable(program.to_owned())
        } else {
            RuntimeError::Io(e)
        }
    })?;

    Ok(CommandOutput {
        command,
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Whether `program` can be spawned at all.
pub fn command_exists(program: &str) -> bool {
    !matches!(
        run(program, ["--version"]),
        Err(RuntimeError::ToolUnavailable(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_reported() {
        let err = run("dtproject-no-such-tool", ["--help"]).unwrap_err();
        assert!(matches!(err, RuntimeError::ToolUnavailable(_)));
        assert!(!command_exists("dtproject-no-such-tool"));
    }

    #[test]
    fn lines_skip_blank_output() {
        let out = CommandOutput {
            command: "x".to_owned(),
            code: Some(0),
            stdout: "\n a\n\nb  \n".to_owned(),
            stderr: String::new(),
        };
        assert_eq!(out.lines(), vec![" a", "b"]);
        assert_eq!(out.first_line(), Some("a"));
        assert!(out.success());
    }
}
