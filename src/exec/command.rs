// src/exec/command.rs

use std::fmt;

use crate::errors::{GrapeError, Result};

/// A run command split into program + arguments.
///
/// Splitting is plain whitespace splitting. There is **no** shell quoting:
/// `echo "a b"` becomes `["echo", "\"a", "b\""]`. Commands that need a shell
/// should say so explicitly, e.g. `sh ./dev.sh`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn parse(line: &str) -> Result<Self> {
        let mut chunks = line.split_whitespace().map(str::to_string);
        let program = chunks.next().ok_or(GrapeError::EmptyCommand)?;
        Ok(Self {
            program,
            args: chunks.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
