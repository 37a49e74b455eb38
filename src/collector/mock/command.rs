//! Mock external command runner.

use crate::collector::traits::{CommandOutput, CommandRunner};
use std::collections::HashMap;
use std::io;

type Invocation = (String, Vec<String>);

/// Returns canned output per program and argument list.
///
/// Unknown invocations fail with `NotFound`, like a missing binary.
#[derive(Debug, Clone, Default)]
pub struct MockCommandRunner {
    outputs: HashMap<Invocation, CommandOutput>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a successful invocation.
    pub fn add_output(&mut self, program: &str, args: &[&str], stdout: impl Into<String>) {
        self.outputs.insert(
            invocation(program, args),
            CommandOutput {
                success: true,
                stdout: stdout.into(),
            },
        );
    }

    /// Registers an invocation that exits non-zero.
    pub fn add_failure(&mut self, program: &str, args: &[&str]) {
        self.outputs
            .insert(invocation(program, args), CommandOutput::default());
    }
}

fn invocation(program: &str, args: &[&str]) -> Invocation {
    (
        program.to_string(),
        args.iter().map(|a| a.to_string()).collect(),
    )
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        self.outputs
            .get(&invocation(program, args))
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("command not found: {} {:?}", program, args),
                )
            })
    }
}
