//! Host capabilities the lesson screens call into: reading examples aloud and
//! explaining terms.

use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

use crate::content::Lesson;

pub trait Narrator {
    fn speak(&mut self, text: &str);
}

pub trait Explainer {
    fn explain(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn speak(&mut self, _text: &str) {}
}

/// Writes what would be spoken to the log.
#[derive(Debug, Default)]
pub struct TracingNarrator;

impl Narrator for TracingNarrator {
    fn speak(&mut self, text: &str) {
        debug!(text, "narrate");
    }
}

/// Runs an external speech command with the text as its last argument.
/// A new utterance cuts off the previous one.
#[derive(Debug)]
pub struct CommandNarrator {
    program: String,
    args: Vec<String>,
    current: Option<Child>,
}

impl CommandNarrator {
    /// Returns `None` for a blank command line.
    pub fn new(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            current: None,
        })
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            if matches!(child.try_wait(), Ok(None)) {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl Narrator for CommandNarrator {
    fn speak(&mut self, text: &str) {
        self.stop();
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.current = Some(child),
            Err(err) => warn!(program = %self.program, %err, "narrator command failed"),
        }
    }
}

impl Drop for CommandNarrator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Glossary lookup, case-insensitive on the term.
impl Explainer for Lesson {
    fn explain(&self, key: &str) -> Option<String> {
        let key = key.trim();
        self.glossary
            .iter()
            .find(|(term, _)| term.eq_ignore_ascii_case(key))
            .map(|(_, text)| text.clone())
    }
}
