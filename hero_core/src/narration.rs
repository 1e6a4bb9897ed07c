//! Spoken prompts.
//!
//! Prompts go through the `Narrator` trait so the session runner does not
//! care whether they are printed or handed to a speech synthesizer.

use crate::config::SpeechConfig;
use crate::{Error, Result};
use std::io::Write;
use std::process::Command;

/// Something that can say a line of text to the user
pub trait Narrator {
    fn speak(&mut self, text: &str) -> Result<()>;
}

/// Normalize a prompt for speaking: underscores become spaces and every
/// word is capitalized (`"hip_cars"` -> `"Hip Cars"`)
pub fn prompt_text(text: &str) -> String {
    text.replace('_', " ")
        .split(' ')
        .map(title_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Prints prompts to a writer (stdout by default)
pub struct ConsoleNarrator<W: Write = std::io::Stdout> {
    out: W,
}

impl ConsoleNarrator {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsoleNarrator<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Narrator for ConsoleNarrator<W> {
    fn speak(&mut self, text: &str) -> Result<()> {
        let text = prompt_text(text);
        tracing::debug!("Speech: {}", text);
        writeln!(self.out, "🔊 {}", text)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Hands prompts to an external speech program and waits for it to finish
///
/// The command is split on whitespace; `-s <rate>` and the text are
/// appended, which matches `espeak`/`espeak-ng`.
pub struct CommandNarrator {
    program: String,
    args: Vec<String>,
    rate: u32,
}

impl CommandNarrator {
    pub fn new(command: &str, rate: u32) -> Result<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("speech.command is empty".into()))?;
        Ok(Self {
            program,
            args: parts.collect(),
            rate,
        })
    }
}

impl Narrator for CommandNarrator {
    fn speak(&mut self, text: &str) -> Result<()> {
        let text = prompt_text(text);
        tracing::debug!("Speech: {}", text);

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg(&text)
            .status()
            .map_err(|e| Error::Narration(format!("Failed to run {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(Error::Narration(format!(
                "{} exited with {} while saying {:?}",
                self.program, status, text
            )));
        }
        Ok(())
    }
}

/// Pick the narrator described by the speech configuration
pub fn narrator_from_config(config: &SpeechConfig) -> Result<Box<dyn Narrator>> {
    match &config.command {
        Some(command) => {
            tracing::info!("Speaking prompts with `{}`", command);
            Ok(Box::new(CommandNarrator::new(command, config.rate)?))
        }
        None => Ok(Box::new(ConsoleNarrator::stdout())),
    }
}

impl<N: Narrator + ?Sized> Narrator for Box<N> {
    fn speak(&mut self, text: &str) -> Result<()> {
        (**self).speak(text)
    }
}
