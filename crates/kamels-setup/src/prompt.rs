//! Console prompting.
//!
//! [`Prompter`] is the seam between the setup steps and the terminal.  The
//! binary uses [`ConsolePrompter`] over stdin/stdout; tests use the same type
//! over an in-memory cursor and a `Vec<u8>`, which makes scripted input and
//! captured output free.
//!
//! Numeric questions go through [`request_number`], a bounded loop: an answer
//! outside the range is asked again, at most [`MAX_PROMPT_ATTEMPTS`] times.

use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;

use thiserror::Error;

/// Attempts allowed per question before setup gives up.
pub const MAX_PROMPT_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum PromptError {
    /// Every attempt was empty, non-numeric, or out of range.
    #[error("no valid answer in the range {min}-{max} after {attempts} attempts")]
    AttemptsExhausted { min: u16, max: u16, attempts: usize },

    /// Input was closed before an answer was given.
    #[error("input closed before setup was finished")]
    EndOfInput,

    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Line-oriented console.
pub trait Prompter {
    /// Prints `text` followed by a newline.
    fn say(&mut self, text: &str) -> Result<(), PromptError>;

    /// Prints `prompt` without a newline and reads one line.
    ///
    /// Returns `None` at end of input.  The trailing newline is stripped.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, PromptError>;
}

/// [`Prompter`] over any buffered reader and writer.
#[derive(Debug)]
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// The writer, for inspecting captured output.
    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn say(&mut self, text: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>, PromptError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Asks `prompt` until the answer is a number within `range`.
///
/// # Errors
///
/// [`PromptError::AttemptsExhausted`] after [`MAX_PROMPT_ATTEMPTS`] invalid
/// answers, [`PromptError::EndOfInput`] if input closes first.
pub fn request_number(
    prompter: &mut dyn Prompter,
    prompt: &str,
    range: RangeInclusive<u16>,
) -> Result<u16, PromptError> {
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let answer = prompter.ask(prompt)?.ok_or(PromptError::EndOfInput)?;
        match answer.trim().parse::<u16>() {
            Ok(value) if range.contains(&value) => return Ok(value),
            _ => prompter.say(&format!(
                "Please type a number from {} to {}.",
                range.start(),
                range.end()
            ))?,
        }
    }
    Err(PromptError::AttemptsExhausted {
        min: *range.start(),
        max: *range.end(),
        attempts: MAX_PROMPT_ATTEMPTS,
    })
}
