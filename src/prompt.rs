//! Interactive yes/no confirmation.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use colored::Colorize;

/// Reads yes/no answers from a reader after writing prompts to a writer.
///
/// The standard version uses stdin and stdout,
/// tests can drive it with in-memory buffers.
pub struct Prompt<R, W> {
    reader: R,
    writer: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    /// Create a prompt that reads from stdin and writes to stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Ask the user to confirm with the given prompt text.
    ///
    /// Empty input returns the default response `resp`.
    /// `y` and `yes` in any casing are accepted as yes, everything else is no.
    /// Reaching the end of input counts as no.
    ///
    /// # Errors
    /// Returns an error if writing the prompt or reading the answer fails.
    pub fn confirm(&mut self, prompt: &str, resp: bool) -> Result<bool> {
        let choices = if resp { "[Y/n]" } else { "[y/N]" };
        write!(self.writer, "{}", format!("{prompt} {choices}: ").magenta()).context("Failed to write prompt")?;
        self.writer.flush().context("Failed to flush prompt")?;

        let mut input = String::new();
        let bytes = self.reader.read_line(&mut input).context("Failed to read input")?;
        if bytes == 0 {
            return Ok(false);
        }

        Ok(parse_answer(&input, resp))
    }
}

/// Ask for confirmation on the terminal.
///
/// # Errors
/// Returns an error if stdin or stdout is not usable.
pub fn confirm(prompt: &str, resp: bool) -> Result<bool> {
    Prompt::stdio().confirm(prompt, resp)
}

fn parse_answer(input: &str, resp: bool) -> bool {
    let answer = input.trim();
    if answer.is_empty() {
        return resp;
    }
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
