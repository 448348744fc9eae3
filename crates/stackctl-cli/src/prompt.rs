//! Interactive prompts on the controlling terminal.
//!
//! Plain values are read as a line from stdin; passwords go through
//! `rpassword` so they are not echoed.

use std::io::{self, BufRead, Write};

/// Prints `label` to stderr and reads one trimmed line from stdin.
///
/// # Errors
///
/// Returns an error if stdin is closed before a line is read.
pub fn read_line(label: &str) -> anyhow::Result<String> {
    let stdin = io::stdin();
    read_from(&mut stdin.lock(), &mut io::stderr(), label)
}

/// Prints `label` and reads a password from the terminal without echoing it.
///
/// The value is returned as typed; surrounding spaces are kept.
///
/// # Errors
///
/// Returns an error if there is no terminal to read from.
pub fn read_password(label: &str) -> anyhow::Result<String> {
    Ok(rpassword::prompt_password(label)?)
}

fn read_from(input: &mut impl BufRead, output: &mut impl Write, label: &str) -> anyhow::Result<String> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        anyhow::bail!("no input for prompt \"{}\"", label.trim_end_matches([':', ' ']));
    }
    Ok(line.trim().to_string())
}
