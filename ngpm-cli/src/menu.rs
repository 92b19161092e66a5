//! Numbered interactive menu
//!
//! ```text
//! 1. List packages
//! 2. Install package
//! 3. Build package
//! ```

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    List,
    Install { name: String, version: String },
    Build { name: String, version: String },
    /// Anything other than 1, 2 or 3
    Invalid(String),
}

/// Show the menu and read a selection plus any follow-up answers
///
/// Answers are used verbatim apart from the line ending; identifier
/// validation happens when the command runs. Only the lines it asks for are
/// consumed from `input`, but a buffered reader such as `Stdin` may already
/// hold more: piped bytes after the last answer stay in that buffer and are
/// not seen by a build script that inherits stdin.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<MenuChoice> {
    writeln!(output, "1. List packages")?;
    writeln!(output, "2. Install package")?;
    writeln!(output, "3. Build package")?;

    let choice = ask(input, output, "Choose an option: ")?;

    Ok(match choice.as_str() {
        "1" => MenuChoice::List,
        "2" => {
            let name = ask(input, output, "Enter the package name to install: ")?;
            let version = ask(input, output, "Enter the package version: ")?;
            MenuChoice::Install { name, version }
        }
        "3" => {
            let name = ask(input, output, "Enter the package name to build: ")?;
            let version = ask(input, output, "Enter the package version: ")?;
            MenuChoice::Build { name, version }
        }
        _ => MenuChoice::Invalid(choice),
    })
}

/// Print `question` and read one line; end of input reads as empty
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{question}")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
