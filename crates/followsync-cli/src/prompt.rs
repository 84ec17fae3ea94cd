//! Interactive prompts.

use std::io::IsTerminal;

use anyhow::{bail, Context, Result};
use dialoguer::Input;
use followsync_twitter::normalize_username;

/// Ask for a username on the terminal.
///
/// Fails straight away when stdin is not a terminal, so scripted runs get an
/// error instead of hanging.
pub fn username(prompt: &str) -> Result<String> {
    if !std::io::stdin().is_terminal() {
        bail!(
            "no USERNAME given and stdin is not a terminal.\n\
             Pass the username as an argument when scripting."
        );
    }

    let input: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| check_username(input))
        .interact_text()
        .context("failed to read username")?;

    Ok(input.trim().to_string())
}

fn check_username(input: &str) -> Result<(), String> {
    normalize_username(input)
        .map(|_| ())
        .map_err(|_| "enter a username of 1-15 letters, digits or underscores".to_string())
}
