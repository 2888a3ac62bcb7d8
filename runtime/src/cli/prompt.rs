//! Interactive credential entry.

use crate::trust::credentials::Credentials;
use anyhow::{Context, Result};
use rustyline::DefaultEditor;

const ACCOUNT_PROMPT: &str = "Account: ";
const PASSWORD_PROMPT: &str = "Password: ";
const SAVE_PROMPT: &str = "Do you want to save your info? [Y/n] ";

/// Ask for whichever credential is still empty. Returns `true` if anything
/// was typed in, which is when saving is offered.
pub fn fill_missing(credentials: &mut Credentials) -> Result<bool> {
    if credentials.is_complete() {
        return Ok(false);
    }

    let mut editor = DefaultEditor::new().context("failed to open terminal for input")?;
    while credentials.username.is_empty() {
        let line = editor.readline(ACCOUNT_PROMPT).context("failed to read account")?;
        credentials.username = line.trim().to_string();
    }
    while credentials.password.is_empty() {
        credentials.password =
            rpassword::prompt_password(PASSWORD_PROMPT).context("failed to read password")?;
    }
    Ok(true)
}

/// Ask whether to write the credentials to disk.
pub fn confirm_save() -> Result<bool> {
    let mut editor = DefaultEditor::new().context("failed to open terminal for input")?;
    let answer = editor.readline(SAVE_PROMPT).context("failed to read answer")?;
    Ok(wants_to_save(&answer))
}

/// Anything except an explicit `n` means yes.
pub fn wants_to_save(answer: &str) -> bool {
    answer.trim() != "n"
}
