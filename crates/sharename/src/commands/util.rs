//! Shared helpers for command handlers.

use dialoguer::Input;
use secrecy::SecretString;
use sharename_api::{ApiClient, is_authenticated};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Use the given email or ask for one.
pub fn email_or_prompt(email: Option<String>) -> Result<String, CliError> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
    };
    let email = email.trim().to_owned();
    if email.is_empty() || !email.contains('@') {
        return Err(CliError::Validation {
            field: "email".into(),
            reason: "expected an email address".into(),
        });
    }
    Ok(email)
}

/// Use the given password or read one without echo.
pub fn password_or_prompt(password: Option<String>) -> Result<SecretString, CliError> {
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ").map_err(prompt_err)?,
    };
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

/// Fail early, without a request, when no access token is stored.
pub fn require_session(client: &ApiClient) -> Result<(), CliError> {
    if is_authenticated(client.session()) {
        Ok(())
    } else {
        Err(CliError::NotSignedIn)
    }
}

/// `-` for missing table cells.
pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_owned()
}

/// Join given and family name, skipping blanks.
pub fn full_name(given: Option<&str>, family: Option<&str>) -> String {
    let name = [given, family]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() { "-".into() } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_dashes() {
        assert_eq!(full_name(Some("Ana"), Some("Silva")), "Ana Silva");
        assert_eq!(full_name(None, Some("Silva")), "Silva");
        assert_eq!(full_name(Some(""), None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("x")), "x");
    }

    #[test]
    fn yes_flag_skips_prompt() {
        assert!(matches!(confirm("Delete?", true), Ok(true)));
    }

    #[test]
    fn given_email_is_trimmed_and_checked() {
        assert_eq!(
            email_or_prompt(Some("  ana@example.com ".into())).ok().as_deref(),
            Some("ana@example.com")
        );
        assert!(email_or_prompt(Some("nope".into())).is_err());
    }
}
