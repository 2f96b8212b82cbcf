use std::io::{self, Write};

use anyhow::{bail, Result};

/// Prompt for a line of input, offering `default` when one is known
pub fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(resolve_input(&input, default))
}

pub fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("{}: ", label))?;
    Ok(password)
}

/// Prompt for a new password twice and require both entries to match
pub fn prompt_new_password() -> Result<String> {
    let password = prompt_password("New password")?;
    let confirm = prompt_password("Confirm password")?;
    if password != confirm {
        bail!("Passwords do not match.");
    }
    if password.is_empty() {
        bail!("Password is required.");
    }
    Ok(password)
}

fn resolve_input(input: &str, default: Option<&str>) -> String {
    let input = input.trim();
    match default {
        Some(d) if input.is_empty() => d.to_string(),
        _ => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_input() {
        assert_eq!(resolve_input("ada@example.com\n", None), "ada@example.com");
        assert_eq!(resolve_input("\n", Some("last@example.com")), "last@example.com");
        assert_eq!(resolve_input(" other@example.com ", Some("last@example.com")), "other@example.com");
        assert_eq!(resolve_input("", None), "");
    }
}
