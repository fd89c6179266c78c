//! Command execution adapters
//!
//! - [`LocalCommandRunner`] - runs commands on this host, optionally through
//!   a root helper such as `sudo`
//! - [`SshCommandRunner`] - runs commands on a remote gateway through the
//!   `ssh` client

pub mod local;
pub mod ssh;

pub use local::LocalCommandRunner;
pub use ssh::SshCommandRunner;

/// Quotes `word` for a POSIX shell
///
/// Words made only of characters the shell never interprets are returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use ganesha_exports::adapters::command::shell_quote;
///
/// assert_eq!(shell_quote("/etc/ganesha/export.d"), "/etc/ganesha/export.d");
/// assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
/// ```
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r#"'"'"'"#))
    }
}

/// Renders an argv as a shell command line, for logs and errors
pub fn display_command<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .map(|word| shell_quote(word.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("EXPORT(Export_Id=101)"), "'EXPORT(Export_Id=101)'");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("cat > /tmp/x"), "'cat > /tmp/x'");
        assert_eq!(shell_quote("uint16:101"), "uint16:101");
    }

    #[test]
    fn test_display_command() {
        assert_eq!(
            display_command(&["sh", "-c", "cat > /tmp/a"]),
            "sh -c 'cat > /tmp/a'"
        );
    }
}
