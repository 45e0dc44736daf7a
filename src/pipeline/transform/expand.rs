//! Shorthand-markup expansion through an external filter program.

use anyhow::{Result, bail};

use crate::utils::exec::{Cmd, FilterRule};

/// Deprecation chatter from old PHP filters.
static EXPANDER_FILTER: FilterRule = FilterRule::new(&["PHP Deprecated:", "Deprecated:"]);

/// The external expander: body on stdin, expanded HTML on stdout.
#[derive(Debug, Clone)]
pub struct Expander {
    argv: Vec<String>,
}

impl Expander {
    /// Split a command line on whitespace into program and arguments.
    pub fn new(command: &str) -> Result<Self> {
        let argv: Vec<String> = command.split_whitespace().map(String::from).collect();
        if argv.is_empty() {
            bail!("markup expander command is empty");
        }
        Ok(Self { argv })
    }

    /// Run the expander once. A spawn failure or non-zero exit is an error.
    pub fn expand(&self, body: &str) -> Result<String> {
        Cmd::from_slice(&self.argv)
            .stdin(body)
            .filter(&EXPANDER_FILTER)
            .run_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_pipes_body() {
        let expander = Expander::new("cat").unwrap();
        assert_eq!(expander.expand("line\n\nnext").unwrap(), "line\n\nnext");
    }

    #[test]
    fn test_expander_with_arguments() {
        let expander = Expander::new("sed s/a/b/").unwrap();
        assert_eq!(expander.expand("aaa").unwrap(), "baa");
    }

    #[test]
    fn test_large_body_round_trips() {
        let expander = Expander::new("cat").unwrap();
        let body = "a".repeat(400_000);
        assert_eq!(expander.expand(&body).unwrap().len(), 400_000);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(Expander::new("  ").is_err());
    }

    #[test]
    fn test_failure_is_error() {
        let expander = Expander::new("false").unwrap();
        assert!(expander.expand("x").is_err());
    }
}
