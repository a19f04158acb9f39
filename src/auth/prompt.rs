//! Operator input for the one-time authorization code

use std::io::{self, BufRead, Write};

use crate::error::{DrivebackError, DrivebackResult};

/// Where the session manager suspends while waiting for an authorization code
pub trait CodePrompt {
    /// Show `authorization_url` to the operator and return the code they obtained
    fn request_code(&mut self, authorization_url: &str) -> DrivebackResult<String>;
}

/// Prompts on a writer and reads a single line back
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> CodePrompt for LinePrompt<R, W> {
    fn request_code(&mut self, authorization_url: &str) -> DrivebackResult<String> {
        writeln!(self.output, "Please go to this URL: {}", authorization_url)?;
        write!(self.output, "Enter the authorization code: ")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;

        let code = line.trim();
        if code.is_empty() {
            return Err(DrivebackError::Auth(
                "No authorization code entered; authorization abandoned".into(),
            ));
        }
        Ok(code.to_string())
    }
}
