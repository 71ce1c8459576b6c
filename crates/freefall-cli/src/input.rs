//! Console prompts. Values are whitespace-separated tokens, so several answers
//! may be typed on one line.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use freefall_core::WindMode;
use thiserror::Error;

use crate::config::ObjectSpec;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input ended before {0} was entered")]
    Eof(&'static str),
    #[error("could not read {field} from {token:?}")]
    Parse { field: &'static str, token: String },
    #[error("unknown wind type {0} (expected 0, 1 or 2)")]
    UnknownWindMode(i64),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, pending: VecDeque::new() }
    }

    /// Give back the output sink (tests read what was prompted).
    pub fn into_output(self) -> W {
        self.output
    }

    fn next_token(&mut self, field: &'static str) -> Result<String, InputError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(InputError::Eof(field));
            }
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }
    }

    /// Print `prompt` and parse the next token as `T`.
    ///
    /// # Errors
    /// Fails on end of input, an unparsable token, or a write error.
    pub fn ask<T: FromStr>(&mut self, prompt: &str, field: &'static str) -> Result<T, InputError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let token = self.next_token(field)?;
        match token.parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(InputError::Parse { field, token }),
        }
    }

    /// # Errors
    /// See [`Prompter::ask`].
    pub fn object_count(&mut self) -> Result<u32, InputError> {
        self.ask("Enter the number of objects to simulate: ", "number of objects")
    }

    /// Menu of wind types; asks for a strength when the custom type is picked.
    ///
    /// # Errors
    /// See [`Prompter::ask`]; codes other than 0, 1 or 2 are rejected.
    pub fn wind_mode(&mut self) -> Result<WindMode, InputError> {
        let menu = "\nChoose wind type:\n\
                    0: Random Wind (Oscillates and switches direction)\n\
                    1: No Wind\n\
                    2: Custom Wind (Enter wind strength)\n";
        let code: i64 = self.ask(menu, "wind type")?;
        match code {
            0 => Ok(WindMode::Random),
            1 => Ok(WindMode::None),
            2 => {
                let strength = self.ask(
                    "Enter custom wind strength (positive for right, negative for left): ",
                    "custom wind strength",
                )?;
                Ok(WindMode::Custom { strength })
            }
            other => Err(InputError::UnknownWindMode(other)),
        }
    }

    /// # Errors
    /// See [`Prompter::ask`].
    pub fn object(&mut self) -> Result<ObjectSpec, InputError> {
        let mass = self.ask("Enter the mass (kg): ", "mass")?;
        let initial_velocity = self.ask("Enter the initial velocity (m/s): ", "initial velocity")?;
        let initial_height = self.ask("Enter the initial height (m): ", "initial height")?;
        Ok(ObjectSpec { mass, initial_velocity, initial_height })
    }
}
