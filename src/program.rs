//! Loading program images
//!
//! A program is a comma-separated list of signed decimal integers. Whitespace
//! around entries (including a trailing newline) is ignored.

use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid integer '{token}' at position {position}")]
    InvalidInteger { position: usize, token: String },

    #[error("Program is empty")]
    Empty,
}

/// Parse program text into an initial memory image
pub fn parse_program(source: &str) -> Result<Vec<i64>, ProgramError> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(ProgramError::Empty);
    }

    trimmed
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(position, token)| {
            token.parse().map_err(|_| ProgramError::InvalidInteger {
                position,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Read and parse a program file
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Vec<i64>, ProgramError> {
    let source = fs::read_to_string(path)?;
    parse_program(&source)
}
