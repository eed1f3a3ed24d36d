// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::ReadlineError;

/// What the background input task publishes: one finished line, or the error that
/// stopped it.
#[derive(Debug, Clone, PartialEq)]
pub enum LineResult {
    /// Raw bytes of the line, without the trailing newline.
    Line(Vec<u8>),
    Failed(ReadlineError),
}

impl LineResult {
    /// # Errors
    ///
    /// Returns the error carried by [`LineResult::Failed`].
    pub fn into_result(self) -> Result<Vec<u8>, ReadlineError> {
        match self {
            LineResult::Line(bytes) => Ok(bytes),
            LineResult::Failed(error) => Err(error),
        }
    }
}

impl From<Result<Vec<u8>, ReadlineError>> for LineResult {
    fn from(result: Result<Vec<u8>, ReadlineError>) -> Self {
        match result {
            Ok(bytes) => LineResult::Line(bytes),
            Err(error) => LineResult::Failed(error),
        }
    }
}
