// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {std::path::PathBuf, thiserror::Error};

/// Unified error type for release verification.
#[derive(Debug, Error)]
pub enum MasVerifyError {
    #[error("unknown command")]
    CliUnknownCommand,

    #[error("bad argument")]
    CliBadArgument,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("could not parse {field} from {path}")]
    ParseFailure { field: &'static str, path: PathBuf },

    #[error("{what} mismatch (expected {expected}, found {found}) in {path}")]
    Mismatch {
        what: &'static str,
        expected: String,
        found: String,
        path: PathBuf,
    },

    #[error("{program} failed: {message}")]
    ExternalTool { program: String, message: String },

    #[error("error interfacing with bundle: {0}")]
    Bundle(anyhow::Error),

    #[error("problems reported during verification")]
    VerificationProblems,
}

impl MasVerifyError {
    /// Construct an [Self::ExternalTool] from a program name and any displayable cause.
    pub fn tool(program: &str, message: impl std::fmt::Display) -> Self {
        Self::ExternalTool {
            program: program.to_string(),
            message: message.to_string(),
        }
    }
}
