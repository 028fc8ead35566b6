//! Error types for localgreat.

use thiserror::Error;

/// Errors raised by the enrichment pipeline.
///
/// Everything except [`GreatError::InvalidRegion`] aborts a run. Invalid regions
/// are skipped and counted by [`crate::parser::bed::RegionSet::validate`].
#[derive(Error, Debug)]
pub enum GreatError {
    #[error("malformed gene annotation at line {line}: {reason}")]
    MalformedAnnotation { line: usize, reason: String },

    #[error("malformed {kind} input at line {line}: {reason}")]
    MalformedInput {
        kind: &'static str,
        line: usize,
        reason: String,
    },

    #[error("duplicate term '{term_id}' in category '{category}'")]
    DuplicateTerm { category: String, term_id: String },

    #[error("invalid region {region}: {reason}")]
    InvalidRegion { region: String, reason: String },

    #[error("no valid regions remain ({skipped} skipped)")]
    EmptyInput { skipped: usize },

    #[error("unknown association rule '{0}': expected basalPlusExt, twoClosest or oneClosest")]
    UnknownAssociationRule(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GreatError>;
