/// Error types for region sets, catalogs and aggregation
use thiserror::Error;

use crate::scheme::SchemeId;

/// Main error type for region operations
#[derive(Error, Debug)]
pub enum RegionError {
    /// Read or write against an ID the scheme does not define
    #[error("Invalid region ID {id:?} for scheme {scheme}")]
    InvalidRegionId { id: String, scheme: SchemeId },

    /// The same ID appears twice in a reference list
    #[error("Duplicate region ID {id:?} in {origin}")]
    DuplicateId { id: String, origin: String },

    /// Two region sets (or a set and a cross-reference) belong to different schemes
    #[error("Scheme mismatch: {left} is not compatible with {right}")]
    SchemeMismatch { left: SchemeId, right: SchemeId },

    /// Arithmetic or aggregation on non-numeric data
    #[error("Non-numeric operand: {0}")]
    NonNumericOperand(String),

    /// Aggregation weights contain absent values
    #[error("Incomplete weights, missing regions: {}", .0.join(", "))]
    IncompleteWeights(Vec<String>),

    /// Operator other than + - * / requested by symbol
    #[error("Unsupported operator: {0:?}")]
    UnsupportedOperator(String),

    /// A required argument or field was not supplied
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// Elementwise division by zero
    #[error("Division by zero in region {0:?}")]
    DivisionByZero(String),

    /// The catalog has no containment table for this scheme pair
    #[error("No cross-reference from {fine} to {coarse}")]
    UnsupportedCrossReference { fine: SchemeId, coarse: SchemeId },

    /// Scheme name not recognized
    #[error("Unknown scheme: {0:?}")]
    UnknownScheme(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to read a reference file
    #[error("Failed to read reference file: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using RegionError
pub type Result<T> = std::result::Result<T, RegionError>;
