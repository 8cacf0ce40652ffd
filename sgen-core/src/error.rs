//! Error types for sgen test data generation.

use thiserror::Error;

/// Main error type for sgen.
///
/// Every variant is a programmer error surfaced synchronously: either a
/// field, validator or schema was configured inconsistently, or a validator
/// asked a field for a value the field cannot produce.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SgenError {
    /// Two mutually exclusive field options were set together.
    #[error("The {first} and {second} parameters cannot be passed simultaneously")]
    ConflictingOptions {
        first: &'static str,
        second: &'static str,
    },

    /// More than one validator was attached to a single field.
    #[error("Currently several validators are not supported (got {count})")]
    MultipleValidators { count: usize },

    /// A bounded validator was constructed with neither bound.
    #[error("{validator}: one of the parameters min, max is required")]
    MissingBounds { validator: &'static str },

    /// The effective minimum is not below the effective maximum.
    #[error("{validator}: the minimum value ({min}) cannot be greater than or equal to the maximum ({max})")]
    InvertedBounds {
        validator: &'static str,
        min: String,
        max: String,
    },

    /// A stepped field was given a step that cannot move a bound.
    #[error("{kind}: step must be positive (got {step})")]
    InvalidStep { kind: &'static str, step: String },

    /// Length negative generation was asked for a length below zero.
    #[error("Invalid collection length: -1 (the minimum length is 0)")]
    DegenerateLength,

    /// A range bound cannot be stepped without leaving the domain.
    #[error("{kind}: bound {bound} cannot be stepped without overflowing")]
    BoundOverflow { kind: &'static str, bound: String },

    /// No value distinct from the rejected set was found in time.
    #[error("{kind}: domain too small to synthesize a distinct value after {attempts} attempts")]
    DomainExhausted { kind: &'static str, attempts: usize },

    /// A validator was attached to a field kind lacking the capability it needs.
    #[error("{validator} is not supported by {kind} fields")]
    UnsupportedValidator {
        validator: &'static str,
        kind: &'static str,
    },

    /// Two schema fields share a name.
    #[error("Field {name:?} is declared more than once")]
    DuplicateField { name: String },

    /// A schema was built without any field.
    #[error("A schema must declare at least one field")]
    EmptySchema,
}

/// Result type for sgen operations.
pub type Result<T> = std::result::Result<T, SgenError>;
