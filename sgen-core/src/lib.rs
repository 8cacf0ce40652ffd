//! Core functionality for sgen test data generation.
//!
//! This crate provides the building blocks for generating positive (should
//! pass validation) and negative (should fail validation) test records from
//! a declared schema: values, fields, validators and the schema combiner.

pub mod data;
pub mod error;
pub mod field;
pub mod schema;
pub mod validate;
pub mod value;

// Re-export the main types
pub use data::*;
pub use error::*;
pub use field::{
    Boolean, Collection, Date, DateTime, Distinct, Domain, Field, FieldBuilder, Float, Integer,
    Nested, Producer, Sequence, Stepped, Text,
};
pub use schema::*;
pub use validate::*;
pub use value::*;
