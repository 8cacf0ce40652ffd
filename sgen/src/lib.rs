//! sgen test data generator.
//!
//! This is the main entry point for sgen, providing a convenient API for
//! generating positive and negative test records in Rust.
//!
//! ```
//! use sgen::*;
//!
//! # fn main() -> sgen::Result<()> {
//! let schema = Schema::builder()
//!     .field("model", field::string().validate(OneOf::new(["Jaguar XF".to_string()])).build()?)
//!     .field("year", field::integer().validate(Range::between(1900, 2024)?).required(true).build()?)
//!     .build()?;
//!
//! let mut cx = Context::seeded(42);
//! for record in schema.positive(&mut cx)? {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```

pub use sgen_core::*;

// Re-export derive macros when available
#[cfg(feature = "derive")]
pub use sgen_derive::*;
