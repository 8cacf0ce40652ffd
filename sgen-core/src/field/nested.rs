//! Sub-record domain backed by an embedded schema.

use super::Domain;
use crate::data::Context;
use crate::error::Result;
use crate::schema::Schema;
use crate::value::Value;

/// Domain whose values are whole records of an embedded schema.
#[derive(Debug)]
pub struct Nested {
    schema: Schema,
}

impl Nested {
    pub fn new(schema: Schema) -> Self {
        Nested { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl Domain for Nested {
    const KIND: &'static str = "Nested";

    fn intrinsic_positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(self.schema.positive(cx)?.map(Value::Record).collect())
    }

    fn intrinsic_negative(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(self.schema.negative(cx)?.map(Value::Record).collect())
    }
}
