//! Record schemas and the Cartesian combiner.
//!
//! A [`Schema`] is an ordered list of named producers. Positive records are
//! the full Cartesian product of every field's positive value set. Negative
//! records are built slice by slice: each slice puts exactly one field in
//! its negative state and every other field in its positive state, so every
//! negative record is attributable to a single failing field.
//!
//! Value sets are materialised once per pass; records themselves are
//! produced lazily by [`Records`], an odometer over those sets where the
//! leftmost axis varies slowest.

use crate::data::Context;
use crate::error::{Result, SgenError};
use crate::field::Producer;
use crate::value::{Record, Value};
use std::collections::VecDeque;
use std::fmt;

/// Which value set of a field is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Positive,
    Negative,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Positive => write!(f, "positive"),
            Mode::Negative => write!(f, "negative"),
        }
    }
}

/// A field name bound to one of its value sets.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub values: Vec<Value>,
}

/// Anything that can enumerate its named fields as a [`Schema`].
///
/// `#[derive(Declare)]` implements this for structs whose fields are
/// themselves producers.
pub trait Declare {
    fn declare(self) -> Result<Schema>;
}

impl Declare for Schema {
    fn declare(self) -> Result<Schema> {
        Ok(self)
    }
}

/// An ordered set of named fields.
pub struct Schema {
    fields: Vec<(String, Box<dyn Producer>)>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every field with its value set for `mode`, in declaration order.
    pub fn fields(&self, mode: Mode, cx: &mut Context) -> Result<Vec<SchemaField>> {
        self.fields
            .iter()
            .map(|(name, producer)| {
                let values = match mode {
                    Mode::Positive => producer.positive(cx)?,
                    Mode::Negative => producer.negative(cx)?,
                };
                Ok(SchemaField {
                    name: name.clone(),
                    values,
                })
            })
            .collect()
    }

    /// Records expected to pass validation.
    pub fn positive(&self, cx: &mut Context) -> Result<Records> {
        let fields = self.fields(Mode::Positive, cx)?;
        let order = (0..fields.len()).collect();
        let product = Product::new(None, fields, order);
        tracing::debug!(fields = self.len(), records = product.size(), "built positive pass");
        Ok(Records::new(vec![product]))
    }

    /// Records expected to fail validation, each in exactly one field.
    pub fn negative(&self, cx: &mut Context) -> Result<Records> {
        let positive = self.fields(Mode::Positive, cx)?;
        let negative = self.fields(Mode::Negative, cx)?;

        let mut slices = Vec::with_capacity(self.len());
        for (invalid, field) in negative.into_iter().enumerate() {
            let mut columns = positive.clone();
            let name = field.name.clone();
            columns[invalid] = field;

            let order = std::iter::once(invalid)
                .chain((0..columns.len()).filter(|&column| column != invalid))
                .collect();
            slices.push(Product::new(Some(name), columns, order));
        }

        tracing::debug!(
            fields = self.len(),
            slices = slices.len(),
            records = slices.iter().map(Product::size).sum::<u128>(),
            "built negative pass"
        );
        Ok(Records::new(slices))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|(name, producer)| (name, producer.kind())))
            .finish()
    }
}

/// Builder for [`Schema`].
#[derive(Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, Box<dyn Producer>)>,
}

impl SchemaBuilder {
    /// Declare the next field.
    pub fn field<P>(mut self, name: impl Into<String>, producer: P) -> Self
    where
        P: Producer + 'static,
    {
        self.fields.push((name.into(), Box::new(producer)));
        self
    }

    pub fn build(self) -> Result<Schema> {
        if self.fields.is_empty() {
            return Err(SgenError::EmptySchema);
        }
        for (index, (name, _)) in self.fields.iter().enumerate() {
            if self.fields[..index].iter().any(|(other, _)| other == name) {
                return Err(SgenError::DuplicateField { name: name.clone() });
            }
        }
        Ok(Schema {
            fields: self.fields,
        })
    }
}

impl<P: Producer + ?Sized> Producer for Box<P> {
    fn positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        (**self).positive(cx)
    }

    fn negative(&self, cx: &mut Context) -> Result<Vec<Value>> {
        (**self).negative(cx)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

/// Size of one slice of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceSize {
    /// The field held in its negative state, `None` for a positive pass.
    pub invalid: Option<String>,
    pub records: u128,
}

/// Odometer over the value sets of one slice.
#[derive(Debug)]
struct Product {
    invalid: Option<String>,
    columns: Vec<SchemaField>,
    /// Column indices from the slowest axis to the fastest.
    order: Vec<usize>,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl Product {
    fn new(invalid: Option<String>, columns: Vec<SchemaField>, order: Vec<usize>) -> Self {
        let exhausted = columns.iter().any(|column| column.values.is_empty());
        Product {
            invalid,
            cursor: vec![0; columns.len()],
            columns,
            order,
            exhausted,
        }
    }

    fn size(&self) -> u128 {
        self.columns
            .iter()
            .map(|column| column.values.len() as u128)
            .fold(1, u128::saturating_mul)
    }

    fn record(&self) -> Record {
        Record::from_entries(
            self.columns
                .iter()
                .zip(&self.cursor)
                .map(|(column, &at)| (column.name.clone(), column.values[at].clone())),
        )
    }

    fn advance(&mut self) {
        for &column in self.order.iter().rev() {
            self.cursor[column] += 1;
            if self.cursor[column] < self.columns[column].values.len() {
                return;
            }
            self.cursor[column] = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for Product {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.exhausted {
            return None;
        }
        let record = self.record();
        self.advance();
        Some(record)
    }
}

/// Lazy sequence of generated records.
#[derive(Debug)]
pub struct Records {
    slices: VecDeque<Product>,
}

impl Records {
    fn new(slices: Vec<Product>) -> Self {
        Records {
            slices: slices.into(),
        }
    }

    /// Record count of every slice, as built.
    pub fn sizes(&self) -> Vec<SliceSize> {
        self.slices
            .iter()
            .map(|slice| SliceSize {
                invalid: slice.invalid.clone(),
                records: slice.size(),
            })
            .collect()
    }
}

impl Iterator for Records {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        while let Some(slice) = self.slices.front_mut() {
            if let Some(record) = slice.next() {
                return Some(record);
            }
            self.slices.pop_front();
        }
        None
    }
}
