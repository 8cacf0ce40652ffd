//! List domain built over an inner field.
//!
//! Without a validator a collection yields, for every value of its inner
//! field, one list repeating that value a small random number of times.
//! With a Length validator the lists are shaped by the validator instead:
//! every inner value is repeated to exactly each boundary length.
//!
//! Under Length, negative generation covers two independent failure axes,
//! registered side by side: lists of a wrong length holding valid elements,
//! and lists of a boundary length holding invalid elements. Other
//! validators compare whole lists and only contribute their own negatives.

use super::{Distinct, Domain, Field, Producer, Sequence};
use crate::data::Context;
use crate::error::Result;
use crate::validate::Validator;
use crate::value::Value;
use std::fmt;

/// List domain whose elements come from an inner field.
pub struct Collection<D: Domain> {
    inner: Field<D>,
}

impl<D: Domain> Collection<D> {
    pub fn new(inner: Field<D>) -> Self {
        Collection { inner }
    }

    pub fn inner(&self) -> &Field<D> {
        &self.inner
    }

    fn repeated(&self, elements: Vec<Value>, cx: &mut Context) -> Vec<Value> {
        let range = cx.config().collection_length.clone();
        elements
            .into_iter()
            .map(|element| {
                let length = cx.source().length(&range);
                Value::List(vec![element; length])
            })
            .collect()
    }
}

impl<D: Domain> Domain for Collection<D> {
    const KIND: &'static str = "Collection";

    fn intrinsic_positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        let elements = self.inner.positive(cx)?;
        Ok(self.repeated(elements, cx))
    }

    fn intrinsic_negative(&self, cx: &mut Context) -> Result<Vec<Value>> {
        let elements = self.inner.negative(cx)?;
        Ok(self.repeated(elements, cx))
    }

    fn constrained_positive(
        &self,
        validator: &dyn Validator<Self>,
        cx: &mut Context,
    ) -> Result<Vec<Value>> {
        if !validator.shapes_length() {
            return validator.positive(self, cx);
        }
        let elements = self.inner.positive(cx)?;
        cx.with_elements(elements, |cx| validator.positive(self, cx))
    }

    fn constrained_negative(
        &self,
        validator: &dyn Validator<Self>,
        cx: &mut Context,
    ) -> Result<Vec<Value>> {
        if !validator.shapes_length() {
            return validator.negative(self, cx);
        }
        let valid = self.inner.positive(cx)?;
        let mut values = cx.with_elements(valid, |cx| validator.negative(self, cx))?;
        let invalid = self.inner.negative(cx)?;
        values.extend(cx.with_elements(invalid, |cx| validator.positive(self, cx))?);
        Ok(values)
    }

    /// Strip `Missing` out of list candidates. A list emptied by the
    /// stripping is dropped when a validator governs the lengths.
    fn admit(&self, value: Value, constrained: bool) -> Option<Value> {
        let Value::List(items) = value else {
            return Some(value);
        };
        let had_items = !items.is_empty();
        let items: Vec<Value> = items.into_iter().filter(|item| !item.is_missing()).collect();
        if constrained && had_items && items.is_empty() {
            return None;
        }
        Some(Value::List(items))
    }
}

impl<D: Domain> Sequence for Collection<D> {
    /// Repeats every prepared element to `length`, falling back to fresh
    /// positive elements outside a constrained call.
    fn generate(&self, length: usize, cx: &mut Context) -> Result<Vec<Value>> {
        let elements = match cx.elements() {
            Some(elements) => elements.to_vec(),
            None => self.inner.positive(cx)?,
        };
        Ok(elements
            .into_iter()
            .map(|element| Value::List(vec![element; length]))
            .collect())
    }
}

impl<D: Distinct> Distinct for Collection<D> {
    type Item = Vec<Value>;

    fn other_value(&self, value: Option<&Vec<Value>>, cx: &mut Context) -> Result<Vec<Value>> {
        match value {
            Some(items) if !items.is_empty() => Ok([items.as_slice(), items.as_slice()].concat()),
            _ => Ok(vec![self.inner.domain().other_value(None, cx)?.into()]),
        }
    }

    fn retry_value(&self, value: &Vec<Value>, attempt: usize, cx: &mut Context) -> Result<Vec<Value>> {
        if value.is_empty() {
            return self.other_value(Some(value), cx);
        }
        Ok(value.iter().cycle().take(value.len() * (attempt + 2)).cloned().collect())
    }
}

impl<D: Domain + fmt::Debug> fmt::Debug for Collection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection").field("inner", &self.inner).finish()
    }
}
