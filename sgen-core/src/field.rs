//! Fields: typed value domains producing positive and negative value sets.
//!
//! A [`Field`] couples a [`Domain`] (what kind of value it holds) with the
//! options every field shares: one optional validator, override producers,
//! `allow_none`, `required` and `default`. Fields are assembled through a
//! [`FieldBuilder`], which enforces the configuration invariants once, at
//! construction.
//!
//! Validators reach back into the domain through capability traits:
//! [`Sequence`] for Length, [`Stepped`] for Range and [`Distinct`] for
//! Equal, OneOf and NoneOf. A validator only implements
//! [`Validator<D>`](crate::validate::Validator) for domains carrying the
//! capability it needs, so attaching it to the wrong kind of field does not
//! type-check.

use crate::data::Context;
use crate::error::{Result, SgenError};
use crate::schema::Schema;
use crate::validate::Validator;
use crate::value::{Value, ValuesStorage};
use std::fmt;

pub mod collection;
pub mod nested;
pub mod scalar;
pub mod temporal;

pub use collection::Collection;
pub use nested::Nested;
pub use scalar::{Boolean, Float, Integer, Text};
pub use temporal::{Date, DateTime};

/// The value domain of a field.
pub trait Domain: 'static {
    /// Human readable kind name used in errors and diagnostics.
    const KIND: &'static str;

    /// Organically typed value(s) registered when no validator is attached.
    fn intrinsic_positive(&self, cx: &mut Context) -> Result<Vec<Value>>;

    /// Wrong-typed value(s) registered when no validator is attached.
    fn intrinsic_negative(&self, cx: &mut Context) -> Result<Vec<Value>>;

    /// Reject domain settings that could never generate sensible values.
    fn check(&self) -> Result<()> {
        Ok(())
    }

    /// Values a validator contributes to the positive set.
    fn constrained_positive(
        &self,
        validator: &dyn Validator<Self>,
        cx: &mut Context,
    ) -> Result<Vec<Value>> {
        validator.positive(self, cx)
    }

    /// Values a validator contributes to the negative set.
    fn constrained_negative(
        &self,
        validator: &dyn Validator<Self>,
        cx: &mut Context,
    ) -> Result<Vec<Value>> {
        validator.negative(self, cx)
    }

    /// Last chance to rewrite or drop a candidate before it is registered.
    fn admit(&self, value: Value, _constrained: bool) -> Option<Value> {
        Some(value)
    }
}

/// Capability used by Length: build values of an exact length.
pub trait Sequence: Domain {
    /// Candidate values whose length is exactly `length`.
    fn generate(&self, length: usize, cx: &mut Context) -> Result<Vec<Value>>;
}

/// Capability used by Range: move a bound by the smallest meaningful step.
pub trait Stepped: Domain {
    type Bound: Clone + PartialOrd + fmt::Debug + Into<Value> + 'static;
    type Step: Copy + fmt::Debug;

    /// Smallest meaningful increment of the domain.
    fn step(&self) -> Self::Step;

    /// `bound` moved one `step` up (`ahead`) or down, `None` on overflow.
    fn shift(bound: &Self::Bound, step: Self::Step, ahead: bool) -> Option<Self::Bound>;
}

/// Capability used by Equal, OneOf and NoneOf.
pub trait Distinct: Domain {
    type Item: Clone + PartialEq + fmt::Debug + Into<Value> + 'static;

    /// A value of the same domain that differs from `value`.
    fn other_value(&self, value: Option<&Self::Item>, cx: &mut Context) -> Result<Self::Item>;

    /// Candidate for the `attempt`-th try at moving away from `value`.
    ///
    /// Unbounded domains vary the candidate between attempts so a collision
    /// with a rejected value can be escaped.
    fn retry_value(&self, value: &Self::Item, _attempt: usize, cx: &mut Context) -> Result<Self::Item> {
        self.other_value(Some(value), cx)
    }
}

/// Object-safe generation surface every field exposes to a schema.
pub trait Producer {
    /// Values that should pass validation, in registration order.
    fn positive(&self, cx: &mut Context) -> Result<Vec<Value>>;

    /// Values that should fail validation, in registration order.
    fn negative(&self, cx: &mut Context) -> Result<Vec<Value>>;

    /// Kind name of the underlying domain.
    fn kind(&self) -> &'static str;
}

type DataFrom = Box<dyn Fn() -> Vec<Value>>;

/// A configured field.
pub struct Field<D: Domain> {
    domain: D,
    validator: Option<Box<dyn Validator<D>>>,
    positive_data_from: Option<DataFrom>,
    negative_data_from: Option<DataFrom>,
    allow_none: bool,
    required: bool,
    default: Option<Value>,
}

impl<D: Domain> Field<D> {
    /// Start configuring a field over `domain`.
    pub fn builder(domain: D) -> FieldBuilder<D> {
        FieldBuilder::new(domain)
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn allow_none(&self) -> bool {
        self.allow_none
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    fn register(&self, storage: &mut ValuesStorage, value: Value) {
        if let Some(value) = self.domain.admit(value, self.validator.is_some()) {
            storage.register(value);
        }
    }
}

impl<D: Domain> Producer for Field<D> {
    fn positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        if let Some(data_from) = &self.positive_data_from {
            return Ok(data_from());
        }

        let mut storage = ValuesStorage::new();

        if let Some(validator) = &self.validator {
            tracing::trace!(kind = D::KIND, ?validator, "positive validator values");
            for value in self.domain.constrained_positive(validator.as_ref(), cx)? {
                self.register(&mut storage, value);
            }
        }

        if self.allow_none {
            self.register(&mut storage, Value::Null);
        }

        if let Some(default) = &self.default {
            self.register(&mut storage, default.clone());
        }

        if !self.required {
            self.register(&mut storage, Value::Missing);
        }

        if self.validator.is_none() {
            for value in self.domain.intrinsic_positive(cx)? {
                self.register(&mut storage, value);
            }
        }

        tracing::debug!(kind = D::KIND, count = storage.len(), "built positive value set");
        Ok(storage.into_values())
    }

    fn negative(&self, cx: &mut Context) -> Result<Vec<Value>> {
        if let Some(data_from) = &self.negative_data_from {
            return Ok(data_from());
        }

        let mut storage = ValuesStorage::new();

        if let Some(validator) = &self.validator {
            tracing::trace!(kind = D::KIND, ?validator, "negative validator values");
            for value in self.domain.constrained_negative(validator.as_ref(), cx)? {
                self.register(&mut storage, value);
            }
        }

        if !self.allow_none {
            self.register(&mut storage, Value::Null);
        }

        if self.required {
            self.register(&mut storage, Value::Missing);
        }

        if self.validator.is_none() {
            for value in self.domain.intrinsic_negative(cx)? {
                self.register(&mut storage, value);
            }
        }

        tracing::debug!(kind = D::KIND, count = storage.len(), "built negative value set");
        Ok(storage.into_values())
    }

    fn kind(&self) -> &'static str {
        D::KIND
    }
}

impl<D: Domain + fmt::Debug> fmt::Debug for Field<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("domain", &self.domain)
            .field("validator", &self.validator)
            .field("positive_data_from", &self.positive_data_from.is_some())
            .field("negative_data_from", &self.negative_data_from.is_some())
            .field("allow_none", &self.allow_none)
            .field("required", &self.required)
            .field("default", &self.default)
            .finish()
    }
}

/// Builder for [`Field`].
pub struct FieldBuilder<D: Domain> {
    domain: D,
    validators: Vec<Box<dyn Validator<D>>>,
    positive_data_from: Option<DataFrom>,
    negative_data_from: Option<DataFrom>,
    allow_none: bool,
    required: bool,
    default: Option<Value>,
}

impl<D: Domain> FieldBuilder<D> {
    pub fn new(domain: D) -> Self {
        FieldBuilder {
            domain,
            validators: Vec::new(),
            positive_data_from: None,
            negative_data_from: None,
            allow_none: true,
            required: false,
            default: None,
        }
    }

    /// Attach a validator. Only one validator per field is supported;
    /// attaching a second one makes [`build`](Self::build) fail.
    pub fn validate<V>(mut self, validator: V) -> Self
    where
        V: Validator<D> + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// Replace every generated positive value with the output of `producer`.
    pub fn positive_data_from<F, I>(mut self, producer: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.positive_data_from = Some(Box::new(move || {
            producer().into_iter().map(Into::into).collect()
        }));
        self
    }

    /// Replace every generated negative value with the output of `producer`.
    pub fn negative_data_from<F, I>(mut self, producer: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.negative_data_from = Some(Box::new(move || {
            producer().into_iter().map(Into::into).collect()
        }));
        self
    }

    pub fn allow_none(mut self, allow_none: bool) -> Self {
        self.allow_none = allow_none;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Value registered as positive; implies the field may be omitted.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = if value.is_null() { None } else { Some(value) };
        self
    }

    pub fn build(self) -> Result<Field<D>> {
        self.domain.check()?;

        if self.validators.len() > 1 {
            return Err(SgenError::MultipleValidators {
                count: self.validators.len(),
            });
        }

        if self.default.is_some() {
            if self.positive_data_from.is_some() || self.negative_data_from.is_some() {
                return Err(SgenError::ConflictingOptions {
                    first: "data_from",
                    second: "default",
                });
            }
            if self.required {
                return Err(SgenError::ConflictingOptions {
                    first: "required",
                    second: "default",
                });
            }
        }

        Ok(Field {
            domain: self.domain,
            validator: self.validators.into_iter().next(),
            positive_data_from: self.positive_data_from,
            negative_data_from: self.negative_data_from,
            allow_none: self.allow_none,
            required: self.required,
            default: self.default,
        })
    }
}

/// A string field.
pub fn string() -> FieldBuilder<Text> {
    FieldBuilder::new(Text)
}

/// An integer field with step 1.
pub fn integer() -> FieldBuilder<Integer> {
    FieldBuilder::new(Integer::default())
}

/// A float field with step 0.01.
pub fn float() -> FieldBuilder<Float> {
    FieldBuilder::new(Float::default())
}

pub fn boolean() -> FieldBuilder<Boolean> {
    FieldBuilder::new(Boolean)
}

/// A date-time field with a one day step.
pub fn datetime() -> FieldBuilder<DateTime> {
    FieldBuilder::new(DateTime::default())
}

/// A date field with a one day step.
pub fn date() -> FieldBuilder<Date> {
    FieldBuilder::new(Date::default())
}

/// A list field whose elements come from `inner`.
pub fn collection<D: Domain>(inner: Field<D>) -> FieldBuilder<Collection<D>> {
    FieldBuilder::new(Collection::new(inner))
}

/// A field whose values are records of an embedded schema.
pub fn nested(schema: Schema) -> FieldBuilder<Nested> {
    FieldBuilder::new(Nested::new(schema))
}
