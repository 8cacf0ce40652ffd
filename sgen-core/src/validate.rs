//! Validators deriving boundary values from declared constraints.
//!
//! A validator never checks data. It turns its constraint into the values
//! sitting just inside (positive) and just outside (negative) the
//! constraint, asking the field's domain for help through a capability
//! trait: [`Sequence`] for [`Length`], [`Stepped`] for [`Range`] and
//! [`Distinct`] for [`Equal`], [`OneOf`] and [`NoneOf`].

use crate::data::Context;
use crate::error::{Result, SgenError};
use crate::field::{Distinct, Sequence, Stepped};
use crate::value::Value;
use std::fmt;

/// Derives positive and negative values for a field domain `D`.
pub trait Validator<D: ?Sized>: fmt::Debug {
    fn positive(&self, domain: &D, cx: &mut Context) -> Result<Vec<Value>>;

    fn negative(&self, domain: &D, cx: &mut Context) -> Result<Vec<Value>>;

    /// Whether the validator only constrains how long a value is.
    fn shapes_length(&self) -> bool {
        false
    }
}

/// Optional minimum and maximum with their inclusivity.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub min_inclusive: bool,
    pub max_inclusive: bool,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Bounds {
            min: None,
            max: None,
            min_inclusive: true,
            max_inclusive: true,
        }
    }
}

impl<T> Bounds<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: T) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }

    /// The minimum itself is outside the valid range.
    pub fn min_exclusive(mut self) -> Self {
        self.min_inclusive = false;
        self
    }

    /// The maximum itself is outside the valid range.
    pub fn max_exclusive(mut self) -> Self {
        self.max_inclusive = false;
        self
    }
}

/// Constrains the length of a string or collection.
///
/// Exclusive bounds are folded into inclusive ones at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    min: Option<usize>,
    max: Option<usize>,
}

impl Length {
    pub fn new(bounds: Bounds<usize>) -> Result<Self> {
        if bounds.min.is_none() && bounds.max.is_none() {
            return Err(SgenError::MissingBounds { validator: "Length" });
        }

        let min = bounds
            .min
            .map(|min| if bounds.min_inclusive { min } else { min.saturating_add(1) });
        let max = match bounds.max {
            Some(max) if !bounds.max_inclusive => Some(max.checked_sub(1).ok_or_else(|| {
                SgenError::InvertedBounds {
                    validator: "Length",
                    min: "0".to_string(),
                    max: "0 (exclusive)".to_string(),
                }
            })?),
            max => max,
        };

        if let (Some(min), Some(max)) = (min, max) {
            if min >= max {
                return Err(SgenError::InvertedBounds {
                    validator: "Length",
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }

        Ok(Length { min, max })
    }

    pub fn between(min: usize, max: usize) -> Result<Self> {
        Self::new(Bounds::new().min(min).max(max))
    }

    pub fn at_least(min: usize) -> Result<Self> {
        Self::new(Bounds::new().min(min))
    }

    pub fn at_most(max: usize) -> Result<Self> {
        Self::new(Bounds::new().max(max))
    }

    /// Effective inclusive minimum.
    pub fn min(&self) -> Option<usize> {
        self.min
    }

    /// Effective inclusive maximum.
    pub fn max(&self) -> Option<usize> {
        self.max
    }
}

impl<D: Sequence> Validator<D> for Length {
    fn positive(&self, domain: &D, cx: &mut Context) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        if let Some(min) = self.min {
            values.extend(domain.generate(min, cx)?);
        }
        if let Some(max) = self.max {
            values.extend(domain.generate(max, cx)?);
        }
        Ok(values)
    }

    fn negative(&self, domain: &D, cx: &mut Context) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        if let Some(min) = self.min {
            let below = min.checked_sub(1).ok_or(SgenError::DegenerateLength)?;
            values.extend(domain.generate(below, cx)?);
        }
        if let Some(max) = self.max {
            let above = max.checked_add(1).ok_or_else(|| SgenError::BoundOverflow {
                kind: D::KIND,
                bound: max.to_string(),
            })?;
            values.extend(domain.generate(above, cx)?);
        }
        Ok(values)
    }

    fn shapes_length(&self) -> bool {
        true
    }
}

/// Constrains an ordered value (integer, float, date, date-time).
///
/// Inclusivity is kept as given: how far "just inside" an exclusive bound
/// lies depends on the step of the field the range is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct Range<T> {
    bounds: Bounds<T>,
}

impl<T> Range<T>
where
    T: Clone + PartialOrd + fmt::Debug,
{
    pub fn new(bounds: Bounds<T>) -> Result<Self> {
        match (&bounds.min, &bounds.max) {
            (None, None) => return Err(SgenError::MissingBounds { validator: "Range" }),
            (Some(min), Some(max)) if !matches!(min.partial_cmp(max), Some(std::cmp::Ordering::Less)) => {
                return Err(SgenError::InvertedBounds {
                    validator: "Range",
                    min: format!("{min:?}"),
                    max: format!("{max:?}"),
                });
            }
            _ => {}
        }
        Ok(Range { bounds })
    }

    pub fn between(min: T, max: T) -> Result<Self> {
        Self::new(Bounds::new().min(min).max(max))
    }

    pub fn at_least(min: T) -> Result<Self> {
        Self::new(Bounds::new().min(min))
    }

    pub fn at_most(max: T) -> Result<Self> {
        Self::new(Bounds::new().max(max))
    }

    pub fn bounds(&self) -> &Bounds<T> {
        &self.bounds
    }
}

fn shifted<D: Stepped>(bound: &D::Bound, step: D::Step, ahead: bool) -> Result<Value> {
    D::shift(bound, step, ahead)
        .map(Into::into)
        .ok_or_else(|| SgenError::BoundOverflow {
            kind: D::KIND,
            bound: format!("{bound:?}"),
        })
}

impl<D, T> Validator<D> for Range<T>
where
    D: Stepped<Bound = T>,
    T: Clone + PartialOrd + fmt::Debug + Into<Value> + 'static,
{
    fn positive(&self, domain: &D, _cx: &mut Context) -> Result<Vec<Value>> {
        let step = domain.step();
        let mut values = Vec::new();
        if let Some(min) = &self.bounds.min {
            values.push(if self.bounds.min_inclusive {
                min.clone().into()
            } else {
                shifted::<D>(min, step, true)?
            });
        }
        if let Some(max) = &self.bounds.max {
            values.push(if self.bounds.max_inclusive {
                max.clone().into()
            } else {
                shifted::<D>(max, step, false)?
            });
        }
        Ok(values)
    }

    fn negative(&self, domain: &D, _cx: &mut Context) -> Result<Vec<Value>> {
        let step = domain.step();
        let mut values = Vec::new();
        if let Some(min) = &self.bounds.min {
            values.push(if self.bounds.min_inclusive {
                shifted::<D>(min, step, false)?
            } else {
                min.clone().into()
            });
        }
        if let Some(max) = &self.bounds.max {
            values.push(if self.bounds.max_inclusive {
                shifted::<D>(max, step, true)?
            } else {
                max.clone().into()
            });
        }
        Ok(values)
    }
}

/// Requires the value to equal `comparable`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equal<T> {
    comparable: T,
}

impl<T> Equal<T> {
    pub fn new(comparable: T) -> Self {
        Equal { comparable }
    }
}

impl<D, T> Validator<D> for Equal<T>
where
    D: Distinct<Item = T>,
    T: Clone + PartialEq + fmt::Debug + Into<Value> + 'static,
{
    fn positive(&self, _domain: &D, _cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![self.comparable.clone().into()])
    }

    fn negative(&self, domain: &D, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![domain.other_value(Some(&self.comparable), cx)?.into()])
    }
}

/// For every value in `seeds`, find a domain value outside `rejected`.
fn synthesize_outside<D: Distinct>(
    domain: &D,
    seeds: &[D::Item],
    rejected: &[D::Item],
    cx: &mut Context,
) -> Result<Vec<Value>> {
    let attempts = cx.config().retry_limit;
    let mut values = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let mut found = None;
        for attempt in 0..attempts {
            let candidate = domain.retry_value(seed, attempt, cx)?;
            if !rejected.contains(&candidate) {
                found = Some(candidate);
                break;
            }
        }
        match found {
            Some(candidate) => values.push(candidate.into()),
            None => {
                tracing::warn!(kind = D::KIND, attempts, "no distinct value found");
                return Err(SgenError::DomainExhausted {
                    kind: D::KIND,
                    attempts,
                });
            }
        }
    }
    Ok(values)
}

/// Requires the value to be one of `choices`.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOf<T> {
    choices: Vec<T>,
}

impl<T> OneOf<T> {
    pub fn new(choices: impl IntoIterator<Item = T>) -> Self {
        OneOf {
            choices: choices.into_iter().collect(),
        }
    }

    pub fn choices(&self) -> &[T] {
        &self.choices
    }
}

impl<D, T> Validator<D> for OneOf<T>
where
    D: Distinct<Item = T>,
    T: Clone + PartialEq + fmt::Debug + Into<Value> + 'static,
{
    fn positive(&self, _domain: &D, _cx: &mut Context) -> Result<Vec<Value>> {
        Ok(self.choices.iter().cloned().map(Into::into).collect())
    }

    fn negative(&self, domain: &D, cx: &mut Context) -> Result<Vec<Value>> {
        synthesize_outside(domain, &self.choices, &self.choices, cx)
    }
}

/// Requires the value to be none of `invalid_values`.
#[derive(Debug, Clone, PartialEq)]
pub struct NoneOf<T> {
    invalid_values: Vec<T>,
}

impl<T> NoneOf<T> {
    pub fn new(invalid_values: impl IntoIterator<Item = T>) -> Self {
        NoneOf {
            invalid_values: invalid_values.into_iter().collect(),
        }
    }

    pub fn invalid_values(&self) -> &[T] {
        &self.invalid_values
    }
}

impl<D, T> Validator<D> for NoneOf<T>
where
    D: Distinct<Item = T>,
    T: Clone + PartialEq + fmt::Debug + Into<Value> + 'static,
{
    fn positive(&self, domain: &D, cx: &mut Context) -> Result<Vec<Value>> {
        synthesize_outside(domain, &self.invalid_values, &self.invalid_values, cx)
    }

    fn negative(&self, _domain: &D, _cx: &mut Context) -> Result<Vec<Value>> {
        Ok(self.invalid_values.iter().cloned().map(Into::into).collect())
    }
}
