//! String, integer, float and boolean domains.

use super::{Distinct, Domain, Sequence, Stepped};
use crate::data::Context;
use crate::error::{Result, SgenError};
use crate::value::Value;

/// Span of intrinsic integers and of the wrong-typed integer for strings.
const INT_SPAN: (i64, i64) = (-100, 100);

/// Length span of the wrong-typed string for non-string fields.
const WRONG_STRING_LENGTH: (i64, i64) = (5, 10);

/// Offset span used to move an integer away from a compared value.
const INT_OTHER_SPAN: (i64, i64) = (10, 100_000);

/// Offset span, in hundredths, used to move a float away from a compared value.
const FLOAT_OTHER_SPAN: (i64, i64) = (1_000_000, 100_000_000);

/// Length of the random suffix added when a synthesized string collides.
const RETRY_SUFFIX_LENGTH: usize = 6;

fn wrong_typed_string(cx: &mut Context) -> Value {
    let length = cx.source().int_range(WRONG_STRING_LENGTH.0, WRONG_STRING_LENGTH.1);
    Value::Str(cx.source().letters(length as usize))
}

/// String domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl Domain for Text {
    const KIND: &'static str = "String";

    fn intrinsic_positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        let range = cx.config().string_length.clone();
        let length = cx.source().length(&range);
        self.generate(length, cx)
    }

    fn intrinsic_negative(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![Value::Int(cx.source().int_range(INT_SPAN.0, INT_SPAN.1))])
    }
}

impl Sequence for Text {
    fn generate(&self, length: usize, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![Value::Str(cx.source().letters(length))])
    }
}

impl Distinct for Text {
    type Item = String;

    fn other_value(&self, value: Option<&String>, _cx: &mut Context) -> Result<String> {
        Ok(match value {
            None => "not_comparable".to_string(),
            Some(value) => format!("not_{value}"),
        })
    }

    fn retry_value(&self, value: &String, attempt: usize, cx: &mut Context) -> Result<String> {
        if attempt == 0 {
            return self.other_value(Some(value), cx);
        }
        Ok(format!("not_{value}_{}", cx.source().letters(RETRY_SUFFIX_LENGTH)))
    }
}

/// Integer domain.
#[derive(Debug, Clone, Copy)]
pub struct Integer {
    pub step: i64,
}

impl Default for Integer {
    fn default() -> Self {
        Integer { step: 1 }
    }
}

impl Domain for Integer {
    const KIND: &'static str = "Integer";

    fn intrinsic_positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![Value::Int(cx.source().int_range(INT_SPAN.0, INT_SPAN.1))])
    }

    fn intrinsic_negative(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![wrong_typed_string(cx)])
    }

    fn check(&self) -> Result<()> {
        if self.step <= 0 {
            return Err(SgenError::InvalidStep {
                kind: Self::KIND,
                step: self.step.to_string(),
            });
        }
        Ok(())
    }
}

impl Stepped for Integer {
    type Bound = i64;
    type Step = i64;

    fn step(&self) -> i64 {
        self.step
    }

    fn shift(bound: &i64, step: i64, ahead: bool) -> Option<i64> {
        if ahead {
            bound.checked_add(step)
        } else {
            bound.checked_sub(step)
        }
    }
}

impl Distinct for Integer {
    type Item = i64;

    fn other_value(&self, value: Option<&i64>, cx: &mut Context) -> Result<i64> {
        let offset = cx.source().int_range(INT_OTHER_SPAN.0, INT_OTHER_SPAN.1);
        Ok(match value {
            None => offset,
            Some(&value) => value.checked_add(offset).unwrap_or(value - offset),
        })
    }
}

/// Floating point domain.
#[derive(Debug, Clone, Copy)]
pub struct Float {
    pub step: f64,
}

impl Default for Float {
    fn default() -> Self {
        Float { step: 0.01 }
    }
}

impl Domain for Float {
    const KIND: &'static str = "Float";

    fn intrinsic_positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        let hundredths = cx.source().int_range(INT_SPAN.0 * 100, INT_SPAN.1 * 100);
        Ok(vec![Value::Float(hundredths as f64 / 100.0)])
    }

    fn intrinsic_negative(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![wrong_typed_string(cx)])
    }

    fn check(&self) -> Result<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(SgenError::InvalidStep {
                kind: Self::KIND,
                step: self.step.to_string(),
            });
        }
        Ok(())
    }
}

impl Stepped for Float {
    type Bound = f64;
    type Step = f64;

    fn step(&self) -> f64 {
        self.step
    }

    fn shift(bound: &f64, step: f64, ahead: bool) -> Option<f64> {
        let shifted = if ahead { bound + step } else { bound - step };
        // Too large a bound swallows the step entirely.
        (shifted.is_finite() && shifted != *bound).then_some(shifted)
    }
}

impl Distinct for Float {
    type Item = f64;

    fn other_value(&self, value: Option<&f64>, cx: &mut Context) -> Result<f64> {
        let offset = cx.source().int_range(FLOAT_OTHER_SPAN.0, FLOAT_OTHER_SPAN.1) as f64 / 100.0;
        Ok(match value {
            None => offset,
            Some(value) => value + offset,
        })
    }
}

/// Boolean domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

impl Domain for Boolean {
    const KIND: &'static str = "Boolean";

    fn intrinsic_positive(&self, _cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![Value::Bool(true), Value::Bool(false)])
    }

    fn intrinsic_negative(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![wrong_typed_string(cx)])
    }
}

impl Distinct for Boolean {
    type Item = bool;

    fn other_value(&self, value: Option<&bool>, _cx: &mut Context) -> Result<bool> {
        Ok(match value {
            None => true,
            Some(value) => !value,
        })
    }
}
