//! Date-time and date domains.

use super::{Distinct, Domain, Stepped};
use crate::data::Context;
use crate::error::{Result, SgenError};
use crate::value::Value;
use chrono::{Duration, NaiveDate, NaiveDateTime};

fn check_step(kind: &'static str, step: Duration) -> Result<()> {
    if step <= Duration::zero() {
        return Err(SgenError::InvalidStep {
            kind,
            step: step.to_string(),
        });
    }
    Ok(())
}

/// Date-time domain.
#[derive(Debug, Clone, Copy)]
pub struct DateTime {
    pub step: Duration,
}

impl Default for DateTime {
    fn default() -> Self {
        DateTime {
            step: Duration::days(1),
        }
    }
}

impl Domain for DateTime {
    const KIND: &'static str = "DateTime";

    fn intrinsic_positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![Value::DateTime(cx.source().now())])
    }

    fn intrinsic_negative(&self, _cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![Value::from("not_datetime")])
    }

    fn check(&self) -> Result<()> {
        check_step(Self::KIND, self.step)
    }
}

impl Stepped for DateTime {
    type Bound = NaiveDateTime;
    type Step = Duration;

    fn step(&self) -> Duration {
        self.step
    }

    fn shift(bound: &NaiveDateTime, step: Duration, ahead: bool) -> Option<NaiveDateTime> {
        if ahead {
            bound.checked_add_signed(step)
        } else {
            bound.checked_sub_signed(step)
        }
    }
}

impl Distinct for DateTime {
    type Item = NaiveDateTime;

    fn other_value(&self, value: Option<&NaiveDateTime>, cx: &mut Context) -> Result<NaiveDateTime> {
        let Some(value) = value else {
            return Ok(cx.source().now());
        };
        let offset = Duration::days(cx.source().int_range(1, 365))
            + Duration::minutes(cx.source().int_range(1, 60));
        value
            .checked_add_signed(offset)
            .or_else(|| value.checked_sub_signed(offset))
            .ok_or_else(|| SgenError::BoundOverflow {
                kind: Self::KIND,
                bound: value.to_string(),
            })
    }
}

/// Date domain.
#[derive(Debug, Clone, Copy)]
pub struct Date {
    pub step: Duration,
}

impl Default for Date {
    fn default() -> Self {
        Date {
            step: Duration::days(1),
        }
    }
}

impl Domain for Date {
    const KIND: &'static str = "Date";

    fn intrinsic_positive(&self, cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![Value::Date(cx.source().now().date())])
    }

    fn intrinsic_negative(&self, _cx: &mut Context) -> Result<Vec<Value>> {
        Ok(vec![Value::from("not_date")])
    }

    fn check(&self) -> Result<()> {
        check_step(Self::KIND, self.step)?;
        if self.step.num_days() == 0 {
            return Err(SgenError::InvalidStep {
                kind: Self::KIND,
                step: self.step.to_string(),
            });
        }
        Ok(())
    }
}

impl Stepped for Date {
    type Bound = NaiveDate;
    type Step = Duration;

    fn step(&self) -> Duration {
        self.step
    }

    fn shift(bound: &NaiveDate, step: Duration, ahead: bool) -> Option<NaiveDate> {
        if ahead {
            bound.checked_add_signed(step)
        } else {
            bound.checked_sub_signed(step)
        }
    }
}

impl Distinct for Date {
    type Item = NaiveDate;

    fn other_value(&self, value: Option<&NaiveDate>, cx: &mut Context) -> Result<NaiveDate> {
        let Some(value) = value else {
            return Ok(cx.source().now().date());
        };
        let offset = Duration::days(cx.source().int_range(1, 365));
        value
            .checked_add_signed(offset)
            .or_else(|| value.checked_sub_signed(offset))
            .ok_or_else(|| SgenError::BoundOverflow {
                kind: Self::KIND,
                bound: value.to_string(),
            })
    }
}
