//! JSON schema documents and their conversion into sgen schemas.
//!
//! ```json
//! { "fields": [
//!     { "name": "model", "type": "string", "required": true,
//!       "validate": { "one_of": ["Jaguar XF", "Volvo XC90"] } },
//!     { "name": "year", "type": "integer",
//!       "validate": { "range": { "min": 1900, "max": 2024 } } },
//!     { "name": "tags", "type": "collection", "of": { "type": "string" } }
//! ] }
//! ```

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value as Json;
use sgen_core::{
    Boolean, Bounds, Collection, Date, DateTime, Distinct, Domain, Equal, Field, FieldBuilder,
    Float, Integer, Length, Nested, NoneOf, OneOf, Producer, Range, Record, Schema, Sequence,
    SgenError, Stepped, Text, Value,
};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// A whole schema document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub fields: Vec<FieldDocument>,
}

/// Field kinds understood by the document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Date,
    Collection,
    Nested,
}

/// One field. `name` is omitted for the inner field of a collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub allow_none: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Json>,
    #[serde(default)]
    pub positive_data: Option<Vec<Json>>,
    #[serde(default)]
    pub negative_data: Option<Vec<Json>>,
    #[serde(default)]
    pub step: Option<serde_json::Number>,
    #[serde(default)]
    pub step_seconds: Option<i64>,
    #[serde(default)]
    pub step_days: Option<i64>,
    #[serde(default)]
    pub of: Option<Box<FieldDocument>>,
    #[serde(default)]
    pub schema: Option<SchemaDocument>,
    #[serde(default)]
    pub validate: Option<ValidatorDocument>,
}

/// Validator attached to a field, keyed by its name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorDocument {
    Length(BoundsDocument),
    Range(BoundsDocument),
    Equal(Json),
    OneOf(Vec<Json>),
    NoneOf(Vec<Json>),
}

impl ValidatorDocument {
    pub fn name(&self) -> &'static str {
        match self {
            ValidatorDocument::Length(_) => "Length",
            ValidatorDocument::Range(_) => "Range",
            ValidatorDocument::Equal(_) => "Equal",
            ValidatorDocument::OneOf(_) => "OneOf",
            ValidatorDocument::NoneOf(_) => "NoneOf",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundsDocument {
    #[serde(default)]
    pub min: Option<Json>,
    #[serde(default)]
    pub max: Option<Json>,
    #[serde(default = "default_true")]
    pub min_inclusive: bool,
    #[serde(default = "default_true")]
    pub max_inclusive: bool,
}

impl BoundsDocument {
    fn parse<T>(&self, parse: impl Fn(&Json) -> Result<T>) -> Result<Bounds<T>> {
        Ok(Bounds {
            min: self.min.as_ref().map(&parse).transpose()?,
            max: self.max.as_ref().map(&parse).transpose()?,
            min_inclusive: self.min_inclusive,
            max_inclusive: self.max_inclusive,
        })
    }
}

impl SchemaDocument {
    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema document: {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse schema document: {}", path.display()))
    }

    pub fn into_schema(self) -> Result<Schema> {
        let mut builder = Schema::builder();
        for field in self.fields {
            let name = field
                .name
                .clone()
                .ok_or_else(|| anyhow!("every schema field needs a name"))?;
            let producer = field
                .into_producer()
                .with_context(|| format!("Invalid field {name:?}"))?;
            builder = builder.field(name, producer);
        }
        Ok(builder.build()?)
    }
}

impl std::str::FromStr for SchemaDocument {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl FieldDocument {
    pub fn into_producer(mut self) -> Result<Box<dyn Producer>> {
        match self.kind {
            FieldKind::String => self.boxed(Text),
            FieldKind::Integer => {
                let domain = self.integer()?;
                self.boxed(domain)
            }
            FieldKind::Float => {
                let domain = self.float()?;
                self.boxed(domain)
            }
            FieldKind::Boolean => self.boxed(Boolean),
            FieldKind::Datetime => {
                let domain = self.datetime()?;
                self.boxed(domain)
            }
            FieldKind::Date => {
                let domain = self.date()?;
                self.boxed(domain)
            }
            FieldKind::Nested => {
                let domain = self.nested()?;
                self.boxed(domain)
            }
            FieldKind::Collection => {
                let mut inner = *self
                    .of
                    .take()
                    .ok_or_else(|| anyhow!("a collection field needs `of`"))?;
                match inner.kind {
                    FieldKind::String => {
                        let inner = inner.field(Text)?;
                        self.boxed(Collection::new(inner))
                    }
                    FieldKind::Integer => {
                        let domain = inner.integer()?;
                        let inner = inner.field(domain)?;
                        self.boxed(Collection::new(inner))
                    }
                    FieldKind::Float => {
                        let domain = inner.float()?;
                        let inner = inner.field(domain)?;
                        self.boxed(Collection::new(inner))
                    }
                    FieldKind::Boolean => {
                        let inner = inner.field(Boolean)?;
                        self.boxed(Collection::new(inner))
                    }
                    FieldKind::Datetime => {
                        let domain = inner.datetime()?;
                        let inner = inner.field(domain)?;
                        self.boxed(Collection::new(inner))
                    }
                    FieldKind::Date => {
                        let domain = inner.date()?;
                        let inner = inner.field(domain)?;
                        self.boxed(Collection::new(inner))
                    }
                    FieldKind::Nested => {
                        let domain = inner.nested()?;
                        let inner = inner.field(domain)?;
                        self.boxed(Collection::new(inner))
                    }
                    FieldKind::Collection => bail!("a collection cannot hold collections"),
                }
            }
        }
    }

    fn integer(&self) -> Result<Integer> {
        match &self.step {
            None => Ok(Integer::default()),
            Some(step) => Ok(Integer {
                step: step
                    .as_i64()
                    .ok_or_else(|| anyhow!("integer step must be a whole number, got {step}"))?,
            }),
        }
    }

    fn float(&self) -> Result<Float> {
        match &self.step {
            None => Ok(Float::default()),
            Some(step) => Ok(Float {
                step: step
                    .as_f64()
                    .ok_or_else(|| anyhow!("float step must be a number, got {step}"))?,
            }),
        }
    }

    fn datetime(&self) -> Result<DateTime> {
        Ok(match self.step_seconds {
            None => DateTime::default(),
            Some(seconds) => DateTime {
                step: Duration::seconds(seconds),
            },
        })
    }

    fn date(&self) -> Result<Date> {
        Ok(match self.step_days {
            None => Date::default(),
            Some(days) => Date {
                step: Duration::days(days),
            },
        })
    }

    fn nested(&mut self) -> Result<Nested> {
        let schema = self
            .schema
            .take()
            .ok_or_else(|| anyhow!("a nested field needs `schema`"))?;
        Ok(Nested::new(schema.into_schema()?))
    }

    fn boxed<D: Attach>(self, domain: D) -> Result<Box<dyn Producer>> {
        Ok(Box::new(self.field(domain)?))
    }

    /// Apply the shared options and the validator to a field over `domain`.
    fn field<D: Attach>(self, domain: D) -> Result<Field<D>> {
        let mut builder = Field::builder(domain)
            .allow_none(self.allow_none)
            .required(self.required);

        if let Some(default) = self.default {
            builder = builder.default(json_to_value(default));
        }
        if let Some(data) = self.positive_data {
            let values: Vec<Value> = data.into_iter().map(json_to_value).collect();
            builder = builder.positive_data_from(move || values.clone());
        }
        if let Some(data) = self.negative_data {
            let values: Vec<Value> = data.into_iter().map(json_to_value).collect();
            builder = builder.negative_data_from(move || values.clone());
        }
        if let Some(validator) = &self.validate {
            builder = D::attach(builder, validator)?;
        }

        Ok(builder.build()?)
    }
}

/// Attaches a document validator to a builder of a known domain.
///
/// Validators the domain cannot serve are reported as
/// [`SgenError::UnsupportedValidator`].
trait Attach: Domain + Sized {
    fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>>;
}

fn unsupported<D: Domain>(validator: &ValidatorDocument) -> anyhow::Error {
    SgenError::UnsupportedValidator {
        validator: validator.name(),
        kind: D::KIND,
    }
    .into()
}

fn length<D: Sequence>(builder: FieldBuilder<D>, bounds: &BoundsDocument) -> Result<FieldBuilder<D>> {
    let length = Length::new(bounds.parse(parse_usize)?)?;
    Ok(builder.validate(length))
}

fn range<D: Stepped>(
    builder: FieldBuilder<D>,
    bounds: &BoundsDocument,
    parse: fn(&Json) -> Result<D::Bound>,
) -> Result<FieldBuilder<D>> {
    let range = Range::new(bounds.parse(parse)?)?;
    Ok(builder.validate(range))
}

fn distinct<D: Distinct>(
    builder: FieldBuilder<D>,
    validator: &ValidatorDocument,
    parse: fn(&Json) -> Result<D::Item>,
) -> Result<FieldBuilder<D>> {
    let all = |values: &[Json]| values.iter().map(parse).collect::<Result<Vec<_>>>();
    Ok(match validator {
        ValidatorDocument::Equal(value) => builder.validate(Equal::new(parse(value)?)),
        ValidatorDocument::OneOf(values) => builder.validate(OneOf::new(all(values)?)),
        ValidatorDocument::NoneOf(values) => builder.validate(NoneOf::new(all(values)?)),
        other => return Err(unsupported::<D>(other)),
    })
}

impl Attach for Text {
    fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
        match validator {
            ValidatorDocument::Length(bounds) => length(builder, bounds),
            ValidatorDocument::Range(_) => Err(unsupported::<Self>(validator)),
            _ => distinct(builder, validator, parse_string),
        }
    }
}

impl Attach for Integer {
    fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
        match validator {
            ValidatorDocument::Range(bounds) => range(builder, bounds, parse_i64),
            ValidatorDocument::Length(_) => Err(unsupported::<Self>(validator)),
            _ => distinct(builder, validator, parse_i64),
        }
    }
}

impl Attach for Float {
    fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
        match validator {
            ValidatorDocument::Range(bounds) => range(builder, bounds, parse_f64),
            ValidatorDocument::Length(_) => Err(unsupported::<Self>(validator)),
            _ => distinct(builder, validator, parse_f64),
        }
    }
}

impl Attach for Boolean {
    fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
        match validator {
            ValidatorDocument::Length(_) | ValidatorDocument::Range(_) => {
                Err(unsupported::<Self>(validator))
            }
            _ => distinct(builder, validator, parse_bool),
        }
    }
}

impl Attach for DateTime {
    fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
        match validator {
            ValidatorDocument::Range(bounds) => range(builder, bounds, parse_datetime),
            ValidatorDocument::Length(_) => Err(unsupported::<Self>(validator)),
            _ => distinct(builder, validator, parse_datetime),
        }
    }
}

impl Attach for Date {
    fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
        match validator {
            ValidatorDocument::Range(bounds) => range(builder, bounds, parse_date),
            ValidatorDocument::Length(_) => Err(unsupported::<Self>(validator)),
            _ => distinct(builder, validator, parse_date),
        }
    }
}

impl Attach for Nested {
    fn attach(_builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
        Err(unsupported::<Self>(validator))
    }
}

// Collections take Length over any inner kind, and the equality validators
// whenever the inner kind can produce distinct values.
macro_rules! attach_collection {
    ($($inner:ty),*) => {$(
        impl Attach for Collection<$inner> {
            fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
                match validator {
                    ValidatorDocument::Length(bounds) => length(builder, bounds),
                    ValidatorDocument::Range(_) => Err(unsupported::<Self>(validator)),
                    _ => distinct(builder, validator, parse_list),
                }
            }
        }
    )*};
}

attach_collection!(Text, Integer, Float, Boolean, DateTime, Date);

impl Attach for Collection<Nested> {
    fn attach(builder: FieldBuilder<Self>, validator: &ValidatorDocument) -> Result<FieldBuilder<Self>> {
        match validator {
            ValidatorDocument::Length(bounds) => length(builder, bounds),
            _ => Err(unsupported::<Self>(validator)),
        }
    }
}

fn parse_usize(json: &Json) -> Result<usize> {
    json.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| anyhow!("expected a non-negative integer, got {json}"))
}

fn parse_string(json: &Json) -> Result<String> {
    json.as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("expected a string, got {json}"))
}

fn parse_i64(json: &Json) -> Result<i64> {
    json.as_i64()
        .ok_or_else(|| anyhow!("expected an integer, got {json}"))
}

fn parse_f64(json: &Json) -> Result<f64> {
    json.as_f64()
        .ok_or_else(|| anyhow!("expected a number, got {json}"))
}

fn parse_bool(json: &Json) -> Result<bool> {
    json.as_bool()
        .ok_or_else(|| anyhow!("expected a boolean, got {json}"))
}

fn parse_datetime(json: &Json) -> Result<NaiveDateTime> {
    let text = parse_string(json)?;
    text.parse()
        .with_context(|| format!("expected an ISO-8601 date-time, got {text:?}"))
}

fn parse_date(json: &Json) -> Result<NaiveDate> {
    let text = parse_string(json)?;
    text.parse()
        .with_context(|| format!("expected an ISO-8601 date, got {text:?}"))
}

fn parse_list(json: &Json) -> Result<Vec<Value>> {
    match json {
        Json::Array(items) => Ok(items.iter().cloned().map(json_to_value).collect()),
        other => bail!("expected a list, got {other}"),
    }
}

/// Convert a JSON literal into a generated value.
pub fn json_to_value(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::Str(s),
        Json::Array(items) => Value::List(items.into_iter().map(json_to_value).collect()),
        Json::Object(entries) => Value::Record(Record::from_entries(
            entries.into_iter().map(|(key, value)| (key, json_to_value(value))),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgen_core::Context;

    fn schema(json: &str) -> Result<Schema> {
        json.parse::<SchemaDocument>()?.into_schema()
    }

    #[test]
    fn test_parse_full_document() {
        let document: SchemaDocument = r#"{
            "fields": [
                { "name": "model", "type": "string", "allow_none": false, "required": true,
                  "validate": { "one_of": ["Jaguar XF", "Volvo XC90"] } },
                { "name": "year", "type": "integer", "step": 5,
                  "validate": { "range": { "min": 1900, "max": 2020, "max_inclusive": false } } },
                { "name": "tags", "type": "collection", "of": { "type": "string", "required": true },
                  "validate": { "length": { "min": 1, "max": 3 } } },
                { "name": "owner", "type": "nested",
                  "schema": { "fields": [ { "name": "email", "type": "string" } ] } }
            ]
        }"#
        .parse()
        .unwrap();

        assert_eq!(document.fields.len(), 4);
        assert_eq!(document.fields[1].kind, FieldKind::Integer);
        assert!(matches!(
            document.fields[1].validate,
            Some(ValidatorDocument::Range(BoundsDocument { max_inclusive: false, .. }))
        ));
        assert_eq!(document.fields[2].of.as_ref().map(|of| of.kind), Some(FieldKind::String));

        let schema = document.into_schema().unwrap();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["model", "year", "tags", "owner"]);
    }

    #[test]
    fn test_document_fields_behave_like_built_fields() {
        let schema = schema(
            r#"{ "fields": [
                { "name": "year", "type": "integer", "allow_none": false, "required": true, "step": 5,
                  "validate": { "range": { "min": 1900, "max": 2020, "max_inclusive": false } } }
            ] }"#,
        )
        .unwrap();
        let mut cx = Context::seeded(9);

        let years: Vec<Value> = schema
            .positive(&mut cx)
            .unwrap()
            .filter_map(|record| record.get("year").cloned())
            .collect();
        assert_eq!(years, vec![Value::Int(1900), Value::Int(2015)]);
    }

    #[test]
    fn test_data_overrides_are_replayed() {
        let schema = schema(
            r#"{ "fields": [
                { "name": "code", "type": "string",
                  "positive_data": ["A1", 7, null], "negative_data": [[1, 2]] }
            ] }"#,
        )
        .unwrap();
        let mut cx = Context::seeded(9);

        let codes: Vec<Value> = schema
            .negative(&mut cx)
            .unwrap()
            .filter_map(|record| record.get("code").cloned())
            .collect();
        assert_eq!(codes, vec![Value::List(vec![Value::Int(1), Value::Int(2)])]);
    }

    #[test]
    fn test_unsupported_validator_is_reported() {
        let error = schema(
            r#"{ "fields": [ { "name": "flag", "type": "boolean", "validate": { "length": { "max": 3 } } } ] }"#,
        )
        .unwrap_err();

        let cause = error.root_cause().downcast_ref::<SgenError>();
        assert_eq!(
            cause,
            Some(&SgenError::UnsupportedValidator {
                validator: "Length",
                kind: "Boolean"
            })
        );
    }

    #[test]
    fn test_configuration_errors_surface() {
        let error = schema(
            r#"{ "fields": [ { "name": "n", "type": "integer", "required": true, "default": 1 } ] }"#,
        )
        .unwrap_err();
        assert!(error.root_cause().to_string().contains("cannot be passed simultaneously"));

        assert!(schema(r#"{ "fields": [] }"#).is_err());
        assert!(schema(r#"{ "fields": [ { "type": "string" } ] }"#).is_err());
        assert!(schema(r#"{ "fields": [ { "name": "x", "type": "collection" } ] }"#).is_err());
        assert!(schema(r#"{ "fields": [ { "name": "x", "type": "uuid" } ] }"#).is_err());
    }

    #[test]
    fn test_temporal_validators() {
        let schema = schema(
            r#"{ "fields": [
                { "name": "day", "type": "date", "allow_none": false, "required": true,
                  "validate": { "range": { "min": "2024-01-01", "max": "2024-12-31" } } },
                { "name": "at", "type": "datetime", "allow_none": false, "required": true, "step_seconds": 60,
                  "validate": { "equal": "2024-01-01T12:00:00" } }
            ] }"#,
        )
        .unwrap();
        let mut cx = Context::seeded(9);

        let records: Vec<Record> = schema.positive(&mut cx).unwrap().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].get("day"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        );
    }

    #[test]
    fn test_collection_equal_takes_a_list() {
        let schema = schema(
            r#"{ "fields": [
                { "name": "ids", "type": "collection", "allow_none": false, "required": true,
                  "of": { "type": "integer" }, "validate": { "equal": [1, 2] } }
            ] }"#,
        )
        .unwrap();
        let mut cx = Context::seeded(9);

        let negative: Vec<Value> = schema
            .negative(&mut cx)
            .unwrap()
            .filter_map(|record| record.get("ids").cloned())
            .collect();
        assert!(negative.contains(&Value::List(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(1),
            Value::Int(2)
        ])));
        assert!(!negative.contains(&Value::List(vec![Value::Int(1), Value::Int(2)])));
    }

    #[test]
    fn test_json_to_value() {
        let value = json_to_value(serde_json::json!({"a": [1, 2.5, "x", true, null]}));
        let record = value.as_record().unwrap();
        assert_eq!(
            record.get("a"),
            Some(&Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Bool(true),
                Value::Null
            ]))
        );
    }
}
