use colored::*;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use sgen_core::{Mode, Record, SliceSize, Value};
use std::io::{self, Write};

pub mod document;

/// JSON view of a generated value.
///
/// Dates and date-times are written as ISO-8601 strings. `Missing` never
/// reaches a rendered record, it is written as `null` if met inside a list.
pub struct Json<'a>(pub &'a Value);

impl Serialize for Json<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Missing | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => dt.serialize(serializer),
            Value::Date(d) => d.serialize(serializer),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&Json(item))?;
                }
                seq.end()
            }
            Value::Record(record) => JsonRecord(record).serialize(serializer),
        }
    }
}

/// JSON object view of a generated record, keys in declaration order.
pub struct JsonRecord<'a>(pub &'a Record);

impl Serialize for JsonRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0.iter() {
            map.serialize_entry(name, &Json(value))?;
        }
        map.end()
    }
}

/// Write records as JSON lines, or as indented JSON objects when `pretty`.
///
/// Returns the number of records written.
pub fn write_records<W, I>(out: &mut W, records: I, pretty: bool) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Record>,
{
    let mut written = 0;
    for record in records {
        if pretty {
            serde_json::to_writer_pretty(&mut *out, &JsonRecord(&record))?;
        } else {
            serde_json::to_writer(&mut *out, &JsonRecord(&record))?;
        }
        writeln!(out)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Format header output
pub fn format_header() -> String {
    format!(
        "{}\n{}\n",
        "sgen Record Counts".bright_green().bold(),
        "==================".bright_green()
    )
}

/// Format the per-slice summary of one generation pass.
pub fn format_counts(mode: Mode, sizes: &[SliceSize]) -> String {
    let mut output = String::new();
    let total: u128 = sizes.iter().map(|size| size.records).sum();
    let label = match mode {
        Mode::Positive => "Positive".bright_green().bold(),
        Mode::Negative => "Negative".bright_red().bold(),
    };
    output.push_str(&format!("{}: {}\n", label, total.to_string().bright_yellow()));
    for size in sizes {
        if let Some(invalid) = &size.invalid {
            output.push_str(&format!(
                "  {} invalid: {}\n",
                invalid.bright_cyan(),
                size.records
            ));
        }
    }
    output
}

/// Format the closing line after records were written to a file.
pub fn format_written(count: usize, path: &str) -> String {
    format!(
        "{} {} records to {}\n",
        "Wrote".bright_green().bold(),
        count,
        path.bright_yellow()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn render(value: &Value) -> String {
        serde_json::to_string(&Json(value)).unwrap()
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(render(&Value::Null), "null");
        assert_eq!(render(&Value::Bool(true)), "true");
        assert_eq!(render(&Value::Int(-3)), "-3");
        assert_eq!(render(&Value::Float(2.5)), "2.5");
        assert_eq!(render(&Value::from("x")), "\"x\"");
    }

    #[test]
    fn test_render_temporal_as_iso() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(render(&Value::Date(day)), "\"2024-02-29\"");
        assert_eq!(
            render(&Value::DateTime(day.and_hms_opt(8, 30, 0).unwrap())),
            "\"2024-02-29T08:30:00\""
        );
    }

    #[test]
    fn test_render_record_keeps_order() {
        let record = Record::from_entries([
            ("zeta", Value::Int(1)),
            ("alpha", Value::List(vec![Value::Null, Value::from("a")])),
            ("gone", Value::Missing),
        ]);
        assert_eq!(
            serde_json::to_string(&JsonRecord(&record)).unwrap(),
            r#"{"zeta":1,"alpha":[null,"a"]}"#
        );
    }

    #[test]
    fn test_write_records_as_lines() {
        let records = vec![
            Record::from_entries([("a", Value::Int(1))]),
            Record::from_entries([("a", Value::Int(2))]),
        ];
        let mut out = Vec::new();
        let written = write_records(&mut out, records, false).unwrap();

        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "{\"a\":1}\n{\"a\":2}\n");
    }

    #[test]
    fn test_format_counts() {
        colored::control::set_override(false);
        let sizes = vec![
            SliceSize {
                invalid: Some("name".to_string()),
                records: 6,
            },
            SliceSize {
                invalid: Some("age".to_string()),
                records: 4,
            },
        ];
        let output = format_counts(Mode::Negative, &sizes);

        assert!(output.starts_with("Negative: 10\n"));
        assert!(output.contains("name invalid: 6"));
        assert!(output.contains("age invalid: 4"));
    }

    #[test]
    fn test_format_header() {
        let header = format_header();
        assert!(header.contains("sgen Record Counts"));
    }
}
