// Test that the Quick Start example compiles and works
use sgen::*;

fn car_schema() -> Result<Schema> {
    Schema::builder()
        .field(
            "model",
            field::string()
                .validate(OneOf::new(["Jaguar XF".to_string(), "Volvo XC90".to_string()]))
                .allow_none(false)
                .required(true)
                .build()?,
        )
        .field(
            "year",
            field::integer()
                .validate(Range::between(1900, 2024)?)
                .allow_none(false)
                .build()?,
        )
        .field("color", field::string().default("black").build()?)
        .build()
}

#[test]
fn prop_quickstart_positive_records() {
    let mut cx = Context::seeded(500);
    let schema = car_schema().unwrap();

    let records: Vec<Record> = schema.positive(&mut cx).unwrap().collect();
    // model: 2, year: 1900, 2024, missing; color: null, default, missing, random
    assert_eq!(records.len(), 2 * 3 * 4);
    assert!(records.iter().any(|record| record.get("color") == Some(&Value::from("black"))));
    assert!(records.iter().all(|record| record.contains_key("model")));
}

#[test]
fn prop_quickstart_negative_records() {
    let mut cx = Context::seeded(501);
    let schema = car_schema().unwrap();

    let records: Vec<Record> = schema.negative(&mut cx).unwrap().collect();
    // model: not_Jaguar XF, not_Volvo XC90, null, missing
    // year: 1899, 2025, null
    // color: one wrong-typed integer
    assert_eq!(records.len(), 4 * 3 * 4 + 3 * 2 * 4 + 1 * 2 * 3);

    let bad_models = records
        .iter()
        .filter(|record| record.get("model").and_then(Value::as_str).is_some_and(|m| m.starts_with("not_")))
        .count();
    assert_eq!(bad_models, 2 * 3 * 4);
}

#[test]
fn test_reproducible_with_the_same_seed() {
    let schema = car_schema().unwrap();
    let first: Vec<Record> = schema.positive(&mut Context::seeded(7)).unwrap().collect();
    let second: Vec<Record> = schema.positive(&mut Context::seeded(7)).unwrap().collect();
    assert_eq!(first, second);
}
