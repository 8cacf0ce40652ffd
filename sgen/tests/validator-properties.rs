// Boundary values derived by validators attached to fields.
use chrono::{Duration, NaiveDate};
use sgen::*;

fn strict<D: Domain>(builder: FieldBuilder<D>) -> Field<D> {
    builder.allow_none(false).required(true).build().unwrap()
}

fn lengths(values: &[Value]) -> Vec<usize> {
    values
        .iter()
        .map(|value| match value {
            Value::Str(s) => s.len(),
            Value::List(items) => items.len(),
            other => panic!("not a sequence: {other}"),
        })
        .collect()
}

#[test]
fn prop_length_on_strings() {
    let mut cx = Context::seeded(200);
    for (min, max) in [(1, 2), (3, 8), (10, 64)] {
        let field = strict(field::string().validate(Length::between(min, max).unwrap()));
        assert_eq!(lengths(&field.positive(&mut cx).unwrap()), vec![min, max]);

        let negative = field.negative(&mut cx).unwrap();
        assert_eq!(lengths(&negative[..2]), vec![min - 1, max + 1]);
        assert_eq!(&negative[2..], &[Value::Null, Value::Missing]);
    }
}

#[test]
fn prop_length_on_collections() {
    let mut cx = Context::seeded(201);
    let inner = strict(field::string().validate(Equal::new("a".to_string())));
    let field = strict(field::collection(inner).validate(Length::between(2, 4).unwrap()));

    assert_eq!(
        field.positive(&mut cx).unwrap(),
        vec![
            Value::List(vec![Value::from("a"); 2]),
            Value::List(vec![Value::from("a"); 4]),
        ]
    );

    let negative = field.negative(&mut cx).unwrap();
    assert!(negative.contains(&Value::List(vec![Value::from("a"); 1])));
    assert!(negative.contains(&Value::List(vec![Value::from("a"); 5])));
    assert!(negative.contains(&Value::List(vec![Value::from("not_a"); 2])));
    assert!(negative.contains(&Value::List(vec![Value::Null; 4])));
}

#[test]
fn prop_collection_equality_negatives_fail_validation() {
    let mut cx = Context::seeded(207);
    let tags = vec![Value::from("a"), Value::from("b")];
    let inner = || strict(field::string());

    let one_of = field::collection(inner()).validate(OneOf::new([tags.clone()])).build().unwrap();
    let equal = field::collection(inner()).validate(Equal::new(tags.clone())).build().unwrap();
    let fields: [&dyn Producer; 2] = [&one_of, &equal];
    for field in fields {
        let negative = field.negative(&mut cx).unwrap();
        assert!(!negative.contains(&Value::List(tags.clone())));
        assert!(!negative.contains(&Value::Null));
        assert!(!negative.contains(&Value::Missing));
    }
}

#[test]
fn test_length_unbounded_maximum_is_reported() {
    let mut cx = Context::seeded(208);
    let field = strict(field::string().validate(Length::at_most(usize::MAX).unwrap()));

    assert!(matches!(
        field.negative(&mut cx),
        Err(SgenError::BoundOverflow { kind: "String", .. })
    ));
}

#[test]
fn test_length_exclusive_bounds() {
    let mut cx = Context::seeded(202);
    let length = Length::new(Bounds::new().min(2).max(6).min_exclusive().max_exclusive()).unwrap();
    let field = strict(field::string().validate(length));

    assert_eq!(lengths(&field.positive(&mut cx).unwrap()), vec![3, 5]);
}

#[test]
fn test_length_zero_minimum_fails_on_negative_path() {
    let mut cx = Context::seeded(203);
    let field = strict(field::string().validate(Length::at_least(0).unwrap()));

    assert_eq!(lengths(&field.positive(&mut cx).unwrap()), vec![0]);
    assert_eq!(field.negative(&mut cx).unwrap_err(), SgenError::DegenerateLength);
}

#[test]
fn prop_range_integer_round_trip() {
    let mut cx = Context::seeded(204);
    for (min, max) in [(-998, 649), (0, 1), (18, 65)] {
        let field = strict(field::integer().validate(Range::between(min, max).unwrap()));
        assert_eq!(field.positive(&mut cx).unwrap(), vec![Value::Int(min), Value::Int(max)]);
        assert_eq!(
            field.negative(&mut cx).unwrap()[..2],
            [Value::Int(min - 1), Value::Int(max + 1)]
        );

        let exclusive = Range::new(Bounds::new().min(min).max(max).min_exclusive().max_exclusive()).unwrap();
        let field = strict(field::integer().validate(exclusive));
        assert_eq!(
            field.positive(&mut cx).unwrap(),
            vec![Value::Int(min + 1), Value::Int(max - 1)]
        );
        assert_eq!(
            field.negative(&mut cx).unwrap()[..2],
            [Value::Int(min), Value::Int(max)]
        );
    }
}

#[test]
fn test_range_float_uses_hundredths() {
    let mut cx = Context::seeded(205);
    let field = strict(field::float().validate(Range::between(-1.5, 2.0).unwrap()));

    let negative: Vec<f64> = field.negative(&mut cx).unwrap()[..2]
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect();
    assert!((negative[0] + 1.51).abs() < 1e-9);
    assert!((negative[1] - 2.01).abs() < 1e-9);
}

#[test]
fn test_range_date_and_datetime() {
    let mut cx = Context::seeded(206);
    let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

    let field = strict(field::date().validate(Range::between(first, last).unwrap()));
    assert_eq!(
        field.negative(&mut cx).unwrap()[..2],
        [
            Value::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()),
            Value::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        ]
    );

    let noon = first.and_hms_opt(12, 0, 0).unwrap();
    let field = strict(
        Field::builder(DateTime { step: Duration::hours(1) })
            .validate(Range::at_least(noon).unwrap()),
    );
    assert_eq!(
        field.negative(&mut cx).unwrap()[0],
        Value::DateTime(first.and_hms_opt(11, 0, 0).unwrap())
    );
}

#[test]
fn test_range_construction_errors() {
    assert_eq!(
        Range::<i64>::new(Bounds::new()).unwrap_err(),
        SgenError::MissingBounds { validator: "Range" }
    );
    assert!(matches!(
        Range::between(10, 1).unwrap_err(),
        SgenError::InvertedBounds { validator: "Range", .. }
    ));
}

#[test]
fn prop_one_of() {
    let mut cx = Context::seeded(207);
    let choices = vec!["BMW".to_string(), "Audi".to_string(), "Lada".to_string()];
    let field = strict(field::string().validate(OneOf::new(choices.clone())));

    let positive = field.positive(&mut cx).unwrap();
    assert_eq!(positive, choices.iter().map(|c| Value::from(c.as_str())).collect::<Vec<_>>());

    let negative = field.negative(&mut cx).unwrap();
    for value in &negative {
        assert!(!positive.contains(value));
    }
}

#[test]
fn prop_none_of() {
    let mut cx = Context::seeded(208);
    let invalid = vec![7, 13, 666];
    let field = strict(field::integer().validate(NoneOf::new(invalid.clone())));

    let negative = field.negative(&mut cx).unwrap();
    assert_eq!(
        negative[..3],
        [Value::Int(7), Value::Int(13), Value::Int(666)]
    );

    for value in field.positive(&mut cx).unwrap() {
        assert!(!invalid.contains(&value.as_int().unwrap()));
    }
}

#[test]
fn test_equal_on_every_distinct_kind() {
    let mut cx = Context::seeded(209);
    let day = NaiveDate::from_ymd_opt(2022, 2, 22).unwrap();

    let date = strict(field::date().validate(Equal::new(day)));
    assert_eq!(date.positive(&mut cx).unwrap(), vec![Value::Date(day)]);
    assert_ne!(date.negative(&mut cx).unwrap()[0], Value::Date(day));

    let boolean = strict(field::boolean().validate(Equal::new(true)));
    assert_eq!(boolean.negative(&mut cx).unwrap()[0], Value::Bool(false));

    let float = strict(field::float().validate(Equal::new(0.5)));
    assert_ne!(float.negative(&mut cx).unwrap()[0], Value::Float(0.5));
}

#[test]
fn test_one_of_over_whole_boolean_domain_fails() {
    let mut cx = Context::new(Config::default().with_retry_limit(5), Seed::from_u64(210));
    let field = strict(field::boolean().validate(OneOf::new([true, false])));

    assert_eq!(
        field.negative(&mut cx).unwrap_err(),
        SgenError::DomainExhausted {
            kind: "Boolean",
            attempts: 5
        }
    );
}
