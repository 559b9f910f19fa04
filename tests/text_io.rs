//! End-to-end scenarios over the text format: parse → inspect → print.

use chrono::TimeDelta;
use mobilis::catalog::MobType;
use mobilis::collections::{Set, Span, SpanSet};
use mobilis::temporal::{TInterpolation, Temporal};
use mobilis::value::Value;
use mobilis::Error;

#[test]
fn int_span_canonical_form() {
    let span = Span::parse("[1, 5]", MobType::IntSpan).unwrap();
    assert_eq!(span.lower(), &Value::Int(1));
    assert_eq!(span.upper(), &Value::Int(6));
    assert!(span.is_lower_inclusive());
    assert!(!span.is_upper_inclusive());
    assert_eq!(span.to_wkt(15), "[1, 6)");
}

#[test]
fn empty_component_span_is_invalid_input() {
    let err = SpanSet::parse("{[1,2], (3,4), (5,5)}", MobType::FloatSpanSet).unwrap_err();
    assert_eq!(err, Error::InvalidArgValue("Span cannot be empty".into()));
}

#[test]
fn duplicate_timestamps_collapse_to_one_element() {
    let set = Set::parse(
        "{2001-01-01 08:00:00+00, 2001-01-01 08:00:00+00}",
        MobType::TstzSet,
    )
    .unwrap();
    assert_eq!(set.num_values(), 1);
    assert_eq!(set.start_value().unwrap(), set.end_value().unwrap());
}

#[test]
fn geo_sequence_with_srid_prefix() {
    let t = Temporal::parse(
        "SRID=4326;[POINT(0 0)@2001-01-01, POINT(1 1)@2001-01-02]",
        MobType::TGeomPoint,
    )
    .unwrap();
    assert_eq!(t.srid(), 4326);
    assert_eq!(t.interpolation(), TInterpolation::Linear);
    assert_eq!(t.num_instants(), 2);
    let Temporal::Sequence(seq) = &t else {
        panic!("a bracketed temporal parses to a sequence");
    };
    assert!(seq.is_lower_inclusive() && seq.is_upper_inclusive());
}

#[test]
fn step_prefix_on_a_float_sequence() {
    let t = Temporal::parse("Interp=Step;[1@2001-01-01, 2@2001-01-02)", MobType::TFloat).unwrap();
    assert_eq!(t.interpolation(), TInterpolation::Step);
    let Temporal::Sequence(seq) = &t else {
        panic!("a bracketed temporal parses to a sequence");
    };
    assert!(seq.is_lower_inclusive());
    assert!(!seq.is_upper_inclusive());
    assert!(t.to_wkt(15).starts_with("Interp=Step;"));
}

#[test]
fn split_n_fills_the_smallest_hole() {
    let ss = SpanSet::parse(
        "{[2000-01-01, 2000-01-10), [2000-01-20, 2000-01-25), [2000-02-01, 2000-02-03)}",
        MobType::DateSpanSet,
    )
    .unwrap();
    let spans = ss.split_n(2).unwrap();
    assert_eq!(spans.len(), 2);
    // The 7-day hole between the last two spans is smaller than the
    // 10-day hole between the first two, so it is the one filled.
    assert_eq!(spans[0].to_wkt(15), "[2000-01-01, 2000-01-10)");
    assert_eq!(spans[1].to_wkt(15), "[2000-01-20, 2000-02-03)");
}

#[test]
fn parse_print_round_trips() {
    let cases: &[(&str, MobType)] = &[
        ("{1, 2, 3}", MobType::IntSet),
        ("{\"a\", \"b c\"}", MobType::TextSet),
        ("{2000-01-01, 2000-02-01}", MobType::DateSet),
        ("[1.5, 2.5]", MobType::FloatSpan),
        ("(1.5, 2.5]", MobType::FloatSpan),
        ("[2000-01-01, 2000-01-11)", MobType::DateSpan),
        (
            "[2019-09-08 00:00:00+00, 2019-09-10 00:00:00+00]",
            MobType::TstzSpan,
        ),
        ("{[1, 3), [4, 6)}", MobType::IntSpanSet),
        ("{[1.5, 2.5], (3.5, 4.5)}", MobType::FloatSpanSet),
    ];
    for (text, ty) in cases {
        let printed = if ty.is_set() {
            Set::parse(text, *ty).unwrap().to_wkt(15)
        } else if ty.is_span() {
            Span::parse(text, *ty).unwrap().to_wkt(15)
        } else {
            SpanSet::parse(text, *ty).unwrap().to_wkt(15)
        };
        assert_eq!(&printed, text, "round trip failed for {text}");
    }
}

#[test]
fn tstz_set_round_trip_quotes_elements() {
    let set = Set::parse("{2001-01-01 08:00:00+00}", MobType::TstzSet).unwrap();
    let printed = set.to_wkt(15);
    assert_eq!(printed, "{\"2001-01-01 08:00:00+00\"}");
    let again = Set::parse(&printed, MobType::TstzSet).unwrap();
    assert_eq!(set, again);
}

#[test]
fn geo_set_srid_prefix_round_trip() {
    let bare = Set::parse("{POINT(0 0), POINT(1 1)}", MobType::GeomSet).unwrap();
    assert_eq!(bare.srid().unwrap(), 0);
    let tagged = Set::parse(&format!("SRID=4326;{}", bare.to_wkt(15)), MobType::GeomSet).unwrap();
    assert_eq!(tagged.srid().unwrap(), 4326);
    assert_eq!(tagged.num_values(), bare.num_values());
    let again = Set::parse(&tagged.to_wkt(15), MobType::GeomSet).unwrap();
    assert_eq!(tagged, again);
}

#[test]
fn temporal_round_trips() {
    let cases: &[(&str, MobType)] = &[
        ("1@2001-01-01 00:00:00+00", MobType::TInt),
        ("\"abc\"@2001-01-01 00:00:00+00", MobType::TText),
        (
            "[1@2001-01-01 00:00:00+00, 2@2001-01-02 00:00:00+00)",
            MobType::TFloat,
        ),
        (
            "{1@2001-01-01 00:00:00+00, 2@2001-01-02 00:00:00+00}",
            MobType::TInt,
        ),
        (
            "Interp=Step;{[1@2001-01-01 00:00:00+00, 2@2001-01-02 00:00:00+00]}",
            MobType::TFloat,
        ),
        (
            "SRID=4326;[POINT(0 0)@2001-01-01 00:00:00+00]",
            MobType::TGeomPoint,
        ),
    ];
    for (text, ty) in cases {
        let value = Temporal::parse(text, *ty).unwrap();
        assert_eq!(&value.to_wkt(15), text, "round trip failed for {text}");
        let again = Temporal::parse(&value.to_wkt(15), *ty).unwrap();
        assert_eq!(value, again);
    }
}

#[test]
fn equality_comparison_and_hash_agree() {
    let a = Set::parse("{1, 2, 3}", MobType::IntSet).unwrap();
    let b = Set::parse("{3, 2, 1}", MobType::IntSet).unwrap();
    assert_eq!(a.cmp_sets(&b).unwrap(), std::cmp::Ordering::Equal);
    assert_eq!(a, b);
    assert_eq!(a.hash32(), b.hash32());
    assert_eq!(a.hash64(42), b.hash64(42));

    let x = Span::parse("[1, 5]", MobType::IntSpan).unwrap();
    let y = Span::parse("[1, 6)", MobType::IntSpan).unwrap();
    assert_eq!(x.cmp_spans(&y), std::cmp::Ordering::Equal);
    assert_eq!(x.hash32(), y.hash32());

    let s = Temporal::parse("[1@2001-01-01, 2@2001-01-02]", MobType::TFloat).unwrap();
    let t = Temporal::parse("[1@2001-01-01, 2@2001-01-02]", MobType::TFloat).unwrap();
    assert_eq!(s.cmp_temporals(&t).unwrap(), std::cmp::Ordering::Equal);
    assert_eq!(s.hash32(), t.hash32());
    assert_eq!(s.hash64(7), t.hash64(7));
}

#[test]
fn span_canonicalization_is_idempotent() {
    let span = Span::parse("(0, 9]", MobType::IntSpan).unwrap();
    let rebuilt = Span::new(
        span.lower().clone(),
        span.upper().clone(),
        span.is_lower_inclusive(),
        span.is_upper_inclusive(),
    )
    .unwrap();
    assert_eq!(span, rebuilt);
    assert_eq!(span.to_wkt(15), "[1, 10)");
}

#[test]
fn merge_is_commutative() {
    let a = Temporal::parse("[1@2001-01-01, 2@2001-01-02]", MobType::TFloat).unwrap();
    let b = Temporal::parse("[5@2001-01-05, 6@2001-01-06]", MobType::TFloat).unwrap();
    assert_eq!(a.merge(&b).unwrap(), b.merge(&a).unwrap());

    let i = Temporal::parse("1@2001-01-01", MobType::TInt).unwrap();
    let j = Temporal::parse("2@2001-01-03", MobType::TInt).unwrap();
    assert_eq!(i.merge(&j).unwrap(), j.merge(&i).unwrap());
}

#[test]
fn error_taxonomy() {
    // Malformed text.
    assert!(matches!(
        Span::parse("[1, 5", MobType::IntSpan).unwrap_err(),
        Error::InvalidInputText(_)
    ));
    assert!(matches!(
        Set::parse("{1, 2} trailing", MobType::IntSet).unwrap_err(),
        Error::InvalidInputText(_)
    ));
    // Inadmissible values.
    assert!(matches!(
        Span::parse("[5, 1]", MobType::IntSpan).unwrap_err(),
        Error::InvalidArgValue(_)
    ));
    assert!(matches!(
        Set::parse("{1.5, 2.5}", MobType::FloatSet)
            .unwrap()
            .round(-1)
            .unwrap_err(),
        Error::InvalidArgValue(_)
    ));
    // Mixed argument types.
    assert!(matches!(
        Set::parse("{1, 2}", MobType::IntSet)
            .unwrap()
            .contains(&Value::Float(1.0))
            .unwrap_err(),
        Error::InvalidArgType(_)
    ));
}

#[test]
fn shift_scale_width_accounts_for_canonical_upper() {
    let ss = SpanSet::parse("{[1, 4), [6, 8)}", MobType::IntSpanSet).unwrap();
    let shifted = ss.shift_scale(Some(&Value::Int(10)), None).unwrap();
    assert_eq!(shifted.to_wkt(15), "{[11, 14), [16, 18)}");
    // The discrete domain adds one to the width before scaling, exactly
    // as the exclusive upper bound of an int span does.
    let set = Set::parse("{1, 3, 5}", MobType::IntSet).unwrap();
    let scaled = set.shift_scale(None, Some(&Value::Int(8))).unwrap();
    assert_eq!(scaled.to_wkt(15), "{1, 6, 10}");
}

#[test]
fn timestamptz_shift_by_interval() {
    let span = Span::parse(
        "[2019-09-08 00:00:00+00, 2019-09-10 00:00:00+00]",
        MobType::TstzSpan,
    )
    .unwrap();
    let shifted = span
        .shift_scale_time(Some(TimeDelta::weeks(8)), None)
        .unwrap();
    assert_eq!(
        shifted.to_wkt(15),
        "[2019-11-03 00:00:00+00, 2019-11-05 00:00:00+00]"
    );
    assert!(span
        .shift_scale_time(None, Some(TimeDelta::seconds(0)))
        .is_err());
}
