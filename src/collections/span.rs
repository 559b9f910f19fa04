//! Spans: one-dimensional intervals with explicit bound inclusivity.
//!
//! Spans over a discrete base domain (int, bigint, date) are kept in the
//! canonical form `[lower, upper)`; construction rewrites the bounds and
//! the parser therefore accepts any bracket combination.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::TimeDelta;

use crate::catalog::MobType;
use crate::datetime::ensure_positive_duration;
use crate::errors::{Error, Result};
use crate::hash;
use crate::parser::Cursor;
use crate::utils::round_float;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Span {
    span_type: MobType,
    base_type: MobType,
    lower: Value,
    upper: Value,
    lower_inc: bool,
    upper_inc: bool,
}

impl Span {
    /// Build a span from its bounds, canonicalizing and validating.
    ///
    /// # Example
    /// ```
    /// # use mobilis::collections::Span;
    /// # use mobilis::value::Value;
    /// let span = Span::new(Value::Int(1), Value::Int(5), true, true).unwrap();
    /// assert_eq!(span.to_wkt(15), "[1, 6)");
    /// ```
    pub fn new(lower: Value, upper: Value, lower_inc: bool, upper_inc: bool) -> Result<Span> {
        if lower.mob_type() != upper.mob_type() {
            return Err(Error::arg_type(format!(
                "Span bounds of mixed types: {} and {}",
                lower.mob_type().name(),
                upper.mob_type().name()
            )));
        }
        let base_type = lower.mob_type();
        let span_type = base_type.expect_span_type()?;

        let (mut lower, mut upper) = (lower, upper);
        let (mut lower_inc, mut upper_inc) = (lower_inc, upper_inc);
        if base_type.is_canonical() {
            if !lower_inc {
                lower = lower.succ()?;
                lower_inc = true;
            }
            if upper_inc {
                upper = upper.succ()?;
                upper_inc = false;
            }
        }

        match lower.cmp_same(&upper) {
            Ordering::Greater => Err(Error::arg_value(
                "Span lower bound must be less than or equal to span upper bound",
            )),
            Ordering::Equal if !(lower_inc && upper_inc) => {
                Err(Error::arg_value("Span cannot be empty"))
            }
            _ => Ok(Span {
                span_type,
                base_type,
                lower,
                upper,
                lower_inc,
                upper_inc,
            }),
        }
    }

    /// Degenerate span covering a single value.
    pub fn from_value(value: Value) -> Result<Span> {
        Span::new(value.clone(), value, true, true)
    }

    /// Parse a span from the cursor. `end` requires the input to be
    /// exhausted afterwards.
    pub(crate) fn parse_cursor(
        cur: &mut Cursor<'_>,
        span_type: MobType,
        end: bool,
    ) -> Result<Span> {
        let type_str = span_type.name();
        let base_type = span_type.expect_base_type()?;
        let lower_inc = if cur.try_obracket() {
            true
        } else if cur.try_oparen() {
            false
        } else {
            return Err(Error::parse(type_str, "Missing opening bracket/parenthesis"));
        };
        let lower = Value::parse_text(cur.scan_bound(), base_type)?;
        cur.try_comma();
        let upper = Value::parse_text(cur.scan_bound(), base_type)?;
        let upper_inc = if cur.try_cbracket() {
            true
        } else if cur.try_cparen() {
            false
        } else {
            return Err(Error::parse(type_str, "Missing closing bracket/parenthesis"));
        };
        if end {
            cur.expect_end(type_str)?;
        }
        Span::new(lower, upper, lower_inc, upper_inc)
    }

    /// Parse a span of the given type from its text form.
    ///
    /// # Example
    /// ```
    /// # use mobilis::collections::Span;
    /// # use mobilis::catalog::MobType;
    /// let span = Span::parse("(3.5, 8.5]", MobType::FloatSpan).unwrap();
    /// assert!(!span.is_lower_inclusive());
    /// assert!(span.is_upper_inclusive());
    /// ```
    pub fn parse(s: &str, span_type: MobType) -> Result<Span> {
        let mut cur = Cursor::new(s);
        Span::parse_cursor(&mut cur, span_type, true)
    }

    pub fn span_type(&self) -> MobType {
        self.span_type
    }

    pub fn base_type(&self) -> MobType {
        self.base_type
    }

    pub fn lower(&self) -> &Value {
        &self.lower
    }

    pub fn upper(&self) -> &Value {
        &self.upper
    }

    pub fn is_lower_inclusive(&self) -> bool {
        self.lower_inc
    }

    pub fn is_upper_inclusive(&self) -> bool {
        self.upper_inc
    }

    /// Width of a numeric span.
    pub fn width(&self) -> Result<Value> {
        match (&self.lower, &self.upper) {
            (Value::Int(l), Value::Int(u)) => Ok(Value::Int(u - l)),
            (Value::BigInt(l), Value::BigInt(u)) => Ok(Value::BigInt(u - l)),
            (Value::Float(l), Value::Float(u)) => Ok(Value::Float(u - l)),
            _ => Err(Error::arg_type(format!(
                "Width is not defined for {}",
                self.span_type.name()
            ))),
        }
    }

    /// Duration of a date or timestamptz span.
    pub fn duration(&self) -> Result<TimeDelta> {
        match (&self.lower, &self.upper) {
            (Value::Date(l), Value::Date(u)) => Ok(*u - *l),
            (Value::Timestamp(l), Value::Timestamp(u)) => Ok(*u - *l),
            _ => Err(Error::arg_type(format!(
                "Duration is not defined for {}",
                self.span_type.name()
            ))),
        }
    }

    pub fn contains_value(&self, value: &Value) -> Result<bool> {
        if value.mob_type() != self.base_type {
            return Err(Error::arg_type(format!(
                "Cannot test a {} value against a {}",
                value.mob_type().name(),
                self.span_type.name()
            )));
        }
        let lo = value.cmp_same(&self.lower);
        let hi = value.cmp_same(&self.upper);
        Ok((lo == Ordering::Greater || (lo == Ordering::Equal && self.lower_inc))
            && (hi == Ordering::Less || (hi == Ordering::Equal && self.upper_inc)))
    }

    pub fn contains_span(&self, other: &Span) -> Result<bool> {
        self.ensure_same_type(other)?;
        let lo = self.lower.cmp_same(&other.lower);
        let hi = self.upper.cmp_same(&other.upper);
        Ok((lo == Ordering::Less || (lo == Ordering::Equal && (self.lower_inc || !other.lower_inc)))
            && (hi == Ordering::Greater
                || (hi == Ordering::Equal && (self.upper_inc || !other.upper_inc))))
    }

    pub fn overlaps(&self, other: &Span) -> Result<bool> {
        self.ensure_same_type(other)?;
        let a = self.lower.cmp_same(&other.upper);
        let b = other.lower.cmp_same(&self.upper);
        Ok((a == Ordering::Less || (a == Ordering::Equal && self.lower_inc && other.upper_inc))
            && (b == Ordering::Less
                || (b == Ordering::Equal && other.lower_inc && self.upper_inc)))
    }

    /// True when the spans touch without sharing a value.
    pub fn is_adjacent(&self, other: &Span) -> Result<bool> {
        self.ensure_same_type(other)?;
        Ok((self.upper.cmp_same(&other.lower) == Ordering::Equal
            && self.upper_inc != other.lower_inc)
            || (other.upper.cmp_same(&self.lower) == Ordering::Equal
                && other.upper_inc != self.lower_inc))
    }

    /// Overlap-or-adjacency in the canonical sense, for a `next` span known
    /// to start at or after `self`. This is the merge rule of span set
    /// normalization.
    pub(crate) fn ov_adj(&self, next: &Span) -> bool {
        match self.upper.cmp_same(&next.lower) {
            Ordering::Greater => true,
            Ordering::Equal => self.upper_inc || next.lower_inc,
            Ordering::Less => false,
        }
    }

    /// Grow this span to the union of itself and `other`.
    pub(crate) fn expand(&mut self, other: &Span) {
        let lo = other.lower.cmp_same(&self.lower);
        if lo == Ordering::Less || (lo == Ordering::Equal && other.lower_inc && !self.lower_inc) {
            self.lower = other.lower.clone();
            self.lower_inc = other.lower_inc;
        }
        let hi = other.upper.cmp_same(&self.upper);
        if hi == Ordering::Greater || (hi == Ordering::Equal && other.upper_inc && !self.upper_inc)
        {
            self.upper = other.upper.clone();
            self.upper_inc = other.upper_inc;
        }
    }

    pub fn intersection(&self, other: &Span) -> Result<Option<Span>> {
        self.ensure_same_type(other)?;
        if !self.overlaps(other)? {
            return Ok(None);
        }
        let (lower, lower_inc) = match self.lower.cmp_same(&other.lower) {
            Ordering::Less => (other.lower.clone(), other.lower_inc),
            Ordering::Greater => (self.lower.clone(), self.lower_inc),
            Ordering::Equal => (self.lower.clone(), self.lower_inc && other.lower_inc),
        };
        let (upper, upper_inc) = match self.upper.cmp_same(&other.upper) {
            Ordering::Less => (self.upper.clone(), self.upper_inc),
            Ordering::Greater => (other.upper.clone(), other.upper_inc),
            Ordering::Equal => (self.upper.clone(), self.upper_inc && other.upper_inc),
        };
        Ok(Some(Span::new(lower, upper, lower_inc, upper_inc)?))
    }

    /// Distance between a numeric span and a value, measured against the
    /// stored bounds; zero when the value lies inside the span.
    pub fn distance_to_value(&self, value: &Value) -> Result<Value> {
        if !self.span_type.is_numeric() {
            return Err(Error::arg_type(format!(
                "Distance is not defined for {}",
                self.span_type.name()
            )));
        }
        if self.contains_value(value)? {
            return Value::from_double(0.0, self.base_type);
        }
        let v = value.as_double()?;
        let lo = self.lower.as_double()?;
        let hi = self.upper.as_double()?;
        let d = if v < lo { lo - v } else { (v - hi).max(0.0) };
        Value::from_double(d, self.base_type)
    }

    /// Distance between two numeric spans; zero when they overlap or
    /// touch.
    pub fn distance_to_span(&self, other: &Span) -> Result<Value> {
        self.ensure_same_type(other)?;
        if !self.span_type.is_numeric() {
            return Err(Error::arg_type(format!(
                "Distance is not defined for {}",
                self.span_type.name()
            )));
        }
        if self.overlaps(other)? {
            return Value::from_double(0.0, self.base_type);
        }
        let d = if self.upper.cmp_same(&other.lower) != Ordering::Greater {
            other.lower.as_double()? - self.upper.as_double()?
        } else {
            self.lower.as_double()? - other.upper.as_double()?
        };
        Value::from_double(d, self.base_type)
    }

    /// Time distance between a date or timestamptz span and an instant of
    /// its base type; zero when the instant lies inside the span.
    pub fn duration_to_value(&self, value: &Value) -> Result<TimeDelta> {
        if !self.span_type.is_time() {
            return Err(Error::arg_type(format!(
                "Time distance is not defined for {}",
                self.span_type.name()
            )));
        }
        if self.contains_value(value)? {
            return Ok(TimeDelta::zero());
        }
        if value.cmp_same(&self.lower) == Ordering::Less {
            time_delta(value, &self.lower)
        } else {
            time_delta(&self.upper, value)
        }
    }

    /// Time distance between two date or timestamptz spans.
    pub fn duration_to_span(&self, other: &Span) -> Result<TimeDelta> {
        self.ensure_same_type(other)?;
        if !self.span_type.is_time() {
            return Err(Error::arg_type(format!(
                "Time distance is not defined for {}",
                self.span_type.name()
            )));
        }
        if self.overlaps(other)? {
            return Ok(TimeDelta::zero());
        }
        if self.upper.cmp_same(&other.lower) != Ordering::Greater {
            time_delta(&self.upper, &other.lower)
        } else {
            time_delta(&other.upper, &self.lower)
        }
    }

    /// Shift and/or scale a numeric or date span. At least one argument
    /// must be given and the width must be positive.
    pub fn shift_scale(&self, shift: Option<&Value>, width: Option<&Value>) -> Result<Span> {
        let (lower, upper) = shift_scale_bounds(
            &self.lower,
            &self.upper,
            shift,
            width,
            self.base_type,
        )?;
        Span::new(lower, upper, self.lower_inc, self.upper_inc)
    }

    /// Shift and/or scale a timestamptz span by intervals.
    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<Span> {
        let (Value::Timestamp(lower), Value::Timestamp(upper)) = (&self.lower, &self.upper)
        else {
            return Err(Error::arg_type(format!(
                "Cannot shift a {} by an interval",
                self.span_type.name()
            )));
        };
        let (lower, upper) = shift_scale_time_bounds(*lower, *upper, shift, duration)?;
        Span::new(
            Value::Timestamp(lower),
            Value::Timestamp(upper),
            self.lower_inc,
            self.upper_inc,
        )
    }

    /// Round the bounds of a float span to `maxdd` decimal digits.
    pub fn round(&self, maxdd: i32) -> Result<Span> {
        let (lower, upper) = self.float_bounds()?;
        if maxdd < 0 {
            return Err(Error::arg_value("The number of decimal digits must not be negative"));
        }
        Span::new(
            Value::Float(round_float(lower, maxdd)),
            Value::Float(round_float(upper, maxdd)),
            self.lower_inc,
            self.upper_inc,
        )
    }

    pub fn floor(&self) -> Result<Span> {
        let (lower, upper) = self.float_bounds()?;
        Span::new(
            Value::Float(lower.floor()),
            Value::Float(upper.floor()),
            self.lower_inc,
            self.upper_inc,
        )
    }

    pub fn ceil(&self) -> Result<Span> {
        let (lower, upper) = self.float_bounds()?;
        Span::new(
            Value::Float(lower.ceil()),
            Value::Float(upper.ceil()),
            self.lower_inc,
            self.upper_inc,
        )
    }

    fn float_bounds(&self) -> Result<(f64, f64)> {
        match (&self.lower, &self.upper) {
            (Value::Float(l), Value::Float(u)) => Ok((*l, *u)),
            _ => Err(Error::arg_type(format!(
                "Operation requires a floatspan, not a {}",
                self.span_type.name()
            ))),
        }
    }

    pub(crate) fn ensure_same_type(&self, other: &Span) -> Result<()> {
        if self.span_type != other.span_type {
            return Err(Error::arg_type(format!(
                "Operation on mixed span types: {} and {}",
                self.span_type.name(),
                other.span_type.name()
            )));
        }
        Ok(())
    }

    /// Text output.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        let open = if self.lower_inc { '[' } else { '(' };
        let close = if self.upper_inc { ']' } else { ')' };
        format!(
            "{open}{}, {}{close}",
            unquoted(&self.lower, maxdd),
            unquoted(&self.upper, maxdd)
        )
    }

    /// B-tree comparison: `(lower, lower_inc, upper, upper_inc)` with
    /// inclusive lowers first and exclusive uppers first.
    pub fn cmp_spans(&self, other: &Span) -> Ordering {
        self.lower
            .cmp_same(&other.lower)
            .then_with(|| match (self.lower_inc, other.lower_inc) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            })
            .then_with(|| self.upper.cmp_same(&other.upper))
            .then_with(|| match (self.upper_inc, other.upper_inc) {
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                _ => Ordering::Equal,
            })
    }

    pub fn hash32(&self) -> u32 {
        let type_word = ((self.span_type as u32) << 8) | self.base_type as u32;
        let flags = self.lower_inc as u32 | ((self.upper_inc as u32) << 1);
        let mut h = hash::hash_u32(flags) ^ hash::hash_u32(type_word);
        h = h.rotate_left(1) ^ self.lower.hash32();
        h = h.rotate_left(1) ^ self.upper.hash32();
        h
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        let type_word = ((self.span_type as u64) << 8) | self.base_type as u64;
        let flags = self.lower_inc as u64 | ((self.upper_inc as u64) << 1);
        let mut h = hash::hash_u64_extended(flags, seed) ^ hash::hash_u64_extended(type_word, seed);
        h = hash::rotate_high_and_low(h) ^ self.lower.hash64(seed);
        h = hash::rotate_high_and_low(h) ^ self.upper.hash64(seed);
        h
    }
}

/// Shift/scale bounds for a value-domain span. Shared with sets, whose
/// first and last elements play the role of the bounds.
pub(crate) fn shift_scale_bounds(
    lower: &Value,
    upper: &Value,
    shift: Option<&Value>,
    width: Option<&Value>,
    base_type: MobType,
) -> Result<(Value, Value)> {
    if shift.is_none() && width.is_none() {
        return Err(Error::arg_value(
            "At least one of the shift and width arguments must be given",
        ));
    }
    if let Some(w) = width {
        if !w.is_positive() {
            return Err(Error::arg_value("The width must be a positive value"));
        }
    }
    let instant = lower.cmp_same(upper) == Ordering::Equal;
    let mut lower = lower.clone();
    let mut upper = upper.clone();
    if let Some(delta) = shift {
        lower = lower.add(delta)?;
        upper = if instant { lower.clone() } else { upper.add(delta)? };
    }
    if let Some(w) = width {
        if !instant {
            // Discrete domains store an exclusive upper bound.
            let w = if base_type.is_canonical() { w.succ()? } else { w.clone() };
            upper = lower.add(&w)?;
        }
    }
    Ok((lower, upper))
}

pub(crate) fn shift_scale_time_bounds(
    lower: chrono::DateTime<chrono::Utc>,
    upper: chrono::DateTime<chrono::Utc>,
    shift: Option<TimeDelta>,
    duration: Option<TimeDelta>,
) -> Result<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)> {
    if shift.is_none() && duration.is_none() {
        return Err(Error::arg_value(
            "At least one of the shift and duration arguments must be given",
        ));
    }
    if let Some(d) = duration {
        ensure_positive_duration(d)?;
    }
    let instant = lower == upper;
    let (mut lower, mut upper) = (lower, upper);
    if let Some(delta) = shift {
        lower = lower + delta;
        upper = if instant { lower } else { upper + delta };
    }
    if let Some(d) = duration {
        if !instant {
            upper = lower + d;
        }
    }
    Ok((lower, upper))
}

fn time_delta(from: &Value, to: &Value) -> Result<TimeDelta> {
    match (from, to) {
        (Value::Date(a), Value::Date(b)) => Ok((*b - *a).max(TimeDelta::zero())),
        (Value::Timestamp(a), Value::Timestamp(b)) => Ok((*b - *a).max(TimeDelta::zero())),
        _ => Err(Error::internal("Time distance over non-time bounds")),
    }
}

/// Span bounds are printed without quotes whatever the base type.
fn unquoted(value: &Value, maxdd: i32) -> String {
    match value {
        Value::Text(s) => s.clone(),
        other => other.output(maxdd),
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.span_type == other.span_type && self.cmp_spans(other) == Ordering::Equal
    }
}

impl Eq for Span {}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        self.span_type
            .cmp(&other.span_type)
            .then_with(|| self.cmp_spans(other))
    }
}

impl Hash for Span {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MobType;

    #[test]
    fn int_span_is_canonicalized() {
        let span = Span::parse("[1, 5]", MobType::IntSpan).unwrap();
        assert_eq!(span.lower(), &Value::Int(1));
        assert_eq!(span.upper(), &Value::Int(6));
        assert!(span.is_lower_inclusive());
        assert!(!span.is_upper_inclusive());
        assert_eq!(span.to_wkt(15), "[1, 6)");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let span = Span::parse("[1, 6)", MobType::IntSpan).unwrap();
        let again = Span::new(
            span.lower().clone(),
            span.upper().clone(),
            span.is_lower_inclusive(),
            span.is_upper_inclusive(),
        )
        .unwrap();
        assert_eq!(span, again);
    }

    #[test]
    fn empty_span_is_rejected() {
        let err = Span::parse("(5, 5)", MobType::FloatSpan).unwrap_err();
        assert_eq!(err, Error::arg_value("Span cannot be empty"));
        assert!(Span::parse("[5, 5]", MobType::FloatSpan).is_ok());
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let err = Span::parse("[8, 3]", MobType::IntSpan).unwrap_err();
        assert!(err.to_string().contains("lower bound"));
    }

    #[test]
    fn mismatched_brackets_are_accepted() {
        let span = Span::parse("(3.5, 8.5]", MobType::FloatSpan).unwrap();
        assert!(!span.is_lower_inclusive());
        assert!(span.is_upper_inclusive());
        assert_eq!(span.to_wkt(15), "(3.5, 8.5]");
    }

    #[test]
    fn tstz_span_round_trip() {
        let text = "[2019-09-08 00:00:00+00, 2019-09-10 00:00:00+00]";
        let span = Span::parse(text, MobType::TstzSpan).unwrap();
        assert_eq!(span.to_wkt(15), text);
        assert_eq!(span.duration().unwrap(), TimeDelta::days(2));
    }

    #[test]
    fn date_span_duration_and_canonical_form() {
        let span = Span::parse("[2000-01-01, 2000-01-10]", MobType::DateSpan).unwrap();
        assert_eq!(span.to_wkt(15), "[2000-01-01, 2000-01-11)");
        assert_eq!(span.duration().unwrap(), TimeDelta::days(10));
    }

    #[test]
    fn containment_respects_inclusivity() {
        let span = Span::parse("(1, 3]", MobType::FloatSpan).unwrap();
        assert!(!span.contains_value(&Value::Float(1.0)).unwrap());
        assert!(span.contains_value(&Value::Float(3.0)).unwrap());
        assert!(span.contains_value(&Value::Float(2.0)).unwrap());
        assert!(span.contains_value(&Value::Int(2)).is_err());
    }

    #[test]
    fn shift_scale_moves_and_stretches() {
        let span = Span::parse("[2, 6]", MobType::FloatSpan).unwrap();
        let shifted = span.shift_scale(Some(&Value::Float(1.0)), None).unwrap();
        assert_eq!(shifted.to_wkt(15), "[3, 7]");
        let scaled = span.shift_scale(None, Some(&Value::Float(2.0))).unwrap();
        assert_eq!(scaled.to_wkt(15), "[2, 4]");
        assert!(span.shift_scale(None, None).is_err());
        assert!(span
            .shift_scale(None, Some(&Value::Float(-1.0)))
            .is_err());
    }

    #[test]
    fn canonical_shift_scale_accounts_for_exclusive_upper() {
        // [1, 5] is stored as [1, 6); a width of 2 must yield [1, 3].
        let span = Span::parse("[1, 5]", MobType::IntSpan).unwrap();
        let scaled = span.shift_scale(None, Some(&Value::Int(2))).unwrap();
        assert_eq!(scaled.to_wkt(15), "[1, 4)");
    }

    #[test]
    fn time_shift_scale() {
        let span = Span::parse("[2019-09-08, 2019-09-10)", MobType::TstzSpan).unwrap();
        let moved = span
            .shift_scale_time(Some(TimeDelta::days(1)), Some(TimeDelta::hours(12)))
            .unwrap();
        assert_eq!(
            moved.to_wkt(15),
            "[2019-09-09 00:00:00+00, 2019-09-09 12:00:00+00)"
        );
        assert!(span
            .shift_scale_time(None, Some(TimeDelta::seconds(-5)))
            .is_err());
    }

    #[test]
    fn rounding_can_collapse_a_span() {
        let span = Span::parse("(1.001, 1.002)", MobType::FloatSpan).unwrap();
        assert!(span.round(1).is_err());
        let ok = Span::parse("[1.24, 1.26]", MobType::FloatSpan).unwrap();
        assert_eq!(ok.round(1).unwrap().to_wkt(15), "[1.2, 1.3]");
        assert!(ok.round(-1).is_err());
    }

    #[test]
    fn btree_order() {
        let a = Span::parse("[1, 4)", MobType::IntSpan).unwrap();
        let b = Span::parse("[1, 5)", MobType::IntSpan).unwrap();
        let c = Span::parse("[2, 3)", MobType::IntSpan).unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn hash_agrees_with_equality() {
        let a = Span::parse("[1, 5]", MobType::IntSpan).unwrap();
        let b = Span::parse("[1, 6)", MobType::IntSpan).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash32(), b.hash32());
        assert_eq!(a.hash64(99), b.hash64(99));
    }

    #[test]
    fn adjacency_and_overlap() {
        let a = Span::parse("[1, 3)", MobType::IntSpan).unwrap();
        let b = Span::parse("[3, 5)", MobType::IntSpan).unwrap();
        assert!(!a.overlaps(&b).unwrap());
        assert!(a.is_adjacent(&b).unwrap());
        assert!(a.ov_adj(&b));
        let c = Span::parse("(2.0, 3.0)", MobType::FloatSpan).unwrap();
        let d = Span::parse("(3.0, 4.0)", MobType::FloatSpan).unwrap();
        assert!(!c.ov_adj(&d));
    }

    #[test]
    fn distances_measure_the_gap() {
        let a = Span::parse("[1.0, 3.0]", MobType::FloatSpan).unwrap();
        assert_eq!(a.distance_to_value(&Value::Float(5.0)).unwrap(), Value::Float(2.0));
        assert_eq!(a.distance_to_value(&Value::Float(2.0)).unwrap(), Value::Float(0.0));
        let b = Span::parse("[6.0, 8.0]", MobType::FloatSpan).unwrap();
        assert_eq!(a.distance_to_span(&b).unwrap(), Value::Float(3.0));
        assert_eq!(b.distance_to_span(&a).unwrap(), Value::Float(3.0));

        let s1 = Span::parse("[2019-09-08, 2019-09-10]", MobType::TstzSpan).unwrap();
        let s2 = Span::parse("[2019-09-12, 2019-09-14]", MobType::TstzSpan).unwrap();
        assert_eq!(s1.duration_to_span(&s2).unwrap(), TimeDelta::days(2));
        assert!(s1.distance_to_value(&Value::Float(1.0)).is_err());
    }

    #[test]
    fn intersection_clips_bounds() {
        let a = Span::parse("[1.0, 5.0]", MobType::FloatSpan).unwrap();
        let b = Span::parse("(3.0, 9.0)", MobType::FloatSpan).unwrap();
        let i = a.intersection(&b).unwrap().unwrap();
        assert_eq!(i.to_wkt(15), "(3, 5]");
        let far = Span::parse("[7.0, 9.0]", MobType::FloatSpan).unwrap();
        assert!(a.intersection(&far).unwrap().is_none());
    }
}
