//! Span sets: disjoint unions of spans with a cached bounding span.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::TimeDelta;

use crate::catalog::MobType;
use crate::collections::span::Span;
use crate::collections::Ordered;
use crate::errors::{Error, Result};
use crate::hash;
use crate::parser::Cursor;
use crate::utils::round_float;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct SpanSet {
    span_set_type: MobType,
    span_type: MobType,
    base_type: MobType,
    /// Cached bounding span covering every element.
    span: Span,
    elems: Vec<Span>,
}

impl SpanSet {
    /// Build a span set from an array of spans.
    ///
    /// With `Ordered::Yes` the input is verified to be increasing and
    /// non-overlapping; otherwise it is sorted first. With `normalize`,
    /// overlapping and adjacent spans are merged; without it, any overlap
    /// is an error.
    ///
    /// # Example
    /// ```
    /// # use mobilis::catalog::MobType;
    /// # use mobilis::collections::{Ordered, Span, SpanSet};
    /// let spans = vec![
    ///     Span::parse("[4, 6)", MobType::IntSpan).unwrap(),
    ///     Span::parse("[1, 3)", MobType::IntSpan).unwrap(),
    /// ];
    /// let ss = SpanSet::new(spans, true, Ordered::No).unwrap();
    /// assert_eq!(ss.to_wkt(15), "{[1, 3), [4, 6)}");
    /// ```
    pub fn new(spans: Vec<Span>, normalize: bool, order: Ordered) -> Result<SpanSet> {
        if spans.is_empty() {
            return Err(Error::arg_value("A span set must have at least one span"));
        }
        let span_type = spans[0].span_type();
        let base_type = spans[0].base_type();
        let span_set_type = span_type.expect_span_set_type()?;
        for s in &spans {
            if s.span_type() != span_type {
                return Err(Error::arg_type(format!(
                    "Span set elements of mixed types: {} and {}",
                    span_type.name(),
                    s.span_type().name()
                )));
            }
        }

        let mut elems = spans;
        match order {
            Ordered::Yes => {
                for pair in elems.windows(2) {
                    let cmp = pair[0].upper().cmp_same(pair[1].lower());
                    if cmp == Ordering::Greater
                        || (cmp == Ordering::Equal
                            && pair[0].is_upper_inclusive()
                            && pair[1].is_lower_inclusive())
                    {
                        return Err(Error::arg_value(format!(
                            "The spans composing a span set must be increasing: {}, {}",
                            pair[0].to_wkt(15),
                            pair[1].to_wkt(15)
                        )));
                    }
                }
            }
            Ordered::No => elems.sort_by(|a, b| a.cmp_spans(b)),
        }

        if normalize {
            elems = normalize_spans(elems);
        } else {
            // Overlap is never representable; only touching with at most
            // one inclusive bound may remain unmerged.
            for pair in elems.windows(2) {
                let cmp = pair[0].upper().cmp_same(pair[1].lower());
                if cmp == Ordering::Greater
                    || (cmp == Ordering::Equal
                        && pair[0].is_upper_inclusive()
                        && pair[1].is_lower_inclusive())
                {
                    return Err(Error::arg_value(format!(
                        "The spans composing a span set must be increasing: {}, {}",
                        pair[0].to_wkt(15),
                        pair[1].to_wkt(15)
                    )));
                }
            }
        }

        let first = &elems[0];
        let last = &elems[elems.len() - 1];
        let span = Span::new(
            first.lower().clone(),
            last.upper().clone(),
            first.is_lower_inclusive(),
            last.is_upper_inclusive(),
        )?;

        Ok(SpanSet {
            span_set_type,
            span_type,
            base_type,
            span,
            elems,
        })
    }

    /// Parse a span set of the given type from its text form.
    pub fn parse(s: &str, span_set_type: MobType) -> Result<SpanSet> {
        let type_str = span_set_type.name();
        let span_type = span_set_type.expect_span_type()?;
        let mut cur = Cursor::new(s);
        cur.expect_obrace(type_str)?;
        let mut spans = vec![Span::parse_cursor(&mut cur, span_type, false)?];
        while cur.try_comma() {
            spans.push(Span::parse_cursor(&mut cur, span_type, false)?);
        }
        cur.expect_cbrace(type_str)?;
        cur.expect_end(type_str)?;
        SpanSet::new(spans, true, Ordered::No)
    }

    pub fn span_set_type(&self) -> MobType {
        self.span_set_type
    }

    pub fn span_type(&self) -> MobType {
        self.span_type
    }

    pub fn base_type(&self) -> MobType {
        self.base_type
    }

    pub fn num_spans(&self) -> usize {
        self.elems.len()
    }

    /// The n-th composing span, 1-based.
    pub fn span_n(&self, n: usize) -> Result<&Span> {
        if n < 1 || n > self.elems.len() {
            return Err(Error::arg_value(format!("Invalid span number: {n}")));
        }
        Ok(&self.elems[n - 1])
    }

    pub fn start_span(&self) -> &Span {
        &self.elems[0]
    }

    pub fn end_span(&self) -> &Span {
        &self.elems[self.elems.len() - 1]
    }

    pub fn spans(&self) -> &[Span] {
        &self.elems
    }

    /// The cached bounding span.
    pub fn to_span(&self) -> Span {
        self.span.clone()
    }

    pub fn contains_value(&self, value: &Value) -> Result<bool> {
        if !self.span.contains_value(value)? {
            return Ok(false);
        }
        for s in &self.elems {
            if s.contains_value(value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Total width of a numeric span set; with `ignore_gaps`, the width of
    /// the bounding span.
    pub fn width(&self, ignore_gaps: bool) -> Result<Value> {
        if ignore_gaps {
            return self.span.width();
        }
        let mut total = 0.0;
        for s in &self.elems {
            total += s.width()?.as_double()?;
        }
        Value::from_double(total, self.base_type)
    }

    /// Total duration of a date or timestamptz span set.
    pub fn duration(&self, ignore_gaps: bool) -> Result<TimeDelta> {
        if ignore_gaps {
            return self.span.duration();
        }
        let mut total = TimeDelta::zero();
        for s in &self.elems {
            total = total + s.duration()?;
        }
        Ok(total)
    }

    /// Number of dates of a date span set: the stored bounds of each span.
    pub fn num_dates(&self) -> Result<usize> {
        self.ensure_type(MobType::DateSpanSet)?;
        Ok(self.elems.len() * 2)
    }

    /// The n-th date, 1-based: odd positions map to lower bounds, even
    /// positions to the stored exclusive upper bounds.
    pub fn date_n(&self, n: usize) -> Result<Value> {
        self.ensure_type(MobType::DateSpanSet)?;
        if n < 1 || n > self.elems.len() * 2 {
            return Err(Error::arg_value(format!("Invalid date number: {n}")));
        }
        let span = &self.elems[(n - 1) / 2];
        Ok(if n % 2 == 1 {
            span.lower().clone()
        } else {
            span.upper().clone()
        })
    }

    /// Distinct bound timestamps of a timestamptz span set, in order.
    /// Coincident bounds of consecutive spans are enumerated once.
    pub fn timestamps(&self) -> Result<Vec<Value>> {
        self.ensure_type(MobType::TstzSpanSet)?;
        let mut out: Vec<Value> = Vec::with_capacity(self.elems.len() * 2);
        for s in &self.elems {
            for bound in [s.lower(), s.upper()] {
                if out.last().map(|last| last.cmp_same(bound)) != Some(Ordering::Equal) {
                    out.push(bound.clone());
                }
            }
        }
        Ok(out)
    }

    pub fn num_timestamps(&self) -> Result<usize> {
        Ok(self.timestamps()?.len())
    }

    pub fn timestamp_n(&self, n: usize) -> Result<Value> {
        let ts = self.timestamps()?;
        if n < 1 || n > ts.len() {
            return Err(Error::arg_value(format!("Invalid timestamp number: {n}")));
        }
        Ok(ts[n - 1].clone())
    }

    /// Shift and/or scale a numeric or date span set. The result is
    /// re-sorted and re-normalized.
    pub fn shift_scale(&self, shift: Option<&Value>, width: Option<&Value>) -> Result<SpanSet> {
        let (lower1, upper1) = crate::collections::span::shift_scale_bounds(
            self.span.lower(),
            self.span.upper(),
            shift,
            width,
            self.base_type,
        )?;
        self.rescale_spans(&lower1, &upper1)
    }

    /// Shift and/or scale a timestamptz span set by intervals.
    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<SpanSet> {
        let (Value::Timestamp(lo), Value::Timestamp(hi)) =
            (self.span.lower(), self.span.upper())
        else {
            return Err(Error::arg_type(format!(
                "Cannot shift a {} by an interval",
                self.span_set_type.name()
            )));
        };
        let (lower1, upper1) =
            crate::collections::span::shift_scale_time_bounds(*lo, *hi, shift, duration)?;
        self.rescale_spans(&Value::Timestamp(lower1), &Value::Timestamp(upper1))
    }

    fn rescale_spans(&self, lower1: &Value, upper1: &Value) -> Result<SpanSet> {
        let old_lo = self.span.lower().as_double()?;
        let old_hi = self.span.upper().as_double()?;
        let new_lo = lower1.as_double()?;
        let new_hi = upper1.as_double()?;
        let scale = if old_hi > old_lo {
            (new_hi - new_lo) / (old_hi - old_lo)
        } else {
            1.0
        };
        let map = |v: &Value| -> Result<Value> {
            let x = new_lo + (v.as_double()? - old_lo) * scale;
            if self.base_type == MobType::TimestampTz {
                chrono::DateTime::from_timestamp_micros(x.round() as i64)
                    .map(Value::Timestamp)
                    .ok_or_else(|| Error::arg_value("timestamp out of range"))
            } else {
                Value::from_double(x, self.base_type)
            }
        };
        let mut spans = Vec::with_capacity(self.elems.len());
        for s in &self.elems {
            spans.push(Span::new(
                map(s.lower())?,
                map(s.upper())?,
                s.is_lower_inclusive(),
                s.is_upper_inclusive(),
            )?);
        }
        SpanSet::new(spans, true, Ordered::No)
    }

    fn map_float_spans(&self, f: impl Fn(f64) -> f64) -> Result<SpanSet> {
        if self.base_type != MobType::Float {
            return Err(Error::arg_type(format!(
                "Operation requires a floatspanset, not a {}",
                self.span_set_type.name()
            )));
        }
        let mut spans = Vec::with_capacity(self.elems.len());
        for s in &self.elems {
            let lo = s.lower().as_float().expect("floatspan holds floats");
            let hi = s.upper().as_float().expect("floatspan holds floats");
            spans.push(Span::new(
                Value::Float(f(lo)),
                Value::Float(f(hi)),
                s.is_lower_inclusive(),
                s.is_upper_inclusive(),
            )?);
        }
        SpanSet::new(spans, true, Ordered::No)
    }

    pub fn floor(&self) -> Result<SpanSet> {
        self.map_float_spans(f64::floor)
    }

    pub fn ceil(&self) -> Result<SpanSet> {
        self.map_float_spans(f64::ceil)
    }

    pub fn round(&self, maxdd: i32) -> Result<SpanSet> {
        if maxdd < 0 {
            return Err(Error::arg_value("The number of decimal digits must not be negative"));
        }
        self.map_float_spans(|v| round_float(v, maxdd))
    }

    /// Cover the same extent with at most `n` spans: the smallest holes
    /// are filled until only `n` spans remain.
    pub fn split_n(&self, n: usize) -> Result<Vec<Span>> {
        if n == 0 {
            return Err(Error::arg_value("The number of spans must be positive"));
        }
        let count = self.elems.len();
        if count <= n {
            return Ok(self.elems.clone());
        }
        // Size of the hole after each element; adjacent spans leave a
        // zero-width hole.
        let mut order: Vec<usize> = (0..count - 1).collect();
        let hole_size = |i: usize| -> f64 {
            let a = &self.elems[i];
            let b = &self.elems[i + 1];
            b.lower().as_double().unwrap_or(0.0) - a.upper().as_double().unwrap_or(0.0)
        };
        order.sort_by(|&i, &j| hole_size(i).total_cmp(&hole_size(j)));
        let fills: std::collections::HashSet<usize> =
            order[..count - n].iter().copied().collect();

        let mut result = vec![self.elems[0].clone()];
        for i in 1..count {
            if fills.contains(&(i - 1)) {
                let merged = self.elems[i].clone();
                result
                    .last_mut()
                    .expect("result starts non-empty")
                    .expand(&merged);
            } else {
                result.push(self.elems[i].clone());
            }
        }
        debug_assert_eq!(result.len(), n);
        Ok(result)
    }

    /// Merge every `k` consecutive spans into one by expansion.
    pub fn split_each_n(&self, k: usize) -> Result<Vec<Span>> {
        if k == 0 {
            return Err(Error::arg_value("The number of spans must be positive"));
        }
        let mut result: Vec<Span> = Vec::with_capacity(self.elems.len().div_ceil(k));
        for (i, s) in self.elems.iter().enumerate() {
            if i % k == 0 {
                result.push(s.clone());
            } else {
                result
                    .last_mut()
                    .expect("chunk starts push a span")
                    .expand(s);
            }
        }
        Ok(result)
    }

    fn ensure_type(&self, expected: MobType) -> Result<()> {
        if self.span_set_type != expected {
            return Err(Error::arg_type(format!(
                "Operation requires a {}, not a {}",
                expected.name(),
                self.span_set_type.name()
            )));
        }
        Ok(())
    }

    /// Lexicographic comparison on composing spans, then on count.
    pub fn cmp_span_sets(&self, other: &SpanSet) -> Result<Ordering> {
        if self.span_set_type != other.span_set_type {
            return Err(Error::arg_type(format!(
                "Operation on mixed span set types: {} and {}",
                self.span_set_type.name(),
                other.span_set_type.name()
            )));
        }
        for (a, b) in self.elems.iter().zip(other.elems.iter()) {
            let ord = a.cmp_spans(b);
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(self.elems.len().cmp(&other.elems.len()))
    }

    pub fn hash32(&self) -> u32 {
        let mut h: u32 = 1;
        for s in &self.elems {
            h = hash::combine(h, s.hash32());
        }
        h
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        let mut h: u64 = 1;
        for s in &self.elems {
            h = hash::combine_extended(h, s.hash64(seed));
        }
        h
    }

    /// Text output.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        let mut out = String::from("{");
        for (i, s) in self.elems.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&s.to_wkt(maxdd));
        }
        out.push('}');
        out
    }
}

/// Merge overlapping or adjacent spans of a sorted array.
fn normalize_spans(spans: Vec<Span>) -> Vec<Span> {
    let mut iter = spans.into_iter();
    let mut current = iter.next().expect("normalization needs one span");
    let mut result = Vec::new();
    for next in iter {
        if current.ov_adj(&next) {
            current.expand(&next);
        } else {
            result.push(std::mem::replace(&mut current, next));
        }
    }
    result.push(current);
    result
}

impl From<Span> for SpanSet {
    fn from(span: Span) -> Self {
        SpanSet::new(vec![span], false, Ordered::Yes).expect("a single span is a valid span set")
    }
}

impl PartialEq for SpanSet {
    fn eq(&self, other: &Self) -> bool {
        self.span_set_type == other.span_set_type
            && self.cmp_span_sets(other) == Ok(Ordering::Equal)
    }
}

impl Eq for SpanSet {}

impl PartialOrd for SpanSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpanSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.span_set_type
            .cmp(&other.span_set_type)
            .then_with(|| self.cmp_span_sets(other).unwrap_or(Ordering::Equal))
    }
}

impl Hash for SpanSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl fmt::Display for SpanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MobType;

    #[test]
    fn parse_sorts_and_normalizes() {
        let ss = SpanSet::parse("{[4, 5), [1, 2), [2, 3)}", MobType::IntSpanSet).unwrap();
        assert_eq!(ss.to_wkt(15), "{[1, 3), [4, 5)}");
        assert_eq!(ss.num_spans(), 2);
        assert_eq!(ss.to_span().to_wkt(15), "[1, 5)");
    }

    #[test]
    fn empty_component_span_fails() {
        let err = SpanSet::parse("{[1,2], (3,4), (5,5)}", MobType::FloatSpanSet).unwrap_err();
        assert_eq!(err, Error::arg_value("Span cannot be empty"));
    }

    #[test]
    fn overlapping_spans_merge_under_normalization() {
        let ss = SpanSet::parse("{[1.0, 3.0], [2.0, 5.0]}", MobType::FloatSpanSet).unwrap();
        assert_eq!(ss.to_wkt(15), "{[1, 5]}");
    }

    #[test]
    fn touching_open_spans_stay_separate() {
        let ss = SpanSet::parse("{(1.0, 2.0), (2.0, 3.0)}", MobType::FloatSpanSet).unwrap();
        assert_eq!(ss.num_spans(), 2);
    }

    #[test]
    fn ordered_promise_rejects_overlap() {
        let spans = vec![
            Span::parse("[1.0, 3.0]", MobType::FloatSpan).unwrap(),
            Span::parse("[2.0, 5.0]", MobType::FloatSpan).unwrap(),
        ];
        let err = SpanSet::new(spans, false, Ordered::Yes).unwrap_err();
        assert!(err.to_string().contains("must be increasing"));
    }

    #[test]
    fn bounding_span_takes_outer_inclusivities() {
        let ss = SpanSet::parse("{(1.0, 2.0), [3.0, 4.0]}", MobType::FloatSpanSet).unwrap();
        assert_eq!(ss.to_span().to_wkt(15), "(1, 4]");
    }

    #[test]
    fn date_accessors_expose_stored_bounds() {
        let ss = SpanSet::parse(
            "{[2000-01-01, 2000-01-03), [2000-01-10, 2000-01-11)}",
            MobType::DateSpanSet,
        )
        .unwrap();
        assert_eq!(ss.num_dates().unwrap(), 4);
        assert_eq!(
            ss.date_n(1).unwrap(),
            Value::parse_text("2000-01-01", MobType::Date).unwrap()
        );
        assert_eq!(
            ss.date_n(4).unwrap(),
            Value::parse_text("2000-01-11", MobType::Date).unwrap()
        );
        assert_eq!(ss.duration(false).unwrap(), TimeDelta::days(3));
        assert_eq!(ss.duration(true).unwrap(), TimeDelta::days(10));
    }

    #[test]
    fn coincident_timestamps_are_enumerated_once() {
        let ss = SpanSet::parse(
            "{[2001-01-01, 2001-01-02), [2001-01-02, 2001-01-03)}",
            MobType::TstzSpanSet,
        )
        .unwrap();
        // Adjacent spans merge, leaving two distinct bounds.
        assert_eq!(ss.num_spans(), 1);
        assert_eq!(ss.num_timestamps().unwrap(), 2);

        let open = SpanSet::parse(
            "{(2001-01-01, 2001-01-02), (2001-01-02, 2001-01-03)}",
            MobType::TstzSpanSet,
        )
        .unwrap();
        assert_eq!(open.num_spans(), 2);
        assert_eq!(open.num_timestamps().unwrap(), 3);
    }

    #[test]
    fn split_n_fills_smallest_holes_first() {
        let ss = SpanSet::parse(
            "{[2000-01-01, 2000-01-10), [2000-01-20, 2000-01-25), [2000-02-01, 2000-02-03)}",
            MobType::DateSpanSet,
        )
        .unwrap();
        // Holes are 10 days and 7 days; the 7-day hole is filled.
        let spans = ss.split_n(2).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].to_wkt(15), "[2000-01-01, 2000-01-10)");
        assert_eq!(spans[1].to_wkt(15), "[2000-01-20, 2000-02-03)");
        // Fewer composing spans than requested: one span per element.
        assert_eq!(ss.split_n(7).unwrap().len(), 3);
        assert!(ss.split_n(0).is_err());
    }

    #[test]
    fn split_each_n_buckets_consecutive_spans() {
        let ss = SpanSet::parse(
            "{[1, 2), [3, 4), [5, 6), [7, 8), [9, 10)}",
            MobType::IntSpanSet,
        )
        .unwrap();
        let spans = ss.split_each_n(2).unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].to_wkt(15), "[1, 4)");
        assert_eq!(spans[1].to_wkt(15), "[5, 8)");
        assert_eq!(spans[2].to_wkt(15), "[9, 10)");
    }

    #[test]
    fn shift_scale_renormalizes() {
        let ss = SpanSet::parse("{[1.0, 2.0], [3.0, 4.0]}", MobType::FloatSpanSet).unwrap();
        let shifted = ss.shift_scale(Some(&Value::Float(10.0)), None).unwrap();
        assert_eq!(shifted.to_wkt(15), "{[11, 12], [13, 14]}");
        let scaled = ss.shift_scale(None, Some(&Value::Float(6.0))).unwrap();
        assert_eq!(scaled.to_wkt(15), "{[1, 3], [5, 7]}");
    }

    #[test]
    fn rounding_can_merge_components() {
        let ss = SpanSet::parse("{[1.01, 1.26], [1.34, 1.5]}", MobType::FloatSpanSet).unwrap();
        let rounded = ss.round(1).unwrap();
        assert_eq!(rounded.to_wkt(15), "{[1, 1.5]}");
    }

    #[test]
    fn comparison_and_hash_agree() {
        let a = SpanSet::parse("{[1, 2), [4, 5)}", MobType::IntSpanSet).unwrap();
        let b = SpanSet::parse("{[4, 5), [1, 2)}", MobType::IntSpanSet).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash32(), b.hash32());
        assert_eq!(a.hash64(3), b.hash64(3));
        let c = SpanSet::parse("{[1, 2), [4, 6)}", MobType::IntSpanSet).unwrap();
        assert_eq!(a.cmp_span_sets(&c).unwrap(), Ordering::Less);
        assert!(a.contains_value(&Value::Int(4)).unwrap());
        assert!(!a.contains_value(&Value::Int(3)).unwrap());
    }
}
