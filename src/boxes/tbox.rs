//! Temporal boxes: an optional numeric value span plus an optional
//! timestamptz span. At least one dimension must be present.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};

use crate::catalog::MobType;
use crate::collections::span::Span;
use crate::errors::{Error, Result};
use crate::hash;
use crate::parser::Cursor;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct TBox {
    span: Option<Span>,
    period: Option<Span>,
}

impl TBox {
    pub fn new(span: Option<Span>, period: Option<Span>) -> Result<TBox> {
        if span.is_none() && period.is_none() {
            return Err(Error::arg_value(
                "A temporal box must have at least one dimension",
            ));
        }
        if let Some(s) = &span {
            if !s.span_type().is_numeric() {
                return Err(Error::arg_type(format!(
                    "The value span of a temporal box must be numeric, not {}",
                    s.span_type().name()
                )));
            }
        }
        if let Some(p) = &period {
            if p.span_type() != MobType::TstzSpan {
                return Err(Error::arg_type(format!(
                    "The time span of a temporal box must be a tstzspan, not {}",
                    p.span_type().name()
                )));
            }
        }
        Ok(TBox { span, period })
    }

    /// Degenerate box from a single numeric value.
    pub fn from_value(value: Value) -> Result<TBox> {
        TBox::new(Some(Span::from_value(value)?), None)
    }

    /// Degenerate box from a single timestamp.
    pub fn from_timestamptz(t: DateTime<Utc>) -> Result<TBox> {
        TBox::new(None, Some(Span::from_value(Value::Timestamp(t))?))
    }

    /// Parse from the text form
    /// `TBOX[INT|FLOAT] {X|T|XT}(<value-span>[, <tstz-span>])`.
    pub fn parse(s: &str) -> Result<TBox> {
        let type_str = MobType::TBox.name();
        let mut cur = Cursor::new(s);
        // The span type defaults to float.
        let span_type = if cur.try_keyword("TBOXINT") {
            MobType::IntSpan
        } else if cur.try_keyword("TBOXFLOAT") || cur.try_keyword("TBOX") {
            MobType::FloatSpan
        } else {
            return Err(Error::parse(type_str, "Missing prefix 'TBox'"));
        };
        let (has_x, has_t) = if cur.try_keyword("XT") {
            (true, true)
        } else if cur.try_keyword("X") {
            (true, false)
        } else if cur.try_keyword("T") {
            (false, true)
        } else {
            return Err(Error::parse(type_str, "Missing dimension information"));
        };
        cur.expect_oparen(type_str)?;
        let span = if has_x {
            let span = Span::parse_cursor(&mut cur, span_type, false)?;
            if has_t {
                cur.try_comma();
            }
            Some(span)
        } else {
            None
        };
        let period = if has_t {
            Some(Span::parse_cursor(&mut cur, MobType::TstzSpan, false)?)
        } else {
            None
        };
        cur.expect_cparen(type_str)?;
        cur.expect_end(type_str)?;
        TBox::new(span, period)
    }

    pub fn has_x(&self) -> bool {
        self.span.is_some()
    }

    pub fn has_t(&self) -> bool {
        self.period.is_some()
    }

    pub fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }

    pub fn period(&self) -> Option<&Span> {
        self.period.as_ref()
    }

    pub fn xmin(&self) -> Option<Value> {
        self.span.as_ref().map(|s| s.lower().clone())
    }

    pub fn xmax(&self) -> Option<Value> {
        self.span.as_ref().map(|s| s.upper().clone())
    }

    pub fn is_xmin_inclusive(&self) -> Option<bool> {
        self.span.as_ref().map(Span::is_lower_inclusive)
    }

    pub fn is_xmax_inclusive(&self) -> Option<bool> {
        self.span.as_ref().map(Span::is_upper_inclusive)
    }

    pub fn tmin(&self) -> Option<DateTime<Utc>> {
        self.period.as_ref().and_then(|p| p.lower().as_timestamp())
    }

    pub fn tmax(&self) -> Option<DateTime<Utc>> {
        self.period.as_ref().and_then(|p| p.upper().as_timestamp())
    }

    pub fn is_tmin_inclusive(&self) -> Option<bool> {
        self.period.as_ref().map(Span::is_lower_inclusive)
    }

    pub fn is_tmax_inclusive(&self) -> Option<bool> {
        self.period.as_ref().map(Span::is_upper_inclusive)
    }

    /// Grow this box to the union of itself and `other`. Both boxes must
    /// have the same dimensions.
    pub fn expand(&mut self, other: &TBox) -> Result<()> {
        if self.has_x() != other.has_x() || self.has_t() != other.has_t() {
            return Err(Error::arg_value(
                "Operation on temporal boxes of mixed dimensions",
            ));
        }
        if let (Some(a), Some(b)) = (&mut self.span, &other.span) {
            a.ensure_same_type(b)?;
            a.expand(b);
        }
        if let (Some(a), Some(b)) = (&mut self.period, &other.period) {
            a.expand(b);
        }
        Ok(())
    }

    /// Round the value span of a float box to `maxdd` decimal digits.
    pub fn round(&self, maxdd: i32) -> Result<TBox> {
        let span = match &self.span {
            Some(s) => Some(s.round(maxdd)?),
            None => None,
        };
        TBox::new(span, self.period.clone())
    }

    /// Shift and/or scale the value dimension.
    pub fn shift_scale_value(
        &self,
        shift: Option<&Value>,
        width: Option<&Value>,
    ) -> Result<TBox> {
        let span = self
            .span
            .as_ref()
            .ok_or_else(|| Error::arg_value("The box has no value dimension"))?;
        TBox::new(Some(span.shift_scale(shift, width)?), self.period.clone())
    }

    /// Shift and/or scale the time dimension.
    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<TBox> {
        let period = self
            .period
            .as_ref()
            .ok_or_else(|| Error::arg_value("The box has no time dimension"))?;
        TBox::new(
            self.span.clone(),
            Some(period.shift_scale_time(shift, duration)?),
        )
    }

    /// Order on `(span, period)`, missing dimensions first.
    pub fn cmp_boxes(&self, other: &TBox) -> Ordering {
        cmp_option_spans(&self.span, &other.span)
            .then_with(|| cmp_option_spans(&self.period, &other.period))
    }

    pub fn hash32(&self) -> u32 {
        let mut h: u32 = 1;
        if let Some(s) = &self.span {
            h = hash::combine(h, s.hash32());
        }
        if let Some(p) = &self.period {
            h = hash::combine(h, p.hash32());
        }
        h
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        let mut h: u64 = 1;
        if let Some(s) = &self.span {
            h = hash::combine_extended(h, s.hash64(seed));
        }
        if let Some(p) = &self.period {
            h = hash::combine_extended(h, p.hash64(seed));
        }
        h
    }

    /// Text output mirroring the parse grammar.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        let prefix = match &self.span {
            Some(s) if s.span_type() == MobType::IntSpan => "TBOXINT",
            Some(_) => "TBOXFLOAT",
            None => "TBOX",
        };
        let dim = match (&self.span, &self.period) {
            (Some(_), Some(_)) => "XT",
            (Some(_), None) => "X",
            (None, _) => "T",
        };
        let mut body = String::new();
        if let Some(s) = &self.span {
            body.push_str(&s.to_wkt(maxdd));
        }
        if let Some(p) = &self.period {
            if self.span.is_some() {
                body.push(',');
            }
            body.push_str(&p.to_wkt(maxdd));
        }
        format!("{prefix} {dim}({body})")
    }
}

fn cmp_option_spans(a: &Option<Span>, b: &Option<Span>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

impl PartialEq for TBox {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_boxes(other) == Ordering::Equal
    }
}

impl Eq for TBox {}

impl PartialOrd for TBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_boxes(other))
    }
}

impl Ord for TBox {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_boxes(other)
    }
}

impl Hash for TBox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl std::str::FromStr for TBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<TBox> {
        TBox::parse(s)
    }
}

impl fmt::Display for TBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}
