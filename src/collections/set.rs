//! Sets: ordered, deduplicated collections of base values in a packed
//! buffer.
//!
//! The element storage is a single owned byte buffer: one 8-byte slot per
//! `max_count` element followed by the word-aligned payload area. By-value
//! base types live directly in the slots; by-reference types (text,
//! geometry, network point) store an offset into the payload, where each
//! entry is length-prefixed and padded to the word size.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::TimeDelta;

use crate::boxes::stbox::STBox;
use crate::catalog::MobType;
use crate::collections::span::{shift_scale_bounds, shift_scale_time_bounds, Span};
use crate::collections::Ordered;
use crate::errors::{Error, Result};
use crate::geo::SRID_UNKNOWN;
use crate::hash;
use crate::parser::Cursor;
use crate::utils::{initcap, round_float};
use crate::value::Value;
use crate::ValueFlags;

const WORD: usize = 8;

fn word_pad(n: usize) -> usize {
    (n + WORD - 1) & !(WORD - 1)
}

#[derive(Debug, Clone)]
pub struct Set {
    set_type: MobType,
    base_type: MobType,
    flags: ValueFlags,
    count: usize,
    max_count: usize,
    bbox: Option<STBox>,
    buf: Vec<u8>,
}

impl Set {
    /// Build a set from an array of values.
    ///
    /// With `Ordered::No` the values are sorted and consecutive duplicates
    /// are removed; with `Ordered::Yes` the input is verified to be
    /// strictly increasing. Either way the result is ordered.
    ///
    /// # Example
    /// ```
    /// # use mobilis::collections::{Ordered, Set};
    /// # use mobilis::value::Value;
    /// let set = Set::new(&[Value::Int(3), Value::Int(1), Value::Int(3)], Ordered::No).unwrap();
    /// assert_eq!(set.to_wkt(15), "{1, 3}");
    /// ```
    pub fn new(values: &[Value], order: Ordered) -> Result<Set> {
        Set::with_capacity(values, values.len(), order)
    }

    /// Build a set sized for `max_count` elements.
    pub fn with_capacity(values: &[Value], max_count: usize, order: Ordered) -> Result<Set> {
        if values.is_empty() {
            return Err(Error::arg_value("A set must have at least one element"));
        }
        if values.len() > max_count {
            return Err(Error::arg_value(
                "The maximum number of elements cannot be less than the number of elements",
            ));
        }
        let base_type = values[0].mob_type();
        let set_type = base_type.expect_set_type()?;
        for v in values {
            if v.mob_type() != base_type {
                return Err(Error::arg_type(format!(
                    "Set elements of mixed types: {} and {}",
                    base_type.name(),
                    v.mob_type().name()
                )));
            }
        }

        let mut has_z = false;
        let mut geodetic = false;
        if base_type.is_spatial() && base_type != MobType::NPoint {
            let first = values[0].as_geo().expect("spatial base carries a geometry");
            let srid = first.srid();
            has_z = first.has_z();
            geodetic = first.is_geodetic();
            for v in values {
                let g = v.as_geo().expect("spatial base carries a geometry");
                if g.is_empty() {
                    return Err(Error::arg_value("Input geometries cannot be empty"));
                }
                if g.srid() != srid {
                    return Err(Error::arg_value(format!(
                        "Operation on mixed SRID: {} and {}",
                        srid,
                        g.srid()
                    )));
                }
                if g.has_z() != has_z || g.is_geodetic() != geodetic {
                    return Err(Error::arg_value(
                        "Operation on geometries of mixed dimensionality",
                    ));
                }
            }
        }

        let sorted: Vec<Value> = match order {
            Ordered::No => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.cmp_same(b));
                sorted.dedup_by(|a, b| a.cmp_same(b) == Ordering::Equal);
                sorted
            }
            Ordered::Yes => {
                for pair in values.windows(2) {
                    if pair[0].cmp_same(&pair[1]) != Ordering::Less {
                        return Err(Error::arg_value(
                            "The elements of a set must be increasing",
                        ));
                    }
                }
                values.to_vec()
            }
        };
        let count = sorted.len();
        let max_count = max_count.max(count);

        let by_value = base_type.is_by_value();
        let mut flags = ValueFlags::Ordered;
        if by_value {
            flags |= ValueFlags::ByValue;
        }
        if base_type.is_spatial() {
            flags |= ValueFlags::X;
            if has_z {
                flags |= ValueFlags::Z;
            }
            if geodetic {
                flags |= ValueFlags::Geodetic;
            }
        }

        let slots_len = max_count * WORD;
        let mut buf;
        if by_value {
            buf = vec![0u8; slots_len];
            for (i, v) in sorted.iter().enumerate() {
                buf[i * WORD..(i + 1) * WORD].copy_from_slice(&v.to_word()?.to_le_bytes());
            }
        } else {
            let payloads: Vec<Vec<u8>> = sorted
                .iter()
                .map(|v| v.to_payload())
                .collect::<Result<_>>()?;
            let payload_len: usize = payloads.iter().map(|p| word_pad(4 + p.len())).sum();
            buf = vec![0u8; slots_len + payload_len];
            let mut pos = 0usize;
            for (i, payload) in payloads.iter().enumerate() {
                buf[i * WORD..(i + 1) * WORD].copy_from_slice(&(pos as u64).to_le_bytes());
                let at = slots_len + pos;
                buf[at..at + 4].copy_from_slice(&(payload.len() as u32).to_le_bytes());
                buf[at + 4..at + 4 + payload.len()].copy_from_slice(payload);
                pos += word_pad(4 + payload.len());
            }
        }

        let bbox = if matches!(base_type, MobType::Geometry | MobType::Geography) {
            let mut bbox: Option<STBox> = None;
            for v in &sorted {
                let b = STBox::from_geo(v.as_geo().expect("spatial base carries a geometry"))?;
                match &mut bbox {
                    Some(acc) => acc.expand(&b)?,
                    None => bbox = Some(b),
                }
            }
            bbox
        } else {
            None
        };

        Ok(Set {
            set_type,
            base_type,
            flags,
            count,
            max_count,
            bbox,
            buf,
        })
    }

    /// Parse a set of the given type from its text form.
    pub fn parse(s: &str, set_type: MobType) -> Result<Set> {
        let mut cur = Cursor::new(s);
        let type_str = set_type.name();
        let base_type = set_type.expect_base_type()?;
        let srid = cur.parse_srid()?;
        if srid.is_some() && !set_type.is_spatial() {
            return Err(Error::parse(type_str, "SRID prefix is not allowed"));
        }
        cur.expect_obrace(type_str)?;
        if cur.peek() == Some(b'}') {
            return Err(Error::parse(type_str, "Missing composing value"));
        }
        let mut values = vec![Value::parse_text(cur.scan_element()?, base_type)?];
        while cur.try_comma() {
            values.push(Value::parse_text(cur.scan_element()?, base_type)?);
        }
        cur.expect_cbrace(type_str)?;
        cur.expect_end(type_str)?;
        if let Some(srid) = srid {
            for v in &mut values {
                if let Value::Geom(g) | Value::Geog(g) = v {
                    g.set_srid(srid);
                }
            }
        }
        Set::new(&values, Ordered::No)
    }

    pub fn set_type(&self) -> MobType {
        self.set_type
    }

    pub fn base_type(&self) -> MobType {
        self.base_type
    }

    pub(crate) fn flags(&self) -> ValueFlags {
        self.flags
    }

    pub fn num_values(&self) -> usize {
        self.count
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// The precomputed spatial bounding box, for geo sets.
    pub fn bbox(&self) -> Option<&STBox> {
        self.bbox.as_ref()
    }

    fn value_at(&self, idx: usize) -> Result<Value> {
        debug_assert!(idx < self.count);
        let word = u64::from_le_bytes(self.buf[idx * WORD..(idx + 1) * WORD].try_into().unwrap());
        if self.flags.contains(ValueFlags::ByValue) {
            Value::from_word(word, self.base_type)
        } else {
            let at = self.max_count * WORD + word as usize;
            let len =
                u32::from_le_bytes(self.buf[at..at + 4].try_into().unwrap()) as usize;
            Value::from_payload(&self.buf[at + 4..at + 4 + len], self.base_type)
        }
    }

    /// The n-th value, 1-based.
    pub fn value_n(&self, n: usize) -> Result<Value> {
        if n < 1 || n > self.count {
            return Err(Error::arg_value(format!(
                "Invalid element number: {n}"
            )));
        }
        self.value_at(n - 1)
    }

    pub fn start_value(&self) -> Result<Value> {
        self.value_at(0)
    }

    pub fn end_value(&self) -> Result<Value> {
        self.value_at(self.count - 1)
    }

    /// Owned copies of all elements, in order.
    pub fn values(&self) -> Result<Vec<Value>> {
        (0..self.count).map(|i| self.value_at(i)).collect()
    }

    pub fn contains(&self, value: &Value) -> Result<bool> {
        if value.mob_type() != self.base_type {
            return Err(Error::arg_type(format!(
                "Cannot test a {} value against a {}",
                value.mob_type().name(),
                self.set_type.name()
            )));
        }
        let values = self.values()?;
        Ok(values
            .binary_search_by(|v| v.cmp_same(value))
            .is_ok())
    }

    /// Smallest span covering the set, for span-compatible base types.
    pub fn to_span(&self) -> Result<Span> {
        Span::new(self.start_value()?, self.end_value()?, true, true)
    }

    /// Rebuild the buffer with no spare capacity.
    pub fn compact(&self) -> Result<Set> {
        Set::new(&self.values()?, Ordered::Yes)
    }

    /// SRID of a spatial set.
    pub fn srid(&self) -> Result<i32> {
        if !self.set_type.is_spatial() {
            return Err(Error::arg_type(format!(
                "Type {} has no SRID",
                self.set_type.name()
            )));
        }
        match &self.bbox {
            Some(b) => Ok(b.srid()),
            None => Ok(SRID_UNKNOWN),
        }
    }

    /// Return a geo set with every element stamped with `srid`.
    pub fn set_srid(&self, srid: i32) -> Result<Set> {
        if !matches!(self.base_type, MobType::Geometry | MobType::Geography) {
            return Err(Error::arg_type(format!(
                "Cannot set the SRID of a {}",
                self.set_type.name()
            )));
        }
        let mut values = self.values()?;
        for v in &mut values {
            if let Value::Geom(g) | Value::Geog(g) = v {
                g.set_srid(srid);
            }
        }
        Set::new(&values, Ordered::No)
    }

    /// Text output. Geo sets emit their SRID once at the head.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        if maxdd < 0 {
            // Callers validate; keep output total anyway.
            return self.to_wkt(0);
        }
        let mut out = String::new();
        if let Some(bbox) = &self.bbox {
            if bbox.srid() > 0 {
                out.push_str(&format!("SRID={};", bbox.srid()));
            }
        }
        out.push('{');
        for i in 0..self.count {
            if i > 0 {
                out.push_str(", ");
            }
            let v = self.value_at(i).expect("buffer holds count elements");
            let body = v.output(maxdd);
            if quoted_in_set(self.base_type) {
                out.push('"');
                out.push_str(&body);
                out.push('"');
            } else {
                out.push_str(&body);
            }
        }
        out.push('}');
        out
    }

    fn map_floats(&self, f: impl Fn(f64) -> f64) -> Result<Set> {
        let values = self
            .float_values()?
            .into_iter()
            .map(|v| Value::Float(f(v)))
            .collect::<Vec<_>>();
        Set::new(&values, Ordered::No)
    }

    fn float_values(&self) -> Result<Vec<f64>> {
        if self.base_type != MobType::Float {
            return Err(Error::arg_type(format!(
                "Operation requires a floatset, not a {}",
                self.set_type.name()
            )));
        }
        Ok(self
            .values()?
            .into_iter()
            .map(|v| v.as_float().expect("floatset holds floats"))
            .collect())
    }

    pub fn floor(&self) -> Result<Set> {
        self.map_floats(f64::floor)
    }

    pub fn ceil(&self) -> Result<Set> {
        self.map_floats(f64::ceil)
    }

    /// Round every element to `maxdd` decimal digits.
    pub fn round(&self, maxdd: i32) -> Result<Set> {
        if maxdd < 0 {
            return Err(Error::arg_value("The number of decimal digits must not be negative"));
        }
        self.map_floats(|v| round_float(v, maxdd))
    }

    /// Convert radians to degrees, optionally normalized to `[0, 360)`.
    pub fn degrees(&self, normalize: bool) -> Result<Set> {
        self.map_floats(|v| {
            let mut d = v.to_degrees();
            if normalize {
                d = d.rem_euclid(360.0);
            }
            d
        })
    }

    pub fn radians(&self) -> Result<Set> {
        self.map_floats(f64::to_radians)
    }

    fn map_texts(&self, f: impl Fn(&str) -> String) -> Result<Set> {
        if self.base_type != MobType::Text {
            return Err(Error::arg_type(format!(
                "Operation requires a textset, not a {}",
                self.set_type.name()
            )));
        }
        let values = self
            .values()?
            .into_iter()
            .map(|v| Value::Text(f(v.as_text().expect("textset holds text"))))
            .collect::<Vec<_>>();
        Set::new(&values, Ordered::No)
    }

    pub fn lowercase(&self) -> Result<Set> {
        self.map_texts(|s| s.to_lowercase())
    }

    pub fn uppercase(&self) -> Result<Set> {
        self.map_texts(|s| s.to_uppercase())
    }

    pub fn initcap(&self) -> Result<Set> {
        self.map_texts(initcap)
    }

    /// Concatenate `txt` to every element; `invert` prepends instead.
    pub fn textcat(&self, txt: &str, invert: bool) -> Result<Set> {
        self.map_texts(|s| {
            if invert {
                format!("{txt}{s}")
            } else {
                format!("{s}{txt}")
            }
        })
    }

    /// Shift and/or scale a numeric or date set.
    ///
    /// The first and last elements move exactly as span bounds would;
    /// interior elements are rescaled linearly against the first.
    pub fn shift_scale(&self, shift: Option<&Value>, width: Option<&Value>) -> Result<Set> {
        if !self.set_type.is_numeric() && self.base_type != MobType::Date {
            return Err(Error::arg_type(format!(
                "Cannot shift or scale a {}",
                self.set_type.name()
            )));
        }
        let values = self.values()?;
        let lower = &values[0];
        let upper = &values[self.count - 1];
        let (lower1, upper1) =
            shift_scale_bounds(lower, upper, shift, width, self.base_type)?;
        let rescaled = rescale(&values, lower, upper, &lower1, &upper1, self.base_type)?;
        Set::new(&rescaled, Ordered::No)
    }

    /// Shift and/or scale a timestamptz set by intervals.
    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<Set> {
        if self.base_type != MobType::TimestampTz {
            return Err(Error::arg_type(format!(
                "Cannot shift a {} by an interval",
                self.set_type.name()
            )));
        }
        let values = self.values()?;
        let lower = values[0].as_timestamp().expect("tstzset holds timestamps");
        let upper = values[self.count - 1]
            .as_timestamp()
            .expect("tstzset holds timestamps");
        let (lower1, upper1) = shift_scale_time_bounds(lower, upper, shift, duration)?;
        let rescaled = rescale(
            &values,
            &Value::Timestamp(lower),
            &Value::Timestamp(upper),
            &Value::Timestamp(lower1),
            &Value::Timestamp(upper1),
            self.base_type,
        )?;
        Set::new(&rescaled, Ordered::No)
    }

    /// Lexicographic comparison on elements, then on count.
    pub fn cmp_sets(&self, other: &Set) -> Result<Ordering> {
        if self.set_type != other.set_type {
            return Err(Error::arg_type(format!(
                "Operation on mixed set types: {} and {}",
                self.set_type.name(),
                other.set_type.name()
            )));
        }
        let n = self.count.min(other.count);
        for i in 0..n {
            let ord = self.value_at(i)?.cmp_same(&other.value_at(i)?);
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(self.count.cmp(&other.count))
    }

    pub fn hash32(&self) -> u32 {
        let mut h: u32 = 1;
        for i in 0..self.count {
            if let Ok(v) = self.value_at(i) {
                h = hash::combine(h, v.hash32());
            }
        }
        h
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        let mut h: u64 = 1;
        for i in 0..self.count {
            if let Ok(v) = self.value_at(i) {
                h = hash::combine_extended(h, v.hash64(seed));
            }
        }
        h
    }
}

/// Map every element through the bound transformation: endpoints take the
/// new bounds, interior elements are shifted and rescaled linearly.
fn rescale(
    values: &[Value],
    lower: &Value,
    upper: &Value,
    lower1: &Value,
    upper1: &Value,
    base_type: MobType,
) -> Result<Vec<Value>> {
    let count = values.len();
    let mut out = Vec::with_capacity(count);
    out.push(lower1.clone());
    if count == 1 {
        return Ok(out);
    }
    let old_lo = lower.as_double()?;
    let old_hi = upper.as_double()?;
    let new_lo = lower1.as_double()?;
    let new_hi = upper1.as_double()?;
    let scale = if old_hi > old_lo {
        (new_hi - new_lo) / (old_hi - old_lo)
    } else {
        1.0
    };
    for v in &values[1..count - 1] {
        let x = new_lo + (v.as_double()? - old_lo) * scale;
        out.push(interior_value(x, v, base_type)?);
    }
    out.push(upper1.clone());
    Ok(out)
}

fn interior_value(x: f64, template: &Value, base_type: MobType) -> Result<Value> {
    if base_type == MobType::TimestampTz {
        let micros = x.round() as i64;
        chrono::DateTime::from_timestamp_micros(micros)
            .map(Value::Timestamp)
            .ok_or_else(|| Error::arg_value("timestamp out of range"))
    } else {
        let _ = template;
        Value::from_double(x, base_type)
    }
}

/// Timestamptz and spatial elements are quoted in set output; text quotes
/// itself.
fn quoted_in_set(base_type: MobType) -> bool {
    matches!(
        base_type,
        MobType::TimestampTz | MobType::Geometry | MobType::Geography | MobType::NPoint
    )
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.set_type == other.set_type
            && self.cmp_sets(other) == Ok(Ordering::Equal)
    }
}

impl Eq for Set {}

impl PartialOrd for Set {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Set {
    fn cmp(&self, other: &Self) -> Ordering {
        self.set_type
            .cmp(&other.set_type)
            .then_with(|| self.cmp_sets(other).unwrap_or(Ordering::Equal))
    }
}

impl Hash for Set {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}
