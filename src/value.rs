//! Owned base values.
//!
//! `Value` is the tagged sum standing in for the legacy machine-word
//! abstraction: one variant per base type, with the catalog's `is_by_value`
//! flag deciding whether a variant travels as an inline word or as packed
//! payload bytes inside a set.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::catalog::MobType;
use crate::datetime;
use crate::errors::{Error, Result};
use crate::geo::{GeoValue, NPoint};
use crate::hash;
use crate::utils::{format_float, quote_text, unescape_text};

#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    BigInt(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Geom(GeoValue),
    Geog(GeoValue),
    NPoint(NPoint),
}

macro_rules! scalar_getters {
    ($(($name:ident, $variant:ident, $ty:ty)),+ $(,)?) => {
        paste::paste! {
            $(
                #[doc = concat!("The inner value, when this is a `", stringify!($variant), "`.")]
                pub fn [<as_ $name>](&self) -> Option<$ty> {
                    match self {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            )+
        }
    };
}

impl Value {
    pub fn mob_type(&self) -> MobType {
        match self {
            Value::Int(_) => MobType::Int,
            Value::BigInt(_) => MobType::BigInt,
            Value::Float(_) => MobType::Float,
            Value::Text(_) => MobType::Text,
            Value::Date(_) => MobType::Date,
            Value::Timestamp(_) => MobType::TimestampTz,
            Value::Geom(_) => MobType::Geometry,
            Value::Geog(_) => MobType::Geography,
            Value::NPoint(_) => MobType::NPoint,
        }
    }

    scalar_getters!(
        (int, Int, i32),
        (bigint, BigInt, i64),
        (float, Float, f64),
        (date, Date, NaiveDate),
        (timestamp, Timestamp, DateTime<Utc>),
    );

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_geo(&self) -> Option<&GeoValue> {
        match self {
            Value::Geom(g) | Value::Geog(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_npoint(&self) -> Option<&NPoint> {
        match self {
            Value::NPoint(np) => Some(np),
            _ => None,
        }
    }

    /// Convert a captured text slice into an owned value of `base_type`.
    pub fn parse_text(s: &str, base_type: MobType) -> Result<Value> {
        let trimmed = s.trim();
        match base_type {
            MobType::Int => trimmed
                .parse::<i32>()
                .map(Value::Int)
                .map_err(|_| Error::text(format!("Invalid input syntax for type int: \"{trimmed}\""))),
            MobType::BigInt => trimmed
                .parse::<i64>()
                .map(Value::BigInt)
                .map_err(|_| {
                    Error::text(format!("Invalid input syntax for type bigint: \"{trimmed}\""))
                }),
            MobType::Float => trimmed
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| {
                    Error::text(format!("Invalid input syntax for type float: \"{trimmed}\""))
                }),
            MobType::Text => Ok(Value::Text(unescape_text(s))),
            MobType::Date => datetime::parse_date(trimmed).map(Value::Date),
            MobType::TimestampTz => datetime::parse_timestamptz(trimmed).map(Value::Timestamp),
            MobType::Geometry => GeoValue::from_wkt(trimmed, false).map(Value::Geom),
            MobType::Geography => GeoValue::from_wkt(trimmed, true).map(Value::Geog),
            MobType::NPoint => trimmed.parse::<NPoint>().map(Value::NPoint),
            other => Err(Error::internal(format!(
                "Type {} is not a base type",
                other.name()
            ))),
        }
    }

    /// Text output of a single value. Text is quoted, geometries are
    /// printed without their SRID (containers hoist it into a prefix).
    pub fn output(&self, maxdd: i32) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::BigInt(v) => v.to_string(),
            Value::Float(v) => format_float(*v, maxdd),
            Value::Text(s) => quote_text(s),
            Value::Date(d) => datetime::format_date(*d),
            Value::Timestamp(t) => datetime::format_timestamptz(*t),
            Value::Geom(g) | Value::Geog(g) => g.to_wkt(maxdd),
            Value::NPoint(np) => np.to_wkt(maxdd),
        }
    }

    /// Order between two values of the same base type.
    pub(crate) fn cmp_same(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => {
                normalize_float(*a).total_cmp(&normalize_float(*b))
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Geom(a), Value::Geom(b)) => a.cmp(b),
            (Value::Geog(a), Value::Geog(b)) => a.cmp(b),
            (Value::NPoint(a), Value::NPoint(b)) => a.cmp(b),
            _ => self.mob_type().cmp(&other.mob_type()),
        }
    }

    /// Catalog-checked comparison.
    pub fn try_cmp(&self, other: &Value) -> Result<Ordering> {
        if self.mob_type() != other.mob_type() {
            return Err(Error::arg_type(format!(
                "Operation on mixed types: {} and {}",
                self.mob_type().name(),
                other.mob_type().name()
            )));
        }
        Ok(self.cmp_same(other))
    }

    /// Successor in a discrete (canonical) domain.
    pub(crate) fn succ(&self) -> Result<Value> {
        match self {
            Value::Int(v) => v
                .checked_add(1)
                .map(Value::Int)
                .ok_or_else(|| Error::arg_value("int bound out of range")),
            Value::BigInt(v) => v
                .checked_add(1)
                .map(Value::BigInt)
                .ok_or_else(|| Error::arg_value("bigint bound out of range")),
            Value::Date(d) => d
                .succ_opt()
                .map(Value::Date)
                .ok_or_else(|| Error::arg_value("date bound out of range")),
            other => Err(Error::internal(format!(
                "Type {} has no canonical successor",
                other.mob_type().name()
            ))),
        }
    }

    /// Addition used by shift transformations. Dates shift by whole days.
    pub(crate) fn add(&self, delta: &Value) -> Result<Value> {
        match (self, delta) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
            (Value::BigInt(a), Value::BigInt(b)) => Ok(Value::BigInt(a.wrapping_add(*b))),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Value::Date(d), Value::Int(days)) => d
                .checked_add_signed(chrono::TimeDelta::days(*days as i64))
                .map(Value::Date)
                .ok_or_else(|| Error::arg_value("date out of range")),
            _ => Err(Error::arg_type(format!(
                "Cannot add {} to {}",
                delta.mob_type().name(),
                self.mob_type().name()
            ))),
        }
    }

    /// Numeric view used when rescaling interior elements.
    pub(crate) fn as_double(&self) -> Result<f64> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::BigInt(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            Value::Date(d) => Ok(d.num_days_from_ce() as f64),
            Value::Timestamp(t) => Ok(t.timestamp_micros() as f64),
            other => Err(Error::arg_type(format!(
                "Type {} has no numeric value",
                other.mob_type().name()
            ))),
        }
    }

    /// Back from the numeric view, rounding discrete domains.
    pub(crate) fn from_double(x: f64, base_type: MobType) -> Result<Value> {
        match base_type {
            MobType::Int => Ok(Value::Int(x.round() as i32)),
            MobType::BigInt => Ok(Value::BigInt(x.round() as i64)),
            MobType::Float => Ok(Value::Float(x)),
            MobType::Date => NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
                .map(Value::Date)
                .ok_or_else(|| Error::arg_value("date out of range")),
            other => Err(Error::arg_type(format!(
                "Type {} has no numeric value",
                other.name()
            ))),
        }
    }

    /// True when the value is strictly positive; used to validate widths.
    pub(crate) fn is_positive(&self) -> bool {
        match self {
            Value::Int(v) => *v > 0,
            Value::BigInt(v) => *v > 0,
            Value::Float(v) => *v > 0.0,
            _ => false,
        }
    }

    pub(crate) fn hash32(&self) -> u32 {
        match self {
            Value::Int(v) => hash::hash_u32(*v as u32),
            Value::BigInt(v) => fold64(hash::hash_u64(*v as u64)),
            Value::Float(v) => fold64(hash::hash_u64(normalize_float(*v).to_bits())),
            Value::Text(s) => hash::hash_bytes(s.as_bytes()),
            Value::Date(d) => hash::hash_u32(d.num_days_from_ce() as u32),
            Value::Timestamp(t) => fold64(hash::hash_u64(t.timestamp_micros() as u64)),
            Value::Geom(g) | Value::Geog(g) => g.hash32(),
            Value::NPoint(np) => np.hash32(),
        }
    }

    pub(crate) fn hash64(&self, seed: u64) -> u64 {
        match self {
            Value::Int(v) => hash::hash_u64_extended(*v as u64, seed),
            Value::BigInt(v) => hash::hash_u64_extended(*v as u64, seed),
            Value::Float(v) => hash::hash_u64_extended(normalize_float(*v).to_bits(), seed),
            Value::Text(s) => hash::hash_bytes_extended(s.as_bytes(), seed),
            Value::Date(d) => hash::hash_u64_extended(d.num_days_from_ce() as u64, seed),
            Value::Timestamp(t) => hash::hash_u64_extended(t.timestamp_micros() as u64, seed),
            Value::Geom(g) | Value::Geog(g) => g.hash64(seed),
            Value::NPoint(np) => np.hash64(seed),
        }
    }

    /// Inline word for by-value base types.
    pub(crate) fn to_word(&self) -> Result<u64> {
        match self {
            Value::Int(v) => Ok(*v as i64 as u64),
            Value::BigInt(v) => Ok(*v as u64),
            Value::Float(v) => Ok(v.to_bits()),
            Value::Date(d) => Ok(d.num_days_from_ce() as i64 as u64),
            Value::Timestamp(t) => Ok(t.timestamp_micros() as u64),
            other => Err(Error::internal(format!(
                "Type {} is not passed by value",
                other.mob_type().name()
            ))),
        }
    }

    pub(crate) fn from_word(word: u64, base_type: MobType) -> Result<Value> {
        match base_type {
            MobType::Int => Ok(Value::Int(word as i64 as i32)),
            MobType::BigInt => Ok(Value::BigInt(word as i64)),
            MobType::Float => Ok(Value::Float(f64::from_bits(word))),
            MobType::Date => NaiveDate::from_num_days_from_ce_opt(word as i64 as i32)
                .map(Value::Date)
                .ok_or_else(|| Error::internal("Corrupt date word")),
            MobType::TimestampTz => DateTime::from_timestamp_micros(word as i64)
                .map(Value::Timestamp)
                .ok_or_else(|| Error::internal("Corrupt timestamp word")),
            other => Err(Error::internal(format!(
                "Type {} is not passed by value",
                other.name()
            ))),
        }
    }

    /// Packed payload for by-reference base types.
    pub(crate) fn to_payload(&self) -> Result<Vec<u8>> {
        match self {
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            Value::Geom(g) | Value::Geog(g) => Ok(g.to_ewkt(17).into_bytes()),
            Value::NPoint(np) => {
                let mut bytes = Vec::with_capacity(16);
                bytes.extend_from_slice(&np.route().to_le_bytes());
                bytes.extend_from_slice(&np.position().to_bits().to_le_bytes());
                Ok(bytes)
            }
            other => Err(Error::internal(format!(
                "Type {} is passed by value",
                other.mob_type().name()
            ))),
        }
    }

    pub(crate) fn from_payload(bytes: &[u8], base_type: MobType) -> Result<Value> {
        match base_type {
            MobType::Text => String::from_utf8(bytes.to_vec())
                .map(Value::Text)
                .map_err(|_| Error::internal("Corrupt text payload")),
            MobType::Geometry | MobType::Geography => {
                let s = std::str::from_utf8(bytes)
                    .map_err(|_| Error::internal("Corrupt geometry payload"))?;
                let g = GeoValue::from_wkt(s, base_type == MobType::Geography)?;
                Ok(if base_type == MobType::Geometry {
                    Value::Geom(g)
                } else {
                    Value::Geog(g)
                })
            }
            MobType::NPoint => {
                if bytes.len() != 16 {
                    return Err(Error::internal("Corrupt network point payload"));
                }
                let rid = i64::from_le_bytes(bytes[..8].try_into().unwrap());
                let pos = f64::from_bits(u64::from_le_bytes(bytes[8..].try_into().unwrap()));
                NPoint::new(rid, pos).map(Value::NPoint)
            }
            other => Err(Error::internal(format!(
                "Type {} is passed by value",
                other.name()
            ))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.mob_type() == other.mob_type() && self.cmp_same(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.mob_type()
            .cmp(&other.mob_type())
            .then_with(|| self.cmp_same(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output(15))
    }
}

fn normalize_float(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn fold64(h: u64) -> u32 {
    (h ^ (h >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_output_round_trip() {
        let cases = [
            ("42", MobType::Int, "42"),
            ("9000000000", MobType::BigInt, "9000000000"),
            ("1.50", MobType::Float, "1.5"),
            ("2001-01-01", MobType::Date, "2001-01-01"),
            ("NPOINT(3, 0.25)", MobType::NPoint, "NPOINT(3,0.25)"),
        ];
        for (input, ty, expected) in cases {
            let v = Value::parse_text(input, ty).unwrap();
            assert_eq!(v.output(15), expected);
            assert_eq!(v.mob_type(), ty);
        }
    }

    #[test]
    fn text_is_quoted_on_output() {
        let v = Value::parse_text("hello", MobType::Text).unwrap();
        assert_eq!(v.output(15), "\"hello\"");
    }

    #[test]
    fn mixed_type_comparison_errors() {
        let a = Value::Int(1);
        let b = Value::Float(1.0);
        assert!(a.try_cmp(&b).is_err());
    }

    #[test]
    fn word_round_trip() {
        for v in [
            Value::Int(-7),
            Value::BigInt(1 << 40),
            Value::Float(2.5),
            Value::Date(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()),
            Value::Timestamp(datetime::parse_timestamptz("2001-01-01 08:00:00+00").unwrap()),
        ] {
            let word = v.to_word().unwrap();
            assert_eq!(Value::from_word(word, v.mob_type()).unwrap(), v);
        }
    }

    #[test]
    fn payload_round_trip() {
        let text = Value::Text("abc \"def\"".into());
        let geom = Value::parse_text("SRID=4326;POINT(1 1)", MobType::Geometry).unwrap();
        let np = Value::parse_text("NPOINT(8, 0.75)", MobType::NPoint).unwrap();
        for v in [text, geom, np] {
            let payload = v.to_payload().unwrap();
            assert_eq!(Value::from_payload(&payload, v.mob_type()).unwrap(), v);
        }
    }

    #[test]
    fn succ_increments_discrete_domains() {
        assert_eq!(Value::Int(1).succ().unwrap(), Value::Int(2));
        let d = Value::Date(NaiveDate::from_ymd_opt(2001, 1, 31).unwrap());
        assert_eq!(
            d.succ().unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2001, 2, 1).unwrap())
        );
        assert!(Value::Float(1.0).succ().is_err());
    }

    #[test]
    fn hash_agrees_with_equality() {
        let a = Value::Float(0.0);
        let b = Value::Float(-0.0);
        assert_eq!(a.cmp_same(&b), Ordering::Equal);
        assert_eq!(a.hash32(), b.hash32());
        assert_eq!(a.hash64(17), b.hash64(17));
    }
}
