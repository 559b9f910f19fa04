//! Temporal sequences: ordered instants with an interpolation tag.
//!
//! A sequence with `Discrete` interpolation is a bag of samples and always
//! carries inclusive bounds; `Step` and `Linear` sequences interpolate
//! between their instants and carry explicit bound inclusivity.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};

use crate::boxes::{STBox, TBox};
use crate::catalog::MobType;
use crate::collections::span::{shift_scale_time_bounds, Span};
use crate::errors::{Error, Result};
use crate::geo::{GeoValue, SRID_UNKNOWN};
use crate::hash;
use crate::parser::Cursor;
use crate::temporal::{TInstant, TInterpolation, TemporalBox};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct TSequence {
    temp_type: MobType,
    instants: Vec<TInstant>,
    lower_inc: bool,
    upper_inc: bool,
    interp: TInterpolation,
    bbox: TemporalBox,
}

impl TSequence {
    /// Build a sequence from its instants.
    ///
    /// Timestamps must be strictly increasing; linear interpolation is
    /// only admissible over continuous base types. With `normalize`,
    /// redundant interior instants are dropped.
    pub fn new(
        instants: Vec<TInstant>,
        lower_inc: bool,
        upper_inc: bool,
        interp: TInterpolation,
        normalize: bool,
    ) -> Result<TSequence> {
        if instants.is_empty() {
            return Err(Error::arg_value(
                "A temporal sequence must have at least one instant",
            ));
        }
        let temp_type = instants[0].temp_type();
        for inst in &instants {
            if inst.temp_type() != temp_type {
                return Err(Error::arg_type(format!(
                    "Sequence instants of mixed types: {} and {}",
                    temp_type.name(),
                    inst.temp_type().name()
                )));
            }
        }
        for pair in instants.windows(2) {
            if pair[0].timestamp() >= pair[1].timestamp() {
                return Err(Error::arg_value(format!(
                    "Timestamps for temporal value must be increasing: {}, {}",
                    crate::datetime::format_timestamptz(pair[0].timestamp()),
                    crate::datetime::format_timestamptz(pair[1].timestamp()),
                )));
            }
        }
        if interp == TInterpolation::Linear && !temp_type.is_continuous() {
            return Err(Error::arg_value(format!(
                "Linear interpolation is not allowed for type {}",
                temp_type.name()
            )));
        }
        // A discrete sequence is a bag of samples; its bounds are the
        // samples themselves.
        let (lower_inc, upper_inc) = if interp == TInterpolation::Discrete {
            (true, true)
        } else {
            (lower_inc, upper_inc)
        };
        if interp != TInterpolation::Discrete && instants.len() == 1 && !(lower_inc && upper_inc) {
            return Err(Error::arg_value(
                "The lower and upper bounds must be inclusive for an instant temporal sequence",
            ));
        }
        ensure_uniform_geo(&instants)?;

        let mut instants = instants;
        if normalize && interp != TInterpolation::Discrete && instants.len() > 2 {
            instants = normalize_instants(instants, interp);
        }

        let bbox = compute_bbox(temp_type, &instants, lower_inc, upper_inc)?;
        Ok(TSequence {
            temp_type,
            instants,
            lower_inc,
            upper_inc,
            interp,
            bbox,
        })
    }

    /// Parse a discrete sequence `{i1, i2, …}` from the cursor.
    pub(crate) fn parse_discrete_cursor(
        cur: &mut Cursor<'_>,
        temp_type: MobType,
        srid: &mut i32,
    ) -> Result<TSequence> {
        let type_str = temp_type.name();
        cur.expect_obrace(type_str)?;
        let mut instants = vec![TInstant::parse_cursor(cur, temp_type, false, srid)?];
        while cur.try_comma() {
            instants.push(TInstant::parse_cursor(cur, temp_type, false, srid)?);
        }
        cur.expect_cbrace(type_str)?;
        cur.expect_end(type_str)?;
        restamp_srid(&mut instants, *srid)?;
        TSequence::new(instants, true, true, TInterpolation::Discrete, false)
    }

    /// Parse a continuous sequence `[i1, …]` / `(…)` from the cursor.
    pub(crate) fn parse_continuous_cursor(
        cur: &mut Cursor<'_>,
        temp_type: MobType,
        interp: TInterpolation,
        end: bool,
        srid: &mut i32,
    ) -> Result<TSequence> {
        let type_str = temp_type.name();
        let lower_inc = if cur.try_obracket() {
            true
        } else if cur.try_oparen() {
            false
        } else {
            return Err(Error::parse(type_str, "Missing opening bracket/parenthesis"));
        };
        let mut instants = vec![TInstant::parse_cursor(cur, temp_type, false, srid)?];
        while cur.try_comma() {
            instants.push(TInstant::parse_cursor(cur, temp_type, false, srid)?);
        }
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
        restamp_srid(&mut instants, *srid)?;
        TSequence::new(instants, lower_inc, upper_inc, interp, true)
    }

    pub fn temp_type(&self) -> MobType {
        self.temp_type
    }

    pub fn interpolation(&self) -> TInterpolation {
        self.interp
    }

    pub fn is_lower_inclusive(&self) -> bool {
        self.lower_inc
    }

    pub fn is_upper_inclusive(&self) -> bool {
        self.upper_inc
    }

    pub fn bbox(&self) -> &TemporalBox {
        &self.bbox
    }

    pub fn num_instants(&self) -> usize {
        self.instants.len()
    }

    /// The n-th instant, 1-based.
    pub fn instant_n(&self, n: usize) -> Result<&TInstant> {
        if n < 1 || n > self.instants.len() {
            return Err(Error::arg_value(format!("Invalid instant number: {n}")));
        }
        Ok(&self.instants[n - 1])
    }

    pub fn start_instant(&self) -> &TInstant {
        &self.instants[0]
    }

    pub fn end_instant(&self) -> &TInstant {
        &self.instants[self.instants.len() - 1]
    }

    pub fn instants(&self) -> &[TInstant] {
        &self.instants
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.instants.iter().map(TInstant::timestamp).collect()
    }

    pub fn num_timestamps(&self) -> usize {
        self.instants.len()
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.instants[0].timestamp()
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.instants[self.instants.len() - 1].timestamp()
    }

    pub fn values(&self) -> Vec<Value> {
        self.instants.iter().map(|i| i.value().clone()).collect()
    }

    pub fn start_value(&self) -> &Value {
        self.instants[0].value()
    }

    pub fn end_value(&self) -> &Value {
        self.instants[self.instants.len() - 1].value()
    }

    pub fn min_value(&self) -> Value {
        self.instants
            .iter()
            .map(|i| i.value())
            .min_by(|a, b| a.cmp_same(b))
            .expect("a sequence has at least one instant")
            .clone()
    }

    pub fn max_value(&self) -> Value {
        self.instants
            .iter()
            .map(|i| i.value())
            .max_by(|a, b| a.cmp_same(b))
            .expect("a sequence has at least one instant")
            .clone()
    }

    pub fn min_instant(&self) -> &TInstant {
        self.instants
            .iter()
            .min_by(|a, b| a.value().cmp_same(b.value()))
            .expect("a sequence has at least one instant")
    }

    pub fn max_instant(&self) -> &TInstant {
        self.instants
            .iter()
            .max_by(|a, b| a.value().cmp_same(b.value()))
            .expect("a sequence has at least one instant")
    }

    /// Elapsed time covered by the sequence; zero for discrete sequences.
    pub fn duration(&self) -> TimeDelta {
        if self.interp == TInterpolation::Discrete {
            TimeDelta::zero()
        } else {
            self.end_timestamp() - self.start_timestamp()
        }
    }

    /// The time span covered by the sequence.
    pub fn timespan(&self) -> Result<Span> {
        Span::new(
            Value::Timestamp(self.start_timestamp()),
            Value::Timestamp(self.end_timestamp()),
            self.lower_inc,
            self.upper_inc,
        )
    }

    /// SRID of a spatial sequence, taken from its first instant.
    pub fn srid(&self) -> i32 {
        self.instants[0]
            .value()
            .as_geo()
            .map(GeoValue::srid)
            .unwrap_or(SRID_UNKNOWN)
    }

    /// Value taken at `t`, honoring interpolation and bound inclusivity.
    pub fn value_at_timestamp(&self, t: DateTime<Utc>) -> Option<Value> {
        let first = self.start_timestamp();
        let last = self.end_timestamp();
        if self.interp == TInterpolation::Discrete {
            return self
                .instants
                .binary_search_by(|i| i.timestamp().cmp(&t))
                .ok()
                .map(|idx| self.instants[idx].value().clone());
        }
        if t < first || t > last {
            return None;
        }
        if t == first && !self.lower_inc {
            return None;
        }
        if t == last && !self.upper_inc {
            return None;
        }
        let idx = self.instants.partition_point(|i| i.timestamp() <= t) - 1;
        let before = &self.instants[idx];
        if before.timestamp() == t || self.interp == TInterpolation::Step {
            return Some(before.value().clone());
        }
        let after = &self.instants[idx + 1];
        let span = (after.timestamp() - before.timestamp())
            .num_microseconds()
            .unwrap_or(i64::MAX) as f64;
        let frac = (t - before.timestamp()).num_microseconds().unwrap_or(0) as f64 / span;
        lerp(before.value(), after.value(), frac)
    }

    /// Shift and/or scale the sequence in time.
    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<TSequence> {
        let lower = self.start_timestamp();
        let upper = self.end_timestamp();
        let (lower1, upper1) = shift_scale_time_bounds(lower, upper, shift, duration)?;
        let scale = if upper > lower {
            (upper1 - lower1).num_microseconds().unwrap_or(0) as f64
                / (upper - lower).num_microseconds().unwrap_or(1) as f64
        } else {
            1.0
        };
        let instants = self
            .instants
            .iter()
            .map(|inst| {
                let offset = (inst.timestamp() - lower).num_microseconds().unwrap_or(0) as f64;
                let t = lower1 + TimeDelta::microseconds((offset * scale).round() as i64);
                TInstant::new(inst.value().clone(), self.temp_type, t)
            })
            .collect::<Result<Vec<_>>>()?;
        TSequence::new(instants, self.lower_inc, self.upper_inc, self.interp, false)
    }

    /// Rebuild with another interpolation; the instants are retained.
    pub fn set_interpolation(&self, interp: TInterpolation) -> Result<TSequence> {
        TSequence::new(
            self.instants.clone(),
            self.lower_inc,
            self.upper_inc,
            interp,
            false,
        )
    }

    /// Body of the text form, without the SRID/interpolation prefixes.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        let (open, close) = if self.interp == TInterpolation::Discrete {
            ('{', '}')
        } else {
            (
                if self.lower_inc { '[' } else { '(' },
                if self.upper_inc { ']' } else { ')' },
            )
        };
        let mut out = String::new();
        out.push(open);
        for (i, inst) in self.instants.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&inst.to_wkt(maxdd));
        }
        out.push(close);
        out
    }

    /// Lexicographic order on instants, then on count, bounds, and
    /// interpolation.
    pub(crate) fn cmp_sequences(&self, other: &TSequence) -> Ordering {
        for (a, b) in self.instants.iter().zip(other.instants.iter()) {
            let ord = a.cmp_instants(b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.instants
            .len()
            .cmp(&other.instants.len())
            .then_with(|| match (self.lower_inc, other.lower_inc) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            })
            .then_with(|| match (self.upper_inc, other.upper_inc) {
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                _ => Ordering::Equal,
            })
            .then_with(|| interp_rank(self.interp).cmp(&interp_rank(other.interp)))
    }

    pub fn hash32(&self) -> u32 {
        let flags = self.lower_inc as u32 | ((self.upper_inc as u32) << 1);
        let mut h = hash::hash_u32(flags);
        for inst in &self.instants {
            h = hash::combine(h, inst.hash32());
        }
        h
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        let flags = self.lower_inc as u64 | ((self.upper_inc as u64) << 1);
        let mut h = hash::hash_u64_extended(flags, seed);
        for inst in &self.instants {
            h = hash::combine_extended(h, inst.hash64(seed));
        }
        h
    }
}

fn interp_rank(interp: TInterpolation) -> u8 {
    match interp {
        TInterpolation::Discrete => 0,
        TInterpolation::Step => 1,
        TInterpolation::Linear => 2,
    }
}

fn ensure_uniform_geo(instants: &[TInstant]) -> Result<()> {
    let Some(first) = instants[0].value().as_geo() else {
        return Ok(());
    };
    let srid = first.srid();
    let has_z = first.has_z();
    for inst in instants {
        let g = inst.value().as_geo().expect("uniform base types");
        if g.srid() != srid {
            return Err(Error::arg_value(format!(
                "Operation on mixed SRID: {} and {}",
                srid,
                g.srid()
            )));
        }
        if g.has_z() != has_z {
            return Err(Error::arg_value(
                "Operation on geometries of mixed dimensionality",
            ));
        }
    }
    Ok(())
}

/// Stamp a late-discovered SRID onto instants parsed before it was known.
fn restamp_srid(instants: &mut [TInstant], srid: i32) -> Result<()> {
    if srid == SRID_UNKNOWN {
        return Ok(());
    }
    for inst in instants {
        if let Some(g) = inst.value().as_geo() {
            if g.srid() == SRID_UNKNOWN {
                let mut value = inst.value().clone();
                if let Value::Geom(g) | Value::Geog(g) = &mut value {
                    g.set_srid(srid);
                }
                *inst = TInstant::new(value, inst.temp_type(), inst.timestamp())?;
            }
        }
    }
    Ok(())
}

/// Drop interior instants that the interpolation makes redundant.
fn normalize_instants(instants: Vec<TInstant>, interp: TInterpolation) -> Vec<TInstant> {
    let mut out: Vec<TInstant> = Vec::with_capacity(instants.len());
    for inst in instants {
        loop {
            if out.len() < 2 {
                break;
            }
            let prev = &out[out.len() - 2];
            let mid = &out[out.len() - 1];
            if redundant(prev, mid, &inst, interp) {
                out.pop();
            } else {
                break;
            }
        }
        out.push(inst);
    }
    out
}

fn redundant(prev: &TInstant, mid: &TInstant, next: &TInstant, interp: TInterpolation) -> bool {
    match interp {
        TInterpolation::Step => prev.value().cmp_same(mid.value()) == Ordering::Equal,
        TInterpolation::Linear => {
            let span = (next.timestamp() - prev.timestamp())
                .num_microseconds()
                .unwrap_or(i64::MAX) as f64;
            let frac =
                (mid.timestamp() - prev.timestamp()).num_microseconds().unwrap_or(0) as f64 / span;
            match lerp(prev.value(), next.value(), frac) {
                Some(v) => v.cmp_same(mid.value()) == Ordering::Equal,
                None => false,
            }
        }
        TInterpolation::Discrete => false,
    }
}

/// Linear interpolation between two values of the same continuous base.
fn lerp(a: &Value, b: &Value, frac: f64) -> Option<Value> {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Some(Value::Float(x + (y - x) * frac)),
        (Value::Geom(g1), Value::Geom(g2)) | (Value::Geog(g1), Value::Geog(g2)) => {
            let (x1, y1, z1) = g1.point_coords()?;
            let (x2, y2, z2) = g2.point_coords()?;
            let z = match (z1, z2) {
                (Some(z1), Some(z2)) => Some(z1 + (z2 - z1) * frac),
                _ => None,
            };
            let point = GeoValue::point(
                x1 + (x2 - x1) * frac,
                y1 + (y2 - y1) * frac,
                z,
                g1.srid(),
                g1.is_geodetic(),
            );
            Some(if matches!(a, Value::Geog(_)) {
                Value::Geog(point)
            } else {
                Value::Geom(point)
            })
        }
        (Value::NPoint(p1), Value::NPoint(p2)) if p1.route() == p2.route() => {
            let pos = p1.position() + (p2.position() - p1.position()) * frac;
            crate::geo::NPoint::new(p1.route(), pos).ok().map(Value::NPoint)
        }
        _ => None,
    }
}

fn compute_bbox(
    temp_type: MobType,
    instants: &[TInstant],
    lower_inc: bool,
    upper_inc: bool,
) -> Result<TemporalBox> {
    let period = Span::new(
        Value::Timestamp(instants[0].timestamp()),
        Value::Timestamp(instants[instants.len() - 1].timestamp()),
        lower_inc,
        upper_inc,
    )?;
    if temp_type.is_numeric() {
        let min = instants
            .iter()
            .map(|i| i.value())
            .min_by(|a, b| a.cmp_same(b))
            .expect("at least one instant")
            .clone();
        let max = instants
            .iter()
            .map(|i| i.value())
            .max_by(|a, b| a.cmp_same(b))
            .expect("at least one instant")
            .clone();
        let span = Span::new(min, max, true, true)?;
        Ok(TemporalBox::Number(TBox::new(Some(span), Some(period))?))
    } else if temp_type == MobType::TNPoint {
        Ok(TemporalBox::Spatial(STBox::from_tstzspan(period)?))
    } else if instants[0].value().as_geo().is_some() {
        let mut extent: Option<STBox> = None;
        for inst in instants {
            let b = STBox::from_geo(inst.value().as_geo().expect("spatial base"))?;
            match &mut extent {
                Some(acc) => acc.expand(&b)?,
                None => extent = Some(b),
            }
        }
        let b = extent.expect("at least one instant");
        Ok(TemporalBox::Spatial(STBox::new(
            true,
            b.has_z(),
            b.is_geodetic(),
            b.srid(),
            b.xmin().unwrap_or(0.0),
            b.xmax().unwrap_or(0.0),
            b.ymin().unwrap_or(0.0),
            b.ymax().unwrap_or(0.0),
            b.zmin().unwrap_or(0.0),
            b.zmax().unwrap_or(0.0),
            Some(period),
        )?))
    } else {
        Ok(TemporalBox::Time(period))
    }
}

impl PartialEq for TSequence {
    fn eq(&self, other: &Self) -> bool {
        self.temp_type == other.temp_type
            && self.interp == other.interp
            && self.cmp_sequences(other) == Ordering::Equal
    }
}

impl Eq for TSequence {}

impl Hash for TSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl fmt::Display for TSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str, temp_type: MobType, interp: TInterpolation) -> TSequence {
        let mut cur = Cursor::new(s);
        let mut srid = SRID_UNKNOWN;
        TSequence::parse_continuous_cursor(&mut cur, temp_type, interp, true, &mut srid).unwrap()
    }

    #[test]
    fn continuous_sequence_round_trip() {
        let s = seq(
            "[1@2001-01-01, 2@2001-01-02)",
            MobType::TFloat,
            TInterpolation::Linear,
        );
        assert!(s.is_lower_inclusive());
        assert!(!s.is_upper_inclusive());
        assert_eq!(
            s.to_wkt(15),
            "[1@2001-01-01 00:00:00+00, 2@2001-01-02 00:00:00+00)"
        );
    }

    #[test]
    fn non_increasing_timestamps_fail() {
        let mut cur = Cursor::new("[2@2001-01-02, 1@2001-01-01]");
        let mut srid = SRID_UNKNOWN;
        let err = TSequence::parse_continuous_cursor(
            &mut cur,
            MobType::TFloat,
            TInterpolation::Linear,
            true,
            &mut srid,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be increasing"));
    }

    #[test]
    fn linear_interpolation_needs_a_continuous_base() {
        let inst = TInstant::parse("1@2001-01-01", MobType::TInt).unwrap();
        let err =
            TSequence::new(vec![inst], true, true, TInterpolation::Linear, false).unwrap_err();
        assert!(err.to_string().contains("Linear interpolation"));
    }

    #[test]
    fn singleton_continuous_sequence_needs_inclusive_bounds() {
        let inst = TInstant::parse("1.5@2001-01-01", MobType::TFloat).unwrap();
        assert!(TSequence::new(
            vec![inst.clone()],
            true,
            false,
            TInterpolation::Linear,
            false
        )
        .is_err());
        assert!(TSequence::new(vec![inst], true, true, TInterpolation::Linear, false).is_ok());
    }

    #[test]
    fn discrete_bounds_are_forced_inclusive() {
        let a = TInstant::parse("1@2001-01-01", MobType::TInt).unwrap();
        let b = TInstant::parse("2@2001-01-02", MobType::TInt).unwrap();
        let s = TSequence::new(vec![a, b], false, false, TInterpolation::Discrete, false).unwrap();
        assert!(s.is_lower_inclusive() && s.is_upper_inclusive());
        assert_eq!(s.duration(), TimeDelta::zero());
        assert_eq!(
            s.to_wkt(15),
            "{1@2001-01-01 00:00:00+00, 2@2001-01-02 00:00:00+00}"
        );
    }

    #[test]
    fn step_normalization_drops_repeated_values() {
        let instants = ["1@2001-01-01", "1@2001-01-02", "1@2001-01-03", "2@2001-01-04"]
            .iter()
            .map(|s| TInstant::parse(s, MobType::TInt).unwrap())
            .collect::<Vec<_>>();
        let s = TSequence::new(instants, true, true, TInterpolation::Step, true).unwrap();
        assert_eq!(s.num_instants(), 2);
        assert_eq!(s.instant_n(1).unwrap().value(), &Value::Int(1));
        assert_eq!(s.instant_n(2).unwrap().value(), &Value::Int(2));
    }

    #[test]
    fn linear_normalization_drops_collinear_middles() {
        let instants = ["1@2001-01-01", "2@2001-01-02", "3@2001-01-03"]
            .iter()
            .map(|s| TInstant::parse(s, MobType::TFloat).unwrap())
            .collect::<Vec<_>>();
        let s = TSequence::new(instants, true, true, TInterpolation::Linear, true).unwrap();
        assert_eq!(s.num_instants(), 2);
    }

    #[test]
    fn value_at_timestamp_honors_interpolation() {
        let t = |s: &str| crate::datetime::parse_timestamptz(s).unwrap();
        let lin = seq(
            "[1@2001-01-01, 3@2001-01-03]",
            MobType::TFloat,
            TInterpolation::Linear,
        );
        assert_eq!(lin.value_at_timestamp(t("2001-01-02")), Some(Value::Float(2.0)));
        let step = seq(
            "[1@2001-01-01, 3@2001-01-03]",
            MobType::TFloat,
            TInterpolation::Step,
        );
        assert_eq!(step.value_at_timestamp(t("2001-01-02")), Some(Value::Float(1.0)));
        let open = seq(
            "(1@2001-01-01, 3@2001-01-03]",
            MobType::TFloat,
            TInterpolation::Linear,
        );
        assert_eq!(open.value_at_timestamp(t("2001-01-01")), None);
        assert_eq!(open.value_at_timestamp(t("2001-01-04")), None);
    }

    #[test]
    fn numeric_bbox_covers_values_and_time() {
        let s = seq(
            "[3@2001-01-01, 1@2001-01-02, 2@2001-01-03)",
            MobType::TFloat,
            TInterpolation::Linear,
        );
        let TemporalBox::Number(tbox) = s.bbox() else {
            panic!("numeric sequence carries a TBox");
        };
        assert_eq!(tbox.xmin(), Some(Value::Float(1.0)));
        assert_eq!(tbox.xmax(), Some(Value::Float(3.0)));
        assert_eq!(tbox.is_tmax_inclusive(), Some(false));
    }

    #[test]
    fn shift_scale_time_rescales_interior_instants() {
        let s = seq(
            "[1@2001-01-01 00:00:00+00, 2@2001-01-02 00:00:00+00, 3@2001-01-05 00:00:00+00]",
            MobType::TFloat,
            TInterpolation::Linear,
        );
        let scaled = s.shift_scale_time(None, Some(TimeDelta::days(2))).unwrap();
        assert_eq!(scaled.start_timestamp(), s.start_timestamp());
        assert_eq!(
            scaled.end_timestamp() - scaled.start_timestamp(),
            TimeDelta::days(2)
        );
        assert_eq!(
            scaled.instant_n(2).unwrap().timestamp() - scaled.start_timestamp(),
            TimeDelta::hours(12)
        );
    }

    #[test]
    fn geo_sequence_keeps_uniform_srid() {
        let a = TInstant::parse("SRID=4326;POINT(0 0)@2001-01-01", MobType::TGeomPoint).unwrap();
        let b = TInstant::parse("SRID=3857;POINT(1 1)@2001-01-02", MobType::TGeomPoint).unwrap();
        let err = TSequence::new(vec![a, b], true, true, TInterpolation::Linear, false).unwrap_err();
        assert!(err.to_string().contains("mixed SRID"));
    }
}
