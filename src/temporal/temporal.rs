//! The temporal value union and its top-level text parser.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};

use crate::catalog::MobType;
use crate::collections::span::Span;
use crate::collections::SpanSet;
use crate::errors::{Error, Result};
use crate::geo::SRID_UNKNOWN;
use crate::parser::Cursor;
use crate::temporal::{TInstant, TInterpolation, TSequence, TSequenceSet, TemporalBox};
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Temporal {
    Instant(TInstant),
    Sequence(TSequence),
    SequenceSet(TSequenceSet),
}

impl Temporal {
    /// Parse a temporal value of the given type.
    ///
    /// The first structural character selects the subtype: a bare value is
    /// an instant, `[`/`(` opens a continuous sequence, `{` opens either a
    /// discrete sequence or a sequence set depending on the next byte. An
    /// optional `Interp=Step;` prefix (after an optional `SRID=<n>;` for
    /// spatial types) selects step interpolation.
    ///
    /// # Example
    /// ```
    /// # use mobilis::catalog::MobType;
    /// # use mobilis::temporal::{Temporal, TInterpolation};
    /// let seq = Temporal::parse(
    ///     "Interp=Step;[1@2001-01-01, 2@2001-01-02)",
    ///     MobType::TFloat,
    /// ).unwrap();
    /// assert_eq!(seq.interpolation(), TInterpolation::Step);
    /// ```
    pub fn parse(s: &str, temp_type: MobType) -> Result<Temporal> {
        if !temp_type.is_temporal() {
            return Err(Error::internal(format!(
                "Type {} is not a temporal type",
                temp_type.name()
            )));
        }
        let type_str = temp_type.name();
        let mut cur = Cursor::new(s);
        let mut srid = SRID_UNKNOWN;
        if is_geo(temp_type) {
            if let Some(found) = cur.parse_srid()? {
                srid = found;
            }
        }
        let mut interp = default_interp(temp_type);
        if cur.try_keyword("Interp=Step;") {
            interp = TInterpolation::Step;
        }
        match cur.peek() {
            None => Err(Error::parse(type_str, "Missing value")),
            Some(b'[') | Some(b'(') => Ok(Temporal::Sequence(
                TSequence::parse_continuous_cursor(&mut cur, temp_type, interp, true, &mut srid)?,
            )),
            Some(b'{') => {
                let mut look = cur.clone();
                look.try_obrace();
                match look.peek() {
                    Some(b'[') | Some(b'(') => Ok(Temporal::SequenceSet(
                        TSequenceSet::parse_cursor(&mut cur, temp_type, interp, &mut srid)?,
                    )),
                    _ => Ok(Temporal::Sequence(TSequence::parse_discrete_cursor(
                        &mut cur, temp_type, &mut srid,
                    )?)),
                }
            }
            Some(_) => Ok(Temporal::Instant(TInstant::parse_cursor(
                &mut cur, temp_type, true, &mut srid,
            )?)),
        }
    }

    pub fn temp_type(&self) -> MobType {
        match self {
            Temporal::Instant(i) => i.temp_type(),
            Temporal::Sequence(s) => s.temp_type(),
            Temporal::SequenceSet(ss) => ss.temp_type(),
        }
    }

    /// Interpolation of the value; instants report their type's default.
    pub fn interpolation(&self) -> TInterpolation {
        match self {
            Temporal::Instant(i) => default_interp(i.temp_type()),
            Temporal::Sequence(s) => s.interpolation(),
            Temporal::SequenceSet(ss) => ss.interpolation(),
        }
    }

    /// The precomputed (or, for instants, directly derived) bounding box.
    pub fn bbox(&self) -> Result<TemporalBox> {
        match self {
            Temporal::Instant(i) => i.bbox(),
            Temporal::Sequence(s) => Ok(s.bbox().clone()),
            Temporal::SequenceSet(ss) => Ok(ss.bbox().clone()),
        }
    }

    /// SRID of a spatial temporal value.
    pub fn srid(&self) -> i32 {
        match self {
            Temporal::Instant(i) => i
                .value()
                .as_geo()
                .map(|g| g.srid())
                .unwrap_or(SRID_UNKNOWN),
            Temporal::Sequence(s) => s.srid(),
            Temporal::SequenceSet(ss) => ss.start_sequence().srid(),
        }
    }

    pub fn num_instants(&self) -> usize {
        match self {
            Temporal::Instant(_) => 1,
            Temporal::Sequence(s) => s.num_instants(),
            Temporal::SequenceSet(ss) => ss.num_instants(),
        }
    }

    /// Owned copies of all instants, in order.
    pub fn instants(&self) -> Vec<TInstant> {
        match self {
            Temporal::Instant(i) => vec![i.clone()],
            Temporal::Sequence(s) => s.instants().to_vec(),
            Temporal::SequenceSet(ss) => ss.instants().into_iter().cloned().collect(),
        }
    }

    /// The n-th instant, 1-based.
    pub fn instant_n(&self, n: usize) -> Result<TInstant> {
        let instants = self.instants();
        if n < 1 || n > instants.len() {
            return Err(Error::arg_value(format!("Invalid instant number: {n}")));
        }
        Ok(instants[n - 1].clone())
    }

    pub fn start_instant(&self) -> TInstant {
        self.instants().swap_remove(0)
    }

    pub fn end_instant(&self) -> TInstant {
        let mut instants = self.instants();
        instants.pop().expect("a temporal value has instants")
    }

    pub fn values(&self) -> Vec<Value> {
        match self {
            Temporal::Instant(i) => vec![i.value().clone()],
            Temporal::Sequence(s) => s.values(),
            Temporal::SequenceSet(ss) => ss.values(),
        }
    }

    pub fn start_value(&self) -> Value {
        match self {
            Temporal::Instant(i) => i.value().clone(),
            Temporal::Sequence(s) => s.start_value().clone(),
            Temporal::SequenceSet(ss) => ss.start_value().clone(),
        }
    }

    pub fn end_value(&self) -> Value {
        match self {
            Temporal::Instant(i) => i.value().clone(),
            Temporal::Sequence(s) => s.end_value().clone(),
            Temporal::SequenceSet(ss) => ss.end_value().clone(),
        }
    }

    pub fn min_value(&self) -> Value {
        match self {
            Temporal::Instant(i) => i.value().clone(),
            Temporal::Sequence(s) => s.min_value(),
            Temporal::SequenceSet(ss) => ss.min_value(),
        }
    }

    pub fn max_value(&self) -> Value {
        match self {
            Temporal::Instant(i) => i.value().clone(),
            Temporal::Sequence(s) => s.max_value(),
            Temporal::SequenceSet(ss) => ss.max_value(),
        }
    }

    pub fn num_timestamps(&self) -> usize {
        match self {
            Temporal::Instant(_) => 1,
            Temporal::Sequence(s) => s.num_timestamps(),
            Temporal::SequenceSet(ss) => ss.num_timestamps(),
        }
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        match self {
            Temporal::Instant(i) => vec![i.timestamp()],
            Temporal::Sequence(s) => s.timestamps(),
            Temporal::SequenceSet(ss) => ss.timestamps(),
        }
    }

    /// The n-th timestamp, 1-based.
    pub fn timestamp_n(&self, n: usize) -> Result<DateTime<Utc>> {
        let ts = self.timestamps();
        if n < 1 || n > ts.len() {
            return Err(Error::arg_value(format!("Invalid timestamp number: {n}")));
        }
        Ok(ts[n - 1])
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        match self {
            Temporal::Instant(i) => i.timestamp(),
            Temporal::Sequence(s) => s.start_timestamp(),
            Temporal::SequenceSet(ss) => ss.start_timestamp(),
        }
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        match self {
            Temporal::Instant(i) => i.timestamp(),
            Temporal::Sequence(s) => s.end_timestamp(),
            Temporal::SequenceSet(ss) => ss.end_timestamp(),
        }
    }

    /// Elapsed time on which the value is defined.
    pub fn duration(&self, ignore_gaps: bool) -> TimeDelta {
        match self {
            Temporal::Instant(_) => TimeDelta::zero(),
            Temporal::Sequence(s) => s.duration(),
            Temporal::SequenceSet(ss) => ss.duration(ignore_gaps),
        }
    }

    /// The bounding time span.
    pub fn timespan(&self) -> Result<Span> {
        match self {
            Temporal::Instant(i) => Span::from_value(Value::Timestamp(i.timestamp())),
            Temporal::Sequence(s) => s.timespan(),
            Temporal::SequenceSet(ss) => ss.timespan(),
        }
    }

    /// The set of time spans on which the value is defined.
    pub fn time(&self) -> Result<SpanSet> {
        match self {
            Temporal::SequenceSet(ss) => ss.time(),
            other => Ok(SpanSet::from(other.timespan()?)),
        }
    }

    pub fn value_at_timestamp(&self, t: DateTime<Utc>) -> Option<Value> {
        match self {
            Temporal::Instant(i) => (i.timestamp() == t).then(|| i.value().clone()),
            Temporal::Sequence(s) => s.value_at_timestamp(t),
            Temporal::SequenceSet(ss) => ss.value_at_timestamp(t),
        }
    }

    /// Shift and/or scale the value in time.
    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<Temporal> {
        match self {
            Temporal::Instant(i) => {
                if shift.is_none() && duration.is_none() {
                    return Err(Error::arg_value(
                        "At least one of the shift and duration arguments must be given",
                    ));
                }
                if let Some(d) = duration {
                    crate::datetime::ensure_positive_duration(d)?;
                }
                Ok(Temporal::Instant(match shift {
                    Some(delta) => i.shift_time(delta),
                    None => i.clone(),
                }))
            }
            Temporal::Sequence(s) => Ok(Temporal::Sequence(s.shift_scale_time(shift, duration)?)),
            Temporal::SequenceSet(ss) => {
                Ok(Temporal::SequenceSet(ss.shift_scale_time(shift, duration)?))
            }
        }
    }

    /// Rebuild the value with another interpolation.
    pub fn set_interpolation(&self, interp: TInterpolation) -> Result<Temporal> {
        match self {
            Temporal::Instant(i) => Ok(Temporal::Instant(i.clone())),
            Temporal::Sequence(s) => Ok(Temporal::Sequence(s.set_interpolation(interp)?)),
            Temporal::SequenceSet(ss) => {
                let seqs = ss
                    .sequences()
                    .iter()
                    .map(|s| s.set_interpolation(interp))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Temporal::SequenceSet(TSequenceSet::new(seqs, true)?))
            }
        }
    }

    /// Narrow to a single instant, when the value holds exactly one.
    pub fn to_instant(&self) -> Result<TInstant> {
        let instants = self.instants();
        if instants.len() != 1 {
            return Err(Error::arg_value(
                "Cannot transform the temporal value to an instant",
            ));
        }
        Ok(instants.into_iter().next().expect("one instant"))
    }

    /// Widen (or restate) the value as one sequence with `interp`.
    pub fn to_sequence(&self, interp: TInterpolation) -> Result<TSequence> {
        match self {
            Temporal::Instant(i) => {
                TSequence::new(vec![i.clone()], true, true, interp, false)
            }
            Temporal::Sequence(s) => s.set_interpolation(interp),
            Temporal::SequenceSet(ss) if ss.num_sequences() == 1 => {
                ss.start_sequence().set_interpolation(interp)
            }
            Temporal::SequenceSet(_) => Err(Error::arg_value(
                "Cannot transform the temporal value to a sequence",
            )),
        }
    }

    /// Widen the value to a sequence set with `interp`.
    pub fn to_sequence_set(&self, interp: TInterpolation) -> Result<TSequenceSet> {
        match self {
            Temporal::Instant(i) => TSequenceSet::new(
                vec![TSequence::new(vec![i.clone()], true, true, interp, false)?],
                false,
            ),
            Temporal::Sequence(s) if s.interpolation() == TInterpolation::Discrete => {
                let seqs = s
                    .instants()
                    .iter()
                    .map(|i| TSequence::new(vec![i.clone()], true, true, interp, false))
                    .collect::<Result<Vec<_>>>()?;
                TSequenceSet::new(seqs, false)
            }
            Temporal::Sequence(s) => {
                TSequenceSet::new(vec![s.set_interpolation(interp)?], false)
            }
            Temporal::SequenceSet(ss) => Ok(ss.clone()),
        }
    }

    /// Merge two temporal values of the same type.
    ///
    /// Both sides are widened to the narrower common subtype; instants may
    /// coincide in time only when they carry the same value.
    pub fn merge(&self, other: &Temporal) -> Result<Temporal> {
        Temporal::merge_array(std::slice::from_ref(self).iter().chain([other]))
    }

    /// Merge an array of temporal values of the same type.
    pub fn merge_array<'a, I>(values: I) -> Result<Temporal>
    where
        I: IntoIterator<Item = &'a Temporal>,
    {
        let values: Vec<&Temporal> = values.into_iter().collect();
        let Some(first) = values.first() else {
            return Err(Error::arg_value("Cannot merge an empty array"));
        };
        let temp_type = first.temp_type();
        for v in &values {
            if v.temp_type() != temp_type {
                return Err(Error::arg_type(format!(
                    "Cannot merge mixed temporal types: {} and {}",
                    temp_type.name(),
                    v.temp_type().name()
                )));
            }
        }
        // Interpolations of the sides that actually carry one must agree.
        let mut interp: Option<TInterpolation> = None;
        for v in &values {
            if matches!(v, Temporal::Instant(_)) {
                continue;
            }
            let vi = v.interpolation();
            match interp {
                None => interp = Some(vi),
                Some(prev) if prev != vi => {
                    return Err(Error::arg_value(
                        "The temporal values must have the same interpolation",
                    ));
                }
                Some(_) => {}
            }
        }

        let rank = values.iter().map(|v| subtype_rank(v)).max().expect("non-empty");
        // A discrete sequence merged with a continuous one widens all the
        // way to a sequence set.
        let has_discrete_seq = values
            .iter()
            .any(|v| matches!(v, Temporal::Sequence(s) if s.interpolation() == TInterpolation::Discrete));
        let rank = if rank >= 2 && has_discrete_seq { 3 } else { rank };

        match rank {
            0 | 1 => {
                let mut instants: Vec<TInstant> =
                    values.iter().flat_map(|v| v.instants()).collect();
                let merged = merge_instant_array(&mut instants)?;
                if merged.len() == 1 && rank == 0 {
                    Ok(Temporal::Instant(merged.into_iter().next().expect("one")))
                } else {
                    Ok(Temporal::Sequence(TSequence::new(
                        merged,
                        true,
                        true,
                        TInterpolation::Discrete,
                        false,
                    )?))
                }
            }
            _ => {
                let interp = interp.unwrap_or_else(|| default_interp(temp_type));
                let mut seqs: Vec<TSequence> = Vec::new();
                for v in &values {
                    seqs.extend(v.to_sequence_set(interp)?.sequences().to_vec());
                }
                seqs.sort_by(|a, b| a.cmp_sequences(b));
                seqs.dedup_by(|a, b| a == b);
                let merged = TSequenceSet::new(seqs, true)?;
                if rank == 2 && merged.num_sequences() == 1 {
                    Ok(Temporal::Sequence(merged.start_sequence().clone()))
                } else {
                    Ok(Temporal::SequenceSet(merged))
                }
            }
        }
    }

    /// Comparison for B-tree support: the bounding time span first, then
    /// the bounding box, then element-wise.
    pub fn cmp_temporals(&self, other: &Temporal) -> Result<Ordering> {
        if self.temp_type() != other.temp_type() {
            return Err(Error::arg_type(format!(
                "Operation on mixed temporal types: {} and {}",
                self.temp_type().name(),
                other.temp_type().name()
            )));
        }
        let ord = self.timespan()?.cmp_spans(&other.timespan()?);
        if ord != Ordering::Equal {
            return Ok(ord);
        }
        let ord = self.bbox()?.cmp_boxes(&other.bbox()?);
        if ord != Ordering::Equal {
            return Ok(ord);
        }
        let a = self.instants();
        let b = other.instants();
        for (x, y) in a.iter().zip(b.iter()) {
            let ord = x.cmp_instants(y);
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(a.len()
            .cmp(&b.len())
            .then_with(|| subtype_rank(self).cmp(&subtype_rank(other)))
            .then_with(|| {
                interp_rank(self.interpolation()).cmp(&interp_rank(other.interpolation()))
            }))
    }

    pub fn hash32(&self) -> u32 {
        match self {
            Temporal::Instant(i) => i.hash32(),
            Temporal::Sequence(s) => s.hash32(),
            Temporal::SequenceSet(ss) => ss.hash32(),
        }
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        match self {
            Temporal::Instant(i) => i.hash64(seed),
            Temporal::Sequence(s) => s.hash64(seed),
            Temporal::SequenceSet(ss) => ss.hash64(seed),
        }
    }

    /// Text output: `SRID=<n>;` for spatial values with a known SRID, then
    /// `Interp=Step;` when step interpolation is not the type's default.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        let mut out = String::new();
        if is_geo(self.temp_type()) && self.srid() > 0 {
            out.push_str(&format!("SRID={};", self.srid()));
        }
        if self.interpolation() == TInterpolation::Step
            && default_interp(self.temp_type()) == TInterpolation::Linear
        {
            out.push_str("Interp=Step;");
        }
        match self {
            Temporal::Instant(i) => out.push_str(&i.to_wkt(maxdd)),
            Temporal::Sequence(s) => out.push_str(&s.to_wkt(maxdd)),
            Temporal::SequenceSet(ss) => out.push_str(&ss.to_wkt(maxdd)),
        }
        out
    }
}

fn is_geo(temp_type: MobType) -> bool {
    matches!(
        temp_type.base_type(),
        Some(MobType::Geometry) | Some(MobType::Geography)
    )
}

fn default_interp(temp_type: MobType) -> TInterpolation {
    if temp_type.is_continuous() {
        TInterpolation::Linear
    } else {
        TInterpolation::Step
    }
}

fn subtype_rank(v: &Temporal) -> u8 {
    match v {
        Temporal::Instant(_) => 0,
        Temporal::Sequence(s) if s.interpolation() == TInterpolation::Discrete => 1,
        Temporal::Sequence(_) => 2,
        Temporal::SequenceSet(_) => 3,
    }
}

fn interp_rank(interp: TInterpolation) -> u8 {
    match interp {
        TInterpolation::Discrete => 0,
        TInterpolation::Step => 1,
        TInterpolation::Linear => 2,
    }
}

/// Sort, deduplicate, and validate an instant array: two instants may
/// share a timestamp only when they carry the same value.
fn merge_instant_array(instants: &mut Vec<TInstant>) -> Result<Vec<TInstant>> {
    instants.sort_by(|a, b| a.cmp_instants(b));
    let mut out: Vec<TInstant> = Vec::with_capacity(instants.len());
    for inst in instants.drain(..) {
        if let Some(prev) = out.last() {
            if prev.timestamp() == inst.timestamp() {
                if prev.value().cmp_same(inst.value()) == Ordering::Equal {
                    continue;
                }
                return Err(Error::arg_value(format!(
                    "The temporal values have different value at their common timestamp {}",
                    crate::datetime::format_timestamptz(inst.timestamp())
                )));
            }
        }
        out.push(inst);
    }
    Ok(out)
}

impl PartialEq for Temporal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Temporal::Instant(a), Temporal::Instant(b)) => a == b,
            (Temporal::Sequence(a), Temporal::Sequence(b)) => a == b,
            (Temporal::SequenceSet(a), Temporal::SequenceSet(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Temporal {}

impl Hash for Temporal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_selects_the_subtype() {
        let inst = Temporal::parse("1@2018-01-01 08:00:00+00", MobType::TInt).unwrap();
        assert!(matches!(inst, Temporal::Instant(_)));
        let seq = Temporal::parse("[1@2018-01-01 08:00:00+00]", MobType::TInt).unwrap();
        assert!(matches!(seq, Temporal::Sequence(_)));
        let disc = Temporal::parse("{1@2018-01-01, 2@2018-01-02}", MobType::TInt).unwrap();
        assert!(
            matches!(&disc, Temporal::Sequence(s) if s.interpolation() == TInterpolation::Discrete)
        );
        let ss = Temporal::parse("{[1@2018-01-01 08:00:00+00]}", MobType::TInt).unwrap();
        assert!(matches!(ss, Temporal::SequenceSet(_)));
    }

    #[test]
    fn instant_requires_end_of_input() {
        assert!(Temporal::parse("1@2018-01-01 junk]", MobType::TInt).is_err());
    }

    #[test]
    fn step_prefix_selects_step_interpolation() {
        let t = Temporal::parse("Interp=Step;[1@2001-01-01, 2@2001-01-02)", MobType::TFloat)
            .unwrap();
        assert_eq!(t.interpolation(), TInterpolation::Step);
        let Temporal::Sequence(s) = &t else { panic!("sequence expected") };
        assert!(s.is_lower_inclusive());
        assert!(!s.is_upper_inclusive());
        assert!(t.to_wkt(15).starts_with("Interp=Step;["));
    }

    #[test]
    fn tint_step_needs_no_prefix() {
        let t = Temporal::parse("[1@2001-01-01, 2@2001-01-02)", MobType::TInt).unwrap();
        assert_eq!(t.interpolation(), TInterpolation::Step);
        assert!(t.to_wkt(15).starts_with('['));
    }

    #[test]
    fn geo_sequence_hoists_srid() {
        let t = Temporal::parse(
            "SRID=4326;[POINT(0 0)@2001-01-01, POINT(1 1)@2001-01-02]",
            MobType::TGeomPoint,
        )
        .unwrap();
        assert_eq!(t.srid(), 4326);
        assert_eq!(t.interpolation(), TInterpolation::Linear);
        let Temporal::Sequence(s) = &t else { panic!("sequence expected") };
        assert!(s.is_lower_inclusive() && s.is_upper_inclusive());
        assert_eq!(s.num_instants(), 2);
        assert!(t.to_wkt(15).starts_with("SRID=4326;[POINT(0 0)@"));
    }

    #[test]
    fn merge_instants_into_a_discrete_sequence() {
        let a = Temporal::parse("1@2001-01-01", MobType::TInt).unwrap();
        let b = Temporal::parse("2@2001-01-02", MobType::TInt).unwrap();
        let merged = a.merge(&b).unwrap();
        assert!(
            matches!(&merged, Temporal::Sequence(s) if s.interpolation() == TInterpolation::Discrete)
        );
        assert_eq!(merged.num_instants(), 2);
        assert_eq!(merged, b.merge(&a).unwrap());
    }

    #[test]
    fn merging_coincident_instants_requires_equal_values() {
        let a = Temporal::parse("1@2001-01-01", MobType::TInt).unwrap();
        let same = Temporal::parse("1@2001-01-01", MobType::TInt).unwrap();
        let merged = a.merge(&same).unwrap();
        assert!(matches!(merged, Temporal::Instant(_)));
        let clash = Temporal::parse("2@2001-01-01", MobType::TInt).unwrap();
        let err = a.merge(&clash).unwrap_err();
        assert!(err.to_string().contains("different value"));
    }

    #[test]
    fn merge_sequences_widens_to_a_sequence_set() {
        let a = Temporal::parse("[1@2001-01-01, 2@2001-01-02]", MobType::TFloat).unwrap();
        let b = Temporal::parse("[3@2001-01-05, 4@2001-01-06]", MobType::TFloat).unwrap();
        let merged = a.merge(&b).unwrap();
        assert!(matches!(&merged, Temporal::SequenceSet(ss) if ss.num_sequences() == 2));
        assert_eq!(merged, b.merge(&a).unwrap());
    }

    #[test]
    fn merge_touching_sequences_collapses_to_one() {
        let a = Temporal::parse("[1@2001-01-01, 2@2001-01-02)", MobType::TFloat).unwrap();
        let b = Temporal::parse("[2@2001-01-02, 3@2001-01-03]", MobType::TFloat).unwrap();
        let merged = a.merge(&b).unwrap();
        assert!(matches!(&merged, Temporal::Sequence(_)));
        assert_eq!(merged.num_instants(), 3);
    }

    #[test]
    fn merge_requires_matching_interpolation() {
        let a = Temporal::parse("[1@2001-01-01, 2@2001-01-02]", MobType::TFloat).unwrap();
        let b = Temporal::parse("Interp=Step;[3@2001-01-05, 4@2001-01-06]", MobType::TFloat)
            .unwrap();
        let err = a.merge(&b).unwrap_err();
        assert!(err.to_string().contains("same interpolation"));
    }

    #[test]
    fn merge_instant_with_sequence_set() {
        let inst = Temporal::parse("5@2001-01-10", MobType::TFloat).unwrap();
        let ss = Temporal::parse(
            "{[1@2001-01-01, 2@2001-01-02], [3@2001-01-05, 4@2001-01-06]}",
            MobType::TFloat,
        )
        .unwrap();
        let merged = inst.merge(&ss).unwrap();
        assert!(matches!(&merged, Temporal::SequenceSet(s) if s.num_sequences() == 3));
    }

    #[test]
    fn comparison_starts_from_the_time_span() {
        let early = Temporal::parse("[9@2001-01-01, 9@2001-01-02]", MobType::TFloat).unwrap();
        let late = Temporal::parse("[1@2001-02-01, 1@2001-02-02]", MobType::TFloat).unwrap();
        assert_eq!(early.cmp_temporals(&late).unwrap(), Ordering::Less);
        assert_eq!(late.cmp_temporals(&early).unwrap(), Ordering::Greater);
        let same = Temporal::parse("[9@2001-01-01, 9@2001-01-02]", MobType::TFloat).unwrap();
        assert_eq!(early.cmp_temporals(&same).unwrap(), Ordering::Equal);
        assert_eq!(early.hash32(), same.hash32());
    }

    #[test]
    fn shift_scale_preserves_shape() {
        let t = Temporal::parse("{1@2001-01-01, 2@2001-01-03}", MobType::TInt).unwrap();
        let shifted = t.shift_scale_time(Some(TimeDelta::days(1)), None).unwrap();
        assert_eq!(
            shifted.to_wkt(15),
            "{1@2001-01-02 00:00:00+00, 2@2001-01-04 00:00:00+00}"
        );
    }

    #[test]
    fn value_at_timestamp_delegates() {
        let t = |s: &str| crate::datetime::parse_timestamptz(s).unwrap();
        let inst = Temporal::parse("7@2001-01-01", MobType::TInt).unwrap();
        assert_eq!(inst.value_at_timestamp(t("2001-01-01")), Some(Value::Int(7)));
        assert_eq!(inst.value_at_timestamp(t("2001-01-02")), None);
    }
}
