//! Temporal sequence sets: time-disjoint sequences sharing an
//! interpolation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};

use crate::catalog::MobType;
use crate::collections::span::Span;
use crate::collections::{Ordered, SpanSet};
use crate::errors::{Error, Result};
use crate::hash;
use crate::parser::Cursor;
use crate::temporal::{TInstant, TInterpolation, TSequence, TemporalBox};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct TSequenceSet {
    temp_type: MobType,
    sequences: Vec<TSequence>,
    bbox: TemporalBox,
}

impl TSequenceSet {
    /// Build a sequence set from continuous sequences.
    ///
    /// Sequences are sorted by start time and must be pairwise
    /// time-disjoint; with `normalize`, sequences that touch with an
    /// exactly matching boundary sample are merged.
    pub fn new(sequences: Vec<TSequence>, normalize: bool) -> Result<TSequenceSet> {
        if sequences.is_empty() {
            return Err(Error::arg_value(
                "A temporal sequence set must have at least one sequence",
            ));
        }
        let temp_type = sequences[0].temp_type();
        let interp = sequences[0].interpolation();
        if interp == TInterpolation::Discrete {
            return Err(Error::arg_value(
                "A temporal sequence set cannot have discrete interpolation",
            ));
        }
        for s in &sequences {
            if s.temp_type() != temp_type {
                return Err(Error::arg_type(format!(
                    "Sequence set elements of mixed types: {} and {}",
                    temp_type.name(),
                    s.temp_type().name()
                )));
            }
            if s.interpolation() != interp {
                return Err(Error::arg_value(
                    "The temporal values must have the same interpolation",
                ));
            }
        }

        let mut sequences = sequences;
        sequences.sort_by(|a, b| {
            a.start_timestamp()
                .cmp(&b.start_timestamp())
                .then_with(|| b.is_lower_inclusive().cmp(&a.is_lower_inclusive()))
        });
        for pair in sequences.windows(2) {
            let cmp = pair[0].end_timestamp().cmp(&pair[1].start_timestamp());
            if cmp == Ordering::Greater
                || (cmp == Ordering::Equal
                    && pair[0].is_upper_inclusive()
                    && pair[1].is_lower_inclusive())
            {
                return Err(Error::arg_value(format!(
                    "The temporal sequences composing a temporal sequence set must be increasing: {}, {}",
                    pair[0].to_wkt(15),
                    pair[1].to_wkt(15)
                )));
            }
        }
        if normalize {
            sequences = normalize_sequences(sequences)?;
        }

        let mut bbox = sequences[0].bbox().clone();
        for s in &sequences[1..] {
            bbox.expand(s.bbox())?;
        }
        Ok(TSequenceSet {
            temp_type,
            sequences,
            bbox,
        })
    }

    /// Parse `{seq, seq, …}` from the cursor.
    pub(crate) fn parse_cursor(
        cur: &mut Cursor<'_>,
        temp_type: MobType,
        interp: TInterpolation,
        srid: &mut i32,
    ) -> Result<TSequenceSet> {
        let type_str = temp_type.name();
        cur.expect_obrace(type_str)?;
        let mut sequences = vec![TSequence::parse_continuous_cursor(
            cur, temp_type, interp, false, srid,
        )?];
        while cur.try_comma() {
            sequences.push(TSequence::parse_continuous_cursor(
                cur, temp_type, interp, false, srid,
            )?);
        }
        cur.expect_cbrace(type_str)?;
        cur.expect_end(type_str)?;
        TSequenceSet::new(sequences, true)
    }

    pub fn temp_type(&self) -> MobType {
        self.temp_type
    }

    pub fn interpolation(&self) -> TInterpolation {
        self.sequences[0].interpolation()
    }

    pub fn bbox(&self) -> &TemporalBox {
        &self.bbox
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// The n-th sequence, 1-based.
    pub fn sequence_n(&self, n: usize) -> Result<&TSequence> {
        if n < 1 || n > self.sequences.len() {
            return Err(Error::arg_value(format!("Invalid sequence number: {n}")));
        }
        Ok(&self.sequences[n - 1])
    }

    pub fn start_sequence(&self) -> &TSequence {
        &self.sequences[0]
    }

    pub fn end_sequence(&self) -> &TSequence {
        &self.sequences[self.sequences.len() - 1]
    }

    pub fn sequences(&self) -> &[TSequence] {
        &self.sequences
    }

    pub fn num_instants(&self) -> usize {
        self.sequences.iter().map(TSequence::num_instants).sum()
    }

    pub fn instants(&self) -> Vec<&TInstant> {
        self.sequences.iter().flat_map(TSequence::instants).collect()
    }

    /// Distinct timestamps across the composing sequences.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        let mut out: Vec<DateTime<Utc>> = Vec::with_capacity(self.num_instants());
        for s in &self.sequences {
            for t in s.timestamps() {
                if out.last() != Some(&t) {
                    out.push(t);
                }
            }
        }
        out
    }

    pub fn num_timestamps(&self) -> usize {
        self.timestamps().len()
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.sequences[0].start_timestamp()
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.sequences[self.sequences.len() - 1].end_timestamp()
    }

    pub fn values(&self) -> Vec<Value> {
        self.sequences.iter().flat_map(TSequence::values).collect()
    }

    pub fn start_value(&self) -> &Value {
        self.sequences[0].start_value()
    }

    pub fn end_value(&self) -> &Value {
        self.end_sequence().end_value()
    }

    pub fn min_value(&self) -> Value {
        self.sequences
            .iter()
            .map(TSequence::min_value)
            .min_by(|a, b| a.cmp_same(b))
            .expect("a sequence set has at least one sequence")
    }

    pub fn max_value(&self) -> Value {
        self.sequences
            .iter()
            .map(TSequence::max_value)
            .max_by(|a, b| a.cmp_same(b))
            .expect("a sequence set has at least one sequence")
    }

    /// Elapsed time: the summed duration of the composing sequences, or
    /// the extent of the whole set when gaps are ignored.
    pub fn duration(&self, ignore_gaps: bool) -> TimeDelta {
        if ignore_gaps {
            self.end_timestamp() - self.start_timestamp()
        } else {
            self.sequences
                .iter()
                .map(TSequence::duration)
                .fold(TimeDelta::zero(), |acc, d| acc + d)
        }
    }

    /// The time spans on which the value is defined.
    pub fn time(&self) -> Result<SpanSet> {
        let spans = self
            .sequences
            .iter()
            .map(TSequence::timespan)
            .collect::<Result<Vec<_>>>()?;
        SpanSet::new(spans, false, Ordered::Yes)
    }

    /// The bounding time span.
    pub fn timespan(&self) -> Result<Span> {
        Span::new(
            Value::Timestamp(self.start_timestamp()),
            Value::Timestamp(self.end_timestamp()),
            self.sequences[0].is_lower_inclusive(),
            self.end_sequence().is_upper_inclusive(),
        )
    }

    pub fn value_at_timestamp(&self, t: DateTime<Utc>) -> Option<Value> {
        self.sequences
            .iter()
            .find_map(|s| s.value_at_timestamp(t))
    }

    /// Shift and/or scale the whole set in time; interior sequences are
    /// rescaled against the global bounds.
    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<TSequenceSet> {
        let lower = self.start_timestamp();
        let upper = self.end_timestamp();
        let (lower1, upper1) =
            crate::collections::span::shift_scale_time_bounds(lower, upper, shift, duration)?;
        let scale = if upper > lower {
            (upper1 - lower1).num_microseconds().unwrap_or(0) as f64
                / (upper - lower).num_microseconds().unwrap_or(1) as f64
        } else {
            1.0
        };
        let sequences = self
            .sequences
            .iter()
            .map(|seq| {
                let instants = seq
                    .instants()
                    .iter()
                    .map(|inst| {
                        let offset =
                            (inst.timestamp() - lower).num_microseconds().unwrap_or(0) as f64;
                        let t = lower1 + TimeDelta::microseconds((offset * scale).round() as i64);
                        TInstant::new(inst.value().clone(), self.temp_type, t)
                    })
                    .collect::<Result<Vec<_>>>()?;
                TSequence::new(
                    instants,
                    seq.is_lower_inclusive(),
                    seq.is_upper_inclusive(),
                    seq.interpolation(),
                    false,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        TSequenceSet::new(sequences, true)
    }

    /// Body of the text form, without the SRID/interpolation prefixes.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        let mut out = String::from("{");
        for (i, s) in self.sequences.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&s.to_wkt(maxdd));
        }
        out.push('}');
        out
    }

    pub(crate) fn cmp_sequence_sets(&self, other: &TSequenceSet) -> Ordering {
        for (a, b) in self.sequences.iter().zip(other.sequences.iter()) {
            let ord = a.cmp_sequences(b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.sequences.len().cmp(&other.sequences.len())
    }

    pub fn hash32(&self) -> u32 {
        let mut h: u32 = 1;
        for s in &self.sequences {
            h = hash::combine(h, s.hash32());
        }
        h
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        let mut h: u64 = 1;
        for s in &self.sequences {
            h = hash::combine_extended(h, s.hash64(seed));
        }
        h
    }
}

/// Merge sequences that touch with a matching boundary sample.
fn normalize_sequences(sequences: Vec<TSequence>) -> Result<Vec<TSequence>> {
    let mut iter = sequences.into_iter();
    let mut current = iter.next().expect("normalization needs one sequence");
    let mut out = Vec::new();
    for next in iter {
        let touching = current.end_timestamp() == next.start_timestamp()
            && (current.is_upper_inclusive() || next.is_lower_inclusive())
            && current.end_value().cmp_same(next.start_value()) == Ordering::Equal;
        if touching {
            let mut instants: Vec<TInstant> = current.instants().to_vec();
            instants.extend(next.instants().iter().skip(1).cloned());
            current = TSequence::new(
                instants,
                current.is_lower_inclusive(),
                next.is_upper_inclusive(),
                current.interpolation(),
                false,
            )?;
        } else {
            out.push(std::mem::replace(&mut current, next));
        }
    }
    out.push(current);
    Ok(out)
}

impl PartialEq for TSequenceSet {
    fn eq(&self, other: &Self) -> bool {
        self.temp_type == other.temp_type
            && self.interpolation() == other.interpolation()
            && self.cmp_sequence_sets(other) == Ordering::Equal
    }
}

impl Eq for TSequenceSet {}

impl Hash for TSequenceSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl fmt::Display for TSequenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::SRID_UNKNOWN;

    fn seqset(s: &str, temp_type: MobType, interp: TInterpolation) -> Result<TSequenceSet> {
        let mut cur = Cursor::new(s);
        let mut srid = SRID_UNKNOWN;
        TSequenceSet::parse_cursor(&mut cur, temp_type, interp, &mut srid)
    }

    #[test]
    fn sequences_are_sorted_and_kept_disjoint() {
        let ss = seqset(
            "{[3@2001-01-05, 4@2001-01-06], [1@2001-01-01, 2@2001-01-02]}",
            MobType::TFloat,
            TInterpolation::Linear,
        )
        .unwrap();
        assert_eq!(ss.num_sequences(), 2);
        assert_eq!(ss.start_value(), &Value::Float(1.0));
        assert_eq!(ss.end_value(), &Value::Float(4.0));
    }

    #[test]
    fn overlapping_sequences_fail() {
        let err = seqset(
            "{[1@2001-01-01, 2@2001-01-03], [5@2001-01-02, 6@2001-01-04]}",
            MobType::TFloat,
            TInterpolation::Linear,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be increasing"));
    }

    #[test]
    fn touching_sequences_with_matching_sample_merge() {
        let ss = seqset(
            "{[1@2001-01-01, 2@2001-01-02), [2@2001-01-02, 3@2001-01-03]}",
            MobType::TFloat,
            TInterpolation::Linear,
        )
        .unwrap();
        assert_eq!(ss.num_sequences(), 1);
        assert_eq!(ss.num_instants(), 3);
    }

    #[test]
    fn touching_sequences_with_a_value_jump_stay_apart() {
        let ss = seqset(
            "{[1@2001-01-01, 2@2001-01-02), [5@2001-01-02, 6@2001-01-03]}",
            MobType::TFloat,
            TInterpolation::Linear,
        )
        .unwrap();
        assert_eq!(ss.num_sequences(), 2);
    }

    #[test]
    fn mixed_interpolation_fails() {
        let a = {
            let mut cur = Cursor::new("[1@2001-01-01, 2@2001-01-02]");
            let mut srid = SRID_UNKNOWN;
            TSequence::parse_continuous_cursor(
                &mut cur,
                MobType::TFloat,
                TInterpolation::Linear,
                true,
                &mut srid,
            )
            .unwrap()
        };
        let b = {
            let mut cur = Cursor::new("[1@2001-01-05, 2@2001-01-06]");
            let mut srid = SRID_UNKNOWN;
            TSequence::parse_continuous_cursor(
                &mut cur,
                MobType::TFloat,
                TInterpolation::Step,
                true,
                &mut srid,
            )
            .unwrap()
        };
        assert!(TSequenceSet::new(vec![a, b], true).is_err());
    }

    #[test]
    fn time_and_duration_account_for_gaps() {
        let ss = seqset(
            "{[1@2001-01-01, 2@2001-01-02], [3@2001-01-05, 4@2001-01-06]}",
            MobType::TFloat,
            TInterpolation::Linear,
        )
        .unwrap();
        assert_eq!(ss.duration(false), TimeDelta::days(2));
        assert_eq!(ss.duration(true), TimeDelta::days(5));
        let time = ss.time().unwrap();
        assert_eq!(time.num_spans(), 2);
        assert_eq!(ss.timespan().unwrap().duration().unwrap(), TimeDelta::days(5));
    }

    #[test]
    fn value_lookup_spans_the_gap() {
        let ss = seqset(
            "{[1@2001-01-01, 2@2001-01-02], [3@2001-01-05, 4@2001-01-06]}",
            MobType::TFloat,
            TInterpolation::Linear,
        )
        .unwrap();
        let t = |s: &str| crate::datetime::parse_timestamptz(s).unwrap();
        assert_eq!(ss.value_at_timestamp(t("2001-01-02")), Some(Value::Float(2.0)));
        assert_eq!(ss.value_at_timestamp(t("2001-01-03")), None);
        assert_eq!(ss.value_at_timestamp(t("2001-01-05 12:00:00")), Some(Value::Float(3.5)));
    }
}
