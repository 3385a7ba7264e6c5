use itertools::Itertools;
use log::debug;
use nalgebra::Vector3;

use crate::{error::Error, time::TimeValue};

/// One time tagged geocentric state, in an Earth-centered Earth-fixed frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EphemerisSample {
    /// Time tag
    pub time: TimeValue,
    /// ECEF position (m)
    pub position: Vector3<f64>,
    /// ECEF velocity (m/s), when the provider samples it.
    pub velocity: Option<Vector3<f64>>,
}

impl EphemerisSample {
    /// Builds a position only [EphemerisSample].
    pub fn new(time: TimeValue, position: Vector3<f64>) -> Self {
        Self {
            time,
            position,
            velocity: None,
        }
    }

    /// Copies and returns [EphemerisSample] with sampled velocity.
    pub fn with_velocity(&self, velocity: Vector3<f64>) -> Self {
        let mut s = *self;
        s.velocity = Some(velocity);
        s
    }

    fn is_finite(&self) -> bool {
        let finite = |v: &Vector3<f64>| v.iter().all(|c| c.is_finite());
        self.time.second_of_day().is_finite()
            && finite(&self.position)
            && self.velocity.as_ref().map_or(true, finite)
    }
}

/// Whether samples carry a velocity. Resolved once, when building the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TableKind {
    /// All samples carry a velocity, interpolated like the position.
    HasVelocity,
    /// Velocity is derived from the position polynomial.
    PositionOnly,
}

/// Any ephemeris provider (file parser, propagator, network feed..)
/// should implement [EphemerisSource] to build an [EphemerisTable].
pub trait EphemerisSource {
    /// Provide all the time tagged samples of a single object, in chronological
    /// order, in a single reference frame and time scale.
    fn ephemeris_samples(&self) -> Vec<EphemerisSample>;
}

/// Ordered, deduplicated sequence of [EphemerisSample]s.
///
/// The table is validated once and never mutated afterwards, so any number of
/// threads may query it concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisTable {
    samples: Vec<EphemerisSample>,
    /// Time tags, as seconds elapsed since first sample
    offsets: Vec<f64>,
    kind: TableKind,
}

impl EphemerisTable {
    /// Builds a new [EphemerisTable]. Samples must be proposed in strictly
    /// increasing time order, with finite coordinates, and either all or none
    /// of them should carry a velocity.
    pub fn new(samples: Vec<EphemerisSample>) -> Result<Self, Error> {
        let first = samples.first().ok_or(Error::EmptyTable)?;

        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(Error::NonFiniteSample { index });
        }

        for (index, (prev, next)) in samples.iter().tuple_windows().enumerate() {
            if next.time == prev.time {
                return Err(Error::DuplicateEpoch { index: index + 1 });
            }
            if next.time < prev.time {
                return Err(Error::UnsortedTable { index: index + 1 });
            }
        }

        let kind = if first.velocity.is_some() {
            TableKind::HasVelocity
        } else {
            TableKind::PositionOnly
        };

        if let Some(index) = samples
            .iter()
            .position(|s| s.velocity.is_some() != (kind == TableKind::HasVelocity))
        {
            return Err(Error::MixedVelocity { index });
        }

        let t0 = first.time;
        let offsets = samples.iter().map(|s| s.time - t0).collect::<Vec<_>>();

        debug!(
            "ephemeris table: {} samples [{} ; {}] ({:?})",
            samples.len(),
            t0,
            samples[samples.len() - 1].time,
            kind,
        );

        Ok(Self {
            samples,
            offsets,
            kind,
        })
    }

    /// Builds a new [EphemerisTable] from any [EphemerisSource].
    pub fn from_source<S: EphemerisSource + ?Sized>(source: &S) -> Result<Self, Error> {
        Self::new(source.ephemeris_samples())
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if this table has no samples. Cannot happen for a constructed
    /// table, provided for API completeness.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// [TableKind] of this table
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Returns all [EphemerisSample]s
    pub fn samples(&self) -> &[EphemerisSample] {
        &self.samples
    }

    /// Time tag of the first sample
    pub fn first_time(&self) -> TimeValue {
        self.samples[0].time
    }

    /// Time tag of the last sample
    pub fn last_time(&self) -> TimeValue {
        self.samples[self.samples.len() - 1].time
    }

    /// Time span covered by the table, in seconds.
    pub fn span_s(&self) -> f64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// Nominal sampling interval (mean spacing between samples), in seconds.
    /// Null for a single sample table.
    pub fn mean_interval_s(&self) -> f64 {
        if self.samples.len() < 2 {
            0.0
        } else {
            self.span_s() / (self.samples.len() - 1) as f64
        }
    }

    /// Seconds elapsed since the first sample, for each sample.
    pub(crate) fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Index of the last sample at or before `t`, in O(log n).
    /// Returns [None] when `t` precedes the table.
    pub fn bracket(&self, t: TimeValue) -> Option<usize> {
        let after = self.samples.partition_point(|s| s.time <= t);
        after.checked_sub(1)
    }
}

impl TryFrom<Vec<EphemerisSample>> for EphemerisTable {
    type Error = Error;
    fn try_from(samples: Vec<EphemerisSample>) -> Result<Self, Error> {
        Self::new(samples)
    }
}
