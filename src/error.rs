use thiserror::Error;

/// Errors raised while building the prediction session.
///
/// Query-time conditions (out of bounds requests, degraded windows,
/// truncated scans) are never reported through this type: they are carried
/// by [InterpolationStatus](crate::prelude::InterpolationStatus) and
/// [ScanTruncation](crate::prelude::ScanTruncation) so the caller keeps
/// whatever could be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An [EphemerisTable](crate::prelude::EphemerisTable) needs at least one sample.
    #[error("ephemeris table is empty")]
    EmptyTable,

    /// Samples must be proposed in chronological order.
    #[error("ephemeris sample #{index} is older than its predecessor")]
    UnsortedTable { index: usize },

    /// Two samples share the same time tag.
    #[error("ephemeris sample #{index} duplicates its predecessor time tag")]
    DuplicateEpoch { index: usize },

    /// Position or velocity contains NaN or infinite values.
    #[error("ephemeris sample #{index} has non finite coordinates")]
    NonFiniteSample { index: usize },

    /// Either all samples carry a velocity, or none does.
    #[error("ephemeris sample #{index}: velocity must be provided for all samples or none")]
    MixedVelocity { index: usize },

    /// Station coordinates contain NaN or infinite values.
    #[error("station coordinates are not finite")]
    NonFiniteStation,

    /// Lagrange window needs at least two samples.
    #[error("invalid interpolation window size: {0}")]
    InvalidWindowSize(usize),

    /// Scan or batch step must be strictly positive and finite.
    #[error("invalid time step: {0} s")]
    InvalidStep(f64),

    /// Root search tolerance must be strictly positive and finite.
    #[error("invalid root search tolerance: {0} s")]
    InvalidTolerance(f64),

    /// Root search needs a non null iteration budget.
    #[error("root search requires at least one iteration")]
    InvalidIterations,

    /// Requested interval ends before it starts.
    #[error("invalid time range: end precedes start")]
    InvalidTimeRange,

    /// Elevation mask must lie within [-90°, 90°].
    #[error("invalid elevation mask: {0}°")]
    InvalidElevationMask(f64),

    #[error("unknown refraction model \"{0}\"")]
    UnknownRefractionModel(String),

    #[error("unknown tropo model \"{0}\"")]
    UnknownTropoModel(String),

    #[error("unknown water vapour pressure model \"{0}\"")]
    UnknownWaterVapourModel(String),

    #[error("unknown prediction mode \"{0}\"")]
    UnknownPredictionMode(String),
}
