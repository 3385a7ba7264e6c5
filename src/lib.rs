#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod bias;
mod cfg;
mod constants;
mod ephemeris;
mod error;
mod interpolation;
mod pass;
mod predictor;
mod refraction;
mod time;
mod topocentric;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::bias::{
        AppliedCorrections, CorrectedRange, RangeCorrections, TropoModel, WaterVapourModel,
    };
    pub use crate::cfg::{Config, PassOpts, PredictionMode};
    pub use crate::ephemeris::{EphemerisSample, EphemerisSource, EphemerisTable, TableKind};
    pub use crate::error::Error;
    pub use crate::interpolation::{interpolate, InterpolationOutcome, InterpolationStatus};
    pub use crate::pass::{PassCalculator, PassScan, PassWindow, ScanTruncation};
    pub use crate::predictor::{OutboundVector, Prediction, Predictor};
    pub use crate::refraction::{MeteoData, MeteoSource, RefractionModel};
    pub use crate::time::TimeValue;
    pub use crate::topocentric::{to_topocentric, StationLocation, TopocentricResult};
    // re-export
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

// pub export
pub use error::Error;
