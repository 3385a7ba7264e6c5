#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::{
    bias::RangeCorrections,
    error::Error,
    prelude::TimeScale,
    refraction::{MeteoData, RefractionModel},
};

/// Prediction mode
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum PredictionMode {
    /// Corrected station to target range only, without pointing angles.
    InstantRange,
    /// Station to target vector at the requested instant.
    /// This is the fastest mode.
    #[default]
    InstantVector,
    /// Adds the laser pointing direction: station at firing time to
    /// target at bounce time, accounting for the light travel time
    /// and the Earth rotation during the flight.
    OutboundVector,
}

impl std::fmt::Display for PredictionMode {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InstantRange => write!(fmt, "Instant-Range"),
            Self::InstantVector => write!(fmt, "Instant-Vector"),
            Self::OutboundVector => write!(fmt, "Outbound-Vector"),
        }
    }
}

impl std::str::FromStr for PredictionMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "range" | "instant-range" => Ok(Self::InstantRange),
            "instant" | "instant-vector" => Ok(Self::InstantVector),
            "outbound" | "outbound-vector" => Ok(Self::OutboundVector),
            _ => Err(Error::UnknownPredictionMode(s.to_string())),
        }
    }
}

fn default_timescale() -> TimeScale {
    TimeScale::UTC
}

fn default_window_size() -> usize {
    16
}

fn default_step() -> f64 {
    1.0
}

fn default_tolerance() -> f64 {
    1.0E-3
}

fn default_max_iterations() -> usize {
    64
}

/// Pass scanning options
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct PassOpts {
    /// Default scanning step (s). Passes shorter than one step may be missed.
    #[cfg_attr(feature = "serde", serde(default = "default_step"))]
    pub step_s: f64,
    /// Mask crossing refinement tolerance (s)
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance_s: f64,
    /// Maximal number of iterations of each refinement
    #[cfg_attr(feature = "serde", serde(default = "default_max_iterations"))]
    pub max_iterations: usize,
}

impl Default for PassOpts {
    fn default() -> Self {
        Self {
            step_s: default_step(),
            tolerance_s: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// [Predictor](crate::prelude::Predictor) configuration: interpolation,
/// prediction mode, atmosphere and range corrections, pass scanning.
/// Every field has a default value, so a partial description may be deserialized.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Time scale in which the ephemeris is expressed.
    /// [Epoch](crate::prelude::Epoch)s proposed to the predictor are converted to this [TimeScale].
    #[cfg_attr(feature = "serde", serde(default = "default_timescale"))]
    pub timescale: TimeScale,
    /// Lagrange window size (polynomial degree + 1).
    /// - 9 is enough for 1 minute sampled LEO tables
    /// - 16 is the standard for submillimetric resolution
    #[cfg_attr(feature = "serde", serde(default = "default_window_size"))]
    pub window_size: usize,
    /// Prediction mode
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: PredictionMode,
    /// Refraction model applied to elevations
    #[cfg_attr(feature = "serde", serde(default))]
    pub refraction: RefractionModel,
    /// Ambient conditions, when no live feed is used
    #[cfg_attr(feature = "serde", serde(default))]
    pub meteo: MeteoData,
    /// Range corrections
    #[cfg_attr(feature = "serde", serde(default))]
    pub corrections: RangeCorrections,
    /// Pass scanning options
    #[cfg_attr(feature = "serde", serde(default))]
    pub pass: PassOpts,
}

impl Default for Config {
    fn default() -> Self {
        Self::preset(PredictionMode::default())
    }
}

impl Config {
    /// Default [Config] for given [PredictionMode]: 16 samples window,
    /// Sæmundsson refraction under standard conditions, corrections disabled.
    pub fn preset(mode: PredictionMode) -> Self {
        Self {
            mode,
            timescale: default_timescale(),
            window_size: default_window_size(),
            refraction: RefractionModel::default(),
            meteo: MeteoData::default(),
            corrections: RangeCorrections::default(),
            pass: PassOpts::default(),
        }
    }

    /// Copies and returns [Config] with desired window size.
    pub fn with_window_size(&self, window_size: usize) -> Self {
        let mut s = self.clone();
        s.window_size = window_size;
        s
    }

    /// Copies and returns [Config] with desired [RefractionModel].
    pub fn with_refraction(&self, refraction: RefractionModel) -> Self {
        let mut s = self.clone();
        s.refraction = refraction;
        s
    }

    /// Verifies this [Config] is usable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.window_size < 2 {
            return Err(Error::InvalidWindowSize(self.window_size));
        }
        if !(self.pass.step_s.is_finite() && self.pass.step_s > 0.0) {
            return Err(Error::InvalidStep(self.pass.step_s));
        }
        if !(self.pass.tolerance_s.is_finite() && self.pass.tolerance_s > 0.0) {
            return Err(Error::InvalidTolerance(self.pass.tolerance_s));
        }
        if self.pass.max_iterations == 0 {
            return Err(Error::InvalidIterations);
        }
        Ok(())
    }
}
