use std::sync::Arc;

use hifitime::Epoch;
use log::{debug, trace};
use nalgebra::{Rotation3, Vector3};
use rayon::prelude::*;

use crate::{
    bias::CorrectedRange,
    cfg::{Config, PredictionMode},
    constants::{EARTH_ANGULAR_VEL_RAD, SPEED_OF_LIGHT_M_S},
    ephemeris::EphemerisTable,
    error::Error,
    interpolation::{interpolate, InterpolationOutcome, InterpolationStatus},
    refraction::{MeteoData, MeteoSource},
    time::TimeValue,
    topocentric::{to_topocentric, StationLocation, TopocentricResult},
};

/// Light travel time iterations of the outbound vector
const OUTBOUND_ITERATIONS: usize = 2;

/// Laser pointing direction: station at firing time to target at bounce time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OutboundVector {
    /// Instant the pulse reaches the target
    pub time_bounce: TimeValue,
    /// Pointing azimuth (degrees) in [0, 360[
    pub azimuth: f64,
    /// Pointing elevation (degrees), refraction included
    pub elevation: f64,
    /// Station to target distance at bounce time, with all corrections but
    /// the tropospheric and system delays.
    pub range: CorrectedRange,
    /// Twice the azimuth difference between instant and outbound directions (degrees)
    pub pointing_offset_az: f64,
    /// Twice the elevation difference between instant and outbound directions (degrees)
    pub pointing_offset_el: f64,
    /// [InterpolationStatus] at bounce time
    pub status: InterpolationStatus,
}

/// Single instant prediction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Prediction {
    /// Requested instant
    pub time: TimeValue,
    /// Interpolated geocentric state
    pub outcome: InterpolationOutcome,
    /// Station relative view, unless interpolation failed
    /// or in [PredictionMode::InstantRange]
    pub topocentric: Option<TopocentricResult>,
    /// Pointing direction, in [PredictionMode::OutboundVector] only
    pub outbound: Option<OutboundVector>,
    /// Instant range and its corrections, unless interpolation failed
    pub range: Option<CorrectedRange>,
}

impl Prediction {
    /// [InterpolationStatus] of this prediction
    pub fn status(&self) -> InterpolationStatus {
        self.outcome.status
    }

    /// True when this prediction holds usable values
    pub fn is_valid(&self) -> bool {
        self.outcome.is_valid()
    }

    /// Reported elevation (degrees)
    pub fn elevation(&self) -> Option<f64> {
        self.topocentric.map(|topo| topo.elevation)
    }
}

/// [Predictor] combines one immutable [EphemerisTable] with one
/// immutable [StationLocation]. It holds no mutable state: a single
/// [Predictor] may serve any number of threads.
#[derive(Debug, Clone)]
pub struct Predictor {
    table: Arc<EphemerisTable>,
    station: StationLocation,
    cfg: Config,
}

impl Predictor {
    /// Builds a new [Predictor]. The same [EphemerisTable] may be shared
    /// by several [Predictor]s (one per station, for example).
    pub fn new(
        table: Arc<EphemerisTable>,
        station: StationLocation,
        cfg: Config,
    ) -> Result<Self, Error> {
        cfg.validate()?;
        debug!(
            "predictor: {} samples, window={}, mode={}, refraction={}",
            table.len(),
            cfg.window_size,
            cfg.mode,
            cfg.refraction
        );
        Ok(Self {
            table,
            station,
            cfg,
        })
    }

    /// [EphemerisTable] in use
    pub fn table(&self) -> &EphemerisTable {
        &self.table
    }

    /// [StationLocation] in use
    pub fn station(&self) -> &StationLocation {
        &self.station
    }

    /// [Config] in use
    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    /// Time span over which predictions may be requested.
    pub fn time_window(&self) -> (TimeValue, TimeValue) {
        (self.table.first_time(), self.table.last_time())
    }

    /// True if the `[start, end]` interval lies within [Self::time_window].
    pub fn is_inside_time_window(&self, start: TimeValue, end: TimeValue) -> bool {
        let (first, last) = self.time_window();
        start <= end && start >= first && end <= last
    }

    /// Interpolates the geocentric state at `t`.
    pub fn interpolate(&self, t: TimeValue) -> InterpolationOutcome {
        interpolate(&self.table, t, self.cfg.window_size)
    }

    /// Single shot prediction at `t`, using the configured meteo.
    pub fn predict(&self, t: TimeValue) -> Prediction {
        self.predict_with_meteo(t, &self.cfg.meteo)
    }

    /// Single shot prediction at `epoch`, converted to the [Config] time scale first.
    pub fn predict_epoch(&self, epoch: Epoch) -> Prediction {
        self.predict(TimeValue::from_epoch(epoch, self.cfg.timescale))
    }

    /// Single shot prediction at `t`, using a [MeteoSource].
    pub fn predict_with_meteo<M: MeteoSource + ?Sized>(&self, t: TimeValue, meteo: &M) -> Prediction {
        let outcome = self.interpolate(t);

        let mut prediction = Prediction {
            time: t,
            outcome,
            topocentric: None,
            outbound: None,
            range: None,
        };

        if !outcome.is_valid() {
            return prediction;
        }

        let meteo = meteo.meteo_at(t);

        if self.cfg.mode == PredictionMode::InstantRange {
            let geometric_m = (outcome.position - self.station.geocentric).norm();
            prediction.range = Some(self.cfg.corrections.apply_selected(
                geometric_m,
                None,
                true,
                &self.station,
                &meteo,
            ));
            return prediction;
        }

        let topo = to_topocentric(
            &self.station,
            &outcome.position,
            outcome.velocity.as_ref(),
            &meteo,
            self.cfg.refraction,
        );

        prediction.range = Some(self.cfg.corrections.apply(
            topo.range,
            topo.unrefracted_elevation,
            &self.station,
            &meteo,
        ));

        if self.cfg.mode == PredictionMode::OutboundVector {
            prediction.outbound = self.outbound_vector(t, &topo, &meteo);
        }

        prediction.topocentric = Some(topo);
        prediction
    }

    fn outbound_vector(
        &self,
        t: TimeValue,
        instant: &TopocentricResult,
        meteo: &MeteoData,
    ) -> Option<OutboundVector> {
        let mut tof_1w = instant.range / SPEED_OF_LIGHT_M_S;
        let mut time_bounce = t;
        let mut status = InterpolationStatus::NotError;
        let mut target = Vector3::zeros();
        let mut bounce_position = Vector3::zeros();

        for _ in 0..OUTBOUND_ITERATIONS {
            time_bounce = t + tof_1w;

            let outcome = self.interpolate(time_bounce);
            if !outcome.is_valid() {
                trace!("{}: outbound vector - {}", time_bounce, outcome.status);
                return None;
            }
            status = outcome.status;
            bounce_position = outcome.position;

            // express the bounce position in the Earth frame of the firing instant
            let rotation =
                Rotation3::from_axis_angle(&Vector3::z_axis(), EARTH_ANGULAR_VEL_RAD * tof_1w);
            target = rotation * outcome.position;

            tof_1w = (target - self.station.geocentric).norm() / SPEED_OF_LIGHT_M_S;
        }

        let topo = to_topocentric(&self.station, &target, None, meteo, self.cfg.refraction);

        let diff_az = (instant.azimuth - topo.azimuth + 180.0).rem_euclid(360.0) - 180.0;
        let diff_el = instant.unrefracted_elevation - topo.unrefracted_elevation;

        // tropo and system delays are already accounted for by the instant range
        let range = self.cfg.corrections.apply_selected(
            (bounce_position - self.station.geocentric).norm(),
            None,
            false,
            &self.station,
            meteo,
        );

        Some(OutboundVector {
            time_bounce,
            azimuth: topo.azimuth,
            elevation: topo.elevation,
            range,
            pointing_offset_az: 2.0 * diff_az,
            pointing_offset_el: 2.0 * diff_el,
            status,
        })
    }

    /// Predictions every `step_s` seconds over `[start, end[`, evaluated in parallel.
    /// Results are sorted chronologically and identical to the
    /// corresponding [Self::predict] calls.
    pub fn predict_range(
        &self,
        start: TimeValue,
        end: TimeValue,
        step_s: f64,
    ) -> Result<Vec<Prediction>, Error> {
        if !(step_s.is_finite() && step_s > 0.0) {
            return Err(Error::InvalidStep(step_s));
        }
        if end < start {
            return Err(Error::InvalidTimeRange);
        }

        let size = ((end - start) / step_s).ceil() as usize;

        let predictions = (0..size)
            .into_par_iter()
            .map(|i| start + i as f64 * step_s)
            .filter(|t| *t < end)
            .map(|t| self.predict(t))
            .collect::<Vec<_>>();

        debug!(
            "{} - {}: {} predictions (step={}s)",
            start,
            end,
            predictions.len(),
            step_s
        );

        Ok(predictions)
    }

    /// Reported elevation at `t`, as used by the pass scanner.
    pub(crate) fn elevation_at(&self, t: TimeValue) -> Result<f64, InterpolationStatus> {
        let outcome = self.interpolate(t);
        if !outcome.is_valid() {
            return Err(outcome.status);
        }
        let topo = to_topocentric(
            &self.station,
            &outcome.position,
            None,
            &self.cfg.meteo,
            self.cfg.refraction,
        );
        Ok(topo.elevation)
    }
}
