use crate::{
    constants::{PICOSECONDS_TO_S, SPEED_OF_LIGHT_M_S},
    refraction::MeteoData,
    topocentric::StationLocation,
};

pub(crate) mod tropo;
pub use tropo::{TropoModel, WaterVapourModel};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn default_wavelength() -> f64 {
    0.532
}

/// Station and target dependent range corrections,
/// applied to the geometric (instant) range.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct RangeCorrections {
    /// Corrections are only applied when enabled.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enabled: bool,
    /// Target center of mass correction (m), subtracted from the range.
    #[cfg_attr(feature = "serde", serde(default))]
    pub object_eccentricity_m: f64,
    /// Ground system eccentricity (m), added to the range.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ground_eccentricity_m: f64,
    /// Two way system delay (ps). Half of it contributes to the one way range.
    #[cfg_attr(feature = "serde", serde(default))]
    pub calibration_delay_ps: f64,
    /// Systematic and random errors (m), added to the range.
    #[cfg_attr(feature = "serde", serde(default))]
    pub systematic_m: f64,
    /// Tropospheric path delay model
    #[cfg_attr(feature = "serde", serde(default))]
    pub tropo: Option<TropoModel>,
    /// Water vapour pressure model, used by the tropospheric model
    #[cfg_attr(feature = "serde", serde(default))]
    pub water_vapour: WaterVapourModel,
    /// Laser wavelength (µm)
    #[cfg_attr(feature = "serde", serde(default = "default_wavelength"))]
    pub wavelength_um: f64,
}

impl Default for RangeCorrections {
    fn default() -> Self {
        Self {
            enabled: false,
            object_eccentricity_m: 0.0,
            ground_eccentricity_m: 0.0,
            calibration_delay_ps: 0.0,
            systematic_m: 0.0,
            tropo: None,
            water_vapour: WaterVapourModel::default(),
            wavelength_um: default_wavelength(),
        }
    }
}

/// Corrections that were effectively applied, in meters of one way range.
/// Corrections that were not applied are [None], not null.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AppliedCorrections {
    pub calibration_delay: Option<f64>,
    pub object_eccentricity: Option<f64>,
    pub ground_eccentricity: Option<f64>,
    pub systematic: Option<f64>,
    pub tropo: Option<f64>,
}

impl AppliedCorrections {
    /// Sum of all applied corrections (m)
    pub fn total(&self) -> f64 {
        [
            self.calibration_delay,
            self.object_eccentricity,
            self.ground_eccentricity,
            self.systematic,
            self.tropo,
        ]
        .iter()
        .flatten()
        .sum()
    }
}

/// Instant range, with its corrections.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CorrectedRange {
    /// Geometric station to target distance (m)
    pub geometric_m: f64,
    /// One way range, corrections included (m)
    pub range_1w_m: f64,
    /// Two way time of flight (s)
    pub tof_2w_s: f64,
    /// Applied corrections
    pub applied: AppliedCorrections,
}

pub(crate) struct RuntimeParams {
    /// Geometric elevation (rad)
    pub elevation_rad: f64,
    /// Station geodetic latitude (rad)
    pub latitude_rad: f64,
    /// Station height (m)
    pub height_m: f64,
    /// Laser wavelength (µm)
    pub wavelength_um: f64,
    pub meteo: MeteoData,
    pub water_vapour: WaterVapourModel,
}

impl RangeCorrections {
    /// Applies these corrections to the `geometric_m` range of a target
    /// seen at geometric (unrefracted) `elevation_deg` from `station`.
    /// The tropospheric delay is only evaluated for targets above the horizon.
    pub fn apply(
        &self,
        geometric_m: f64,
        elevation_deg: f64,
        station: &StationLocation,
        meteo: &MeteoData,
    ) -> CorrectedRange {
        self.apply_selected(geometric_m, Some(elevation_deg), true, station, meteo)
    }

    /// Applies a subset of these corrections. The tropospheric delay is skipped
    /// when `tropo_elevation_deg` is [None], the system delay when `calibration` is false.
    pub(crate) fn apply_selected(
        &self,
        geometric_m: f64,
        tropo_elevation_deg: Option<f64>,
        calibration: bool,
        station: &StationLocation,
        meteo: &MeteoData,
    ) -> CorrectedRange {
        let mut applied = AppliedCorrections::default();

        if self.enabled {
            let nonzero = |value: f64| if value != 0.0 { Some(value) } else { None };

            if calibration {
                applied.calibration_delay = nonzero(self.calibration_delay_ps)
                    .map(|ps| 0.5 * ps * PICOSECONDS_TO_S * SPEED_OF_LIGHT_M_S);
            }
            applied.object_eccentricity = nonzero(self.object_eccentricity_m).map(|m| -m);
            applied.ground_eccentricity = nonzero(self.ground_eccentricity_m);
            applied.systematic = nonzero(self.systematic_m);

            let tropo = self.tropo.zip(tropo_elevation_deg.filter(|el| *el > 0.0));

            if let Some((tropo, elevation_deg)) = tropo {
                let geodetic = station.geodetic();
                let rtm = RuntimeParams {
                    elevation_rad: elevation_deg.to_radians(),
                    latitude_rad: geodetic[0],
                    height_m: geodetic[2],
                    wavelength_um: self.wavelength_um,
                    meteo: *meteo,
                    water_vapour: self.water_vapour,
                };
                applied.tropo = Some(tropo.path_delay_m(&rtm));
            }
        }

        let range_1w_m = geometric_m + applied.total();

        CorrectedRange {
            geometric_m,
            range_1w_m,
            tof_2w_s: 2.0 * range_1w_m / SPEED_OF_LIGHT_M_S,
            applied,
        }
    }
}
