use crate::{bias::RuntimeParams, error::Error, refraction::MeteoData};
use log::trace;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Tropospheric path delay model, for optical wavelengths.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum TropoModel {
    /// Marini & Murray (1973) one way path delay.
    #[default]
    MariniMurray,
}

impl std::str::FromStr for TropoModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<TropoModel, Error> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "mm" | "marini-murray" | "marinimurray" => Ok(TropoModel::MariniMurray),
            _ => Err(Error::UnknownTropoModel(s.to_string())),
        }
    }
}

impl std::fmt::Display for TropoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::MariniMurray => write!(f, "Marini-Murray"),
        }
    }
}

/// Water vapour pressure model, derived from relative humidity.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum WaterVapourModel {
    /// Giacomo (1982) and Davis (1992) saturation pressure and enhancement factor.
    #[default]
    GiacomoDavis,
    /// Formula proposed in the original Marini & Murray paper.
    OriginalMariniMurray,
}

impl std::str::FromStr for WaterVapourModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<WaterVapourModel, Error> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "giacomo-davis" | "giacomodavis" => Ok(WaterVapourModel::GiacomoDavis),
            "original-mm" | "originalmarinimurray" => Ok(WaterVapourModel::OriginalMariniMurray),
            _ => Err(Error::UnknownWaterVapourModel(s.to_string())),
        }
    }
}

impl std::fmt::Display for WaterVapourModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::GiacomoDavis => write!(f, "Giacomo-Davis"),
            Self::OriginalMariniMurray => write!(f, "Original-MM"),
        }
    }
}

impl WaterVapourModel {
    /// Water vapour pressure (hPa) at the station.
    pub fn pressure_hpa(&self, meteo: &MeteoData) -> f64 {
        let t_k = meteo.temperature_k();
        let t_c = meteo.temperature_c;
        let rh_percent = meteo.relative_humidity * 100.0;
        match self {
            Self::OriginalMariniMurray => {
                rh_percent * 6.11E-2 * 10.0_f64.powf(7.5 * t_c / (237.3 + t_c))
            },
            Self::GiacomoDavis => {
                let saturation = 0.01
                    * (1.2378847E-5 * t_k.powi(2) - 1.9121316E-2 * t_k + 33.93711047
                        - 6.3431645E3 / t_k)
                        .exp();
                let enhancement = 1.00062 + 3.14E-6 * meteo.pressure_hpa + 5.6E-7 * t_c.powi(2);
                rh_percent * 0.01 * enhancement * saturation
            },
        }
    }
}

impl TropoModel {
    /// One way tropospheric path delay (m), to be added to the geometric range.
    pub(crate) fn path_delay_m(&self, rtm: &RuntimeParams) -> f64 {
        match self {
            Self::MariniMurray => Self::marini_murray(rtm),
        }
    }

    fn marini_murray(rtm: &RuntimeParams) -> f64 {
        let p = rtm.meteo.pressure_hpa;
        let t = rtm.meteo.temperature_k();
        let e0 = rtm.water_vapour.pressure_hpa(&rtm.meteo);
        let cos_2phi = (2.0 * rtm.latitude_rad).cos();

        let a = 0.2357E-2 * p + 0.141E-3 * e0;
        let k = 1.163 - 0.968E-2 * cos_2phi - 0.104E-2 * t + 0.1435E-4 * p;
        let b = 1.084E-8 * p * t * k + 4.734E-8 * (2.0 * p.powi(2)) / (t * (3.0 - 1.0 / k));

        // laser frequency parameter and site function
        let f_lambda = 0.9650 + 0.0164 * rtm.wavelength_um.powi(-2)
            + 0.228E-3 * rtm.wavelength_um.powi(-4);
        let f_site = 1.0 - 0.26E-2 * cos_2phi - 0.31E-6 * rtm.height_m;

        let sin_e = rtm.elevation_rad.sin();
        let ab = a + b;
        let delay = (f_lambda / f_site) * (ab / (sin_e + (b / ab) / (sin_e + 0.01)));

        trace!(
            "marini-murray - [a: {:.4}, b: {:.4e}, k: {:.4}, e0: {:.3}] delay={:.4}m",
            a,
            b,
            k,
            e0,
            delay
        );

        delay
    }
}

#[cfg(test)]
mod test {
    use super::{TropoModel, WaterVapourModel};
    use crate::{bias::RuntimeParams, refraction::MeteoData};
    use std::str::FromStr;

    fn params(elevation_deg: f64) -> RuntimeParams {
        RuntimeParams {
            elevation_rad: elevation_deg.to_radians(),
            latitude_rad: 36.46525_f64.to_radians(),
            height_m: 98.0,
            wavelength_um: 0.532,
            meteo: MeteoData::standard(),
            water_vapour: WaterVapourModel::GiacomoDavis,
        }
    }

    #[test]
    fn zenith_delay() {
        let delay = TropoModel::MariniMurray.path_delay_m(&params(90.0));
        assert!(delay > 2.3 && delay < 2.6, "zenith delay: {}", delay);
    }

    #[test]
    fn decreasing_with_elevation() {
        let mut prev = f64::MAX;
        for elev in [5.0, 10.0, 20.0, 30.0, 45.0, 60.0, 75.0, 90.0] {
            let delay = TropoModel::MariniMurray.path_delay_m(&params(elev));
            assert!(delay.is_finite());
            assert!(delay < prev, "delay({})={} >= {}", elev, delay, prev);
            prev = delay;
        }
        // roughly 1/sin(E) mapping
        let d20 = TropoModel::MariniMurray.path_delay_m(&params(20.0));
        let d90 = TropoModel::MariniMurray.path_delay_m(&params(90.0));
        assert!((d20 / d90 - 1.0 / 20.0_f64.to_radians().sin()).abs() < 0.1);
    }

    #[test]
    fn water_vapour() {
        let meteo = MeteoData::standard();
        let gd = WaterVapourModel::GiacomoDavis.pressure_hpa(&meteo);
        let mm = WaterVapourModel::OriginalMariniMurray.pressure_hpa(&meteo);
        // ~12.3 hPa saturation at 10°C, 50% humidity
        assert!((gd - 6.17).abs() < 0.1, "giacomo-davis: {}", gd);
        assert!((mm - 6.14).abs() < 0.1, "marini-murray: {}", mm);

        let dry = MeteoData {
            relative_humidity: 0.0,
            ..meteo
        };
        assert_eq!(WaterVapourModel::GiacomoDavis.pressure_hpa(&dry), 0.0);
    }

    #[test]
    fn parsing() {
        assert_eq!(
            TropoModel::from_str("Marini-Murray").unwrap(),
            TropoModel::MariniMurray
        );
        assert!(TropoModel::from_str("niel").is_err());
        assert_eq!(
            WaterVapourModel::from_str("original-mm").unwrap(),
            WaterVapourModel::OriginalMariniMurray
        );
        assert_eq!(WaterVapourModel::GiacomoDavis.to_string(), "Giacomo-Davis");
    }
}
