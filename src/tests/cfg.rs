use std::str::FromStr;

use crate::prelude::{Config, PredictionMode, RefractionModel, TropoModel, WaterVapourModel};

#[test]
fn models_parsing() {
    for (desc, expected) in [
        ("saemundsson", RefractionModel::Saemundsson),
        ("Disabled", RefractionModel::Disabled),
    ] {
        let model = RefractionModel::from_str(desc).unwrap();
        assert_eq!(model, expected);
        assert_eq!(RefractionModel::from_str(&model.to_string()).unwrap(), model);
    }

    assert_eq!(TropoModel::from_str("mm").unwrap(), TropoModel::MariniMurray);
    assert!(TropoModel::from_str("saastamoinen").is_err());

    for model in [
        WaterVapourModel::GiacomoDavis,
        WaterVapourModel::OriginalMariniMurray,
    ] {
        assert_eq!(WaterVapourModel::from_str(&model.to_string()).unwrap(), model);
    }

    for mode in [
        PredictionMode::InstantRange,
        PredictionMode::InstantVector,
        PredictionMode::OutboundVector,
    ] {
        assert_eq!(PredictionMode::from_str(&mode.to_string()).unwrap(), mode);
    }
}

#[test]
fn presets() {
    let cfg = Config::preset(PredictionMode::OutboundVector);
    assert_eq!(cfg.mode, PredictionMode::OutboundVector);
    assert_eq!(cfg.window_size, Config::default().window_size);
    assert!(cfg.validate().is_ok());

    let cfg = cfg
        .with_window_size(9)
        .with_refraction(RefractionModel::Disabled);
    assert_eq!(cfg.window_size, 9);
    assert_eq!(cfg.refraction, RefractionModel::Disabled);
    assert_eq!(cfg.mode, PredictionMode::OutboundVector);
}

#[test]
#[cfg(feature = "serde")]
fn json_config() {
    let content = r#"{
        "window_size": 9,
        "mode": "OutboundVector",
        "refraction": "Disabled",
        "meteo": {
            "pressure_hpa": 1005.0
        },
        "corrections": {
            "enabled": true,
            "object_eccentricity_m": 0.251,
            "tropo": "MariniMurray"
        },
        "pass": {
            "step_s": 0.5
        }
    }"#;

    let cfg: Config = serde_json::from_str(content).unwrap();
    assert!(cfg.validate().is_ok());

    assert_eq!(cfg.window_size, 9);
    assert_eq!(cfg.mode, PredictionMode::OutboundVector);
    assert_eq!(cfg.refraction, RefractionModel::Disabled);

    assert_eq!(cfg.meteo.pressure_hpa, 1005.0);
    assert_eq!(cfg.meteo.temperature_c, 10.0);
    assert_eq!(cfg.meteo.relative_humidity, 0.5);

    assert!(cfg.corrections.enabled);
    assert_eq!(cfg.corrections.tropo, Some(TropoModel::MariniMurray));
    assert_eq!(cfg.corrections.water_vapour, WaterVapourModel::GiacomoDavis);
    assert_eq!(cfg.corrections.wavelength_um, 0.532);
    assert_eq!(cfg.corrections.systematic_m, 0.0);

    assert_eq!(cfg.pass.step_s, 0.5);
    assert_eq!(cfg.pass.tolerance_s, 1.0E-3);
    assert_eq!(cfg.pass.max_iterations, 64);

    let cfg: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, Config::default());
}
