//! Unit tests for the radio models.

#[cfg(test)]
mod helpers {
    use serde_json::json;

    use crate::model::RadioParams;

    /// The linear-degradation fixture used across the graph tests: 5 ms /
    /// 10 Mbps at the cell center, 100 ms / 5 Mbps at the 5 km radius.
    pub fn linear_params() -> RadioParams {
        serde_json::from_value(json!({
            "best_qos": {
                "latency": {"delay": "5.0ms", "deviation": "2.0ms"},
                "bandwidth": "10.0mbps",
                "error_rate": "1.0%",
            },
            "worst_qos": {
                "latency": {"delay": "100.0ms", "deviation": "20.0ms"},
                "bandwidth": "5.0mbps",
                "error_rate": "2.0%",
            },
            "radius": "5km",
        }))
        .unwrap()
    }

    pub fn approx(actual: f64, expected: f64, tolerance: f64) -> bool {
        let scale = expected.abs().max(1.0);
        (actual - expected).abs() <= tolerance * scale
    }
}

#[cfg(test)]
mod degradation {
    use crate::degradation::{Decay, DegradationFn};
    use crate::error::DegradationError;

    fn linear(lower_is_better: bool) -> DegradationFn {
        DegradationFn::new(10.0, 100.0, 10.0, lower_is_better, Decay::Linear).unwrap()
    }

    #[test]
    fn linear_interpolates_both_directions() {
        assert_eq!(linear(true).apply(5.0).unwrap(), Some(55.0));
        assert_eq!(linear(true).apply(2.0).unwrap(), Some(28.0));
        assert_eq!(linear(false).apply(2.0).unwrap(), Some(82.0));
        assert_eq!(linear(false).apply(5.0).unwrap(), Some(55.0));
    }

    #[test]
    fn linear_boundaries() {
        assert_eq!(linear(true).apply(0.0).unwrap(), Some(10.0));
        assert_eq!(linear(false).apply(0.0).unwrap(), Some(100.0));
        assert_eq!(linear(true).apply(10.0).unwrap(), Some(100.0));
        assert_eq!(linear(false).apply(10.0).unwrap(), Some(10.0));
    }

    #[test]
    fn negative_distance_is_a_hard_error() {
        assert!(matches!(
            linear(true).apply(-15.0),
            Err(DegradationError::NegativeDistance(_))
        ));
    }

    #[test]
    fn beyond_radius_is_out_of_range() {
        assert_eq!(linear(true).apply(15.0).unwrap(), None);
        assert_eq!(linear(false).apply(15.0).unwrap(), None);
    }

    #[test]
    fn log2_matches_closed_form() {
        let up = DegradationFn::new(10.0, 100.0, 0.010, true, Decay::Log2).unwrap();
        let down = DegradationFn::new(10.0, 100.0, 0.010, false, Decay::Log2).unwrap();
        let v = up.apply(0.005).unwrap().unwrap();
        assert!((v - 72.907_300_390_241_69).abs() < 1e-9, "got {v}");
        let v = up.apply(0.002).unwrap().unwrap();
        assert!((v - 37.092_699_609_758_31).abs() < 1e-9, "got {v}");
        let v = down.apply(0.002).unwrap().unwrap();
        assert!((v - 72.907_300_390_241_69).abs() < 1e-9, "got {v}");
        let v = down.apply(0.005).unwrap().unwrap();
        assert!((v - 37.092_699_609_758_31).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn log_boundaries_avoid_log_of_zero() {
        for decay in [Decay::Log2, Decay::Log10] {
            let up = DegradationFn::new(10.0, 100.0, 10.0, true, decay).unwrap();
            let down = DegradationFn::new(10.0, 100.0, 10.0, false, decay).unwrap();
            assert_eq!(up.apply(0.0).unwrap(), Some(10.0));
            assert_eq!(down.apply(0.0).unwrap(), Some(100.0));
            assert_eq!(up.apply(10.0).unwrap(), Some(100.0));
            assert_eq!(down.apply(10.0).unwrap(), Some(10.0));
        }
    }

    #[test]
    fn constructor_rejects_bad_parameters() {
        assert!(matches!(
            DegradationFn::new(f64::NAN, 100.0, 10.0, true, Decay::Linear),
            Err(DegradationError::NonFinite("minimum"))
        ));
        assert!(matches!(
            DegradationFn::new(10.0, f64::INFINITY, 10.0, true, Decay::Linear),
            Err(DegradationError::NonFinite("maximum"))
        ));
        assert!(matches!(
            DegradationFn::new(10.0, 100.0, 0.0, true, Decay::Linear),
            Err(DegradationError::NonPositiveRadius(_))
        ));
    }
}

#[cfg(test)]
mod functional {
    use serde_json::json;

    use nsg_core::QoS;

    use crate::error::WirelessError;
    use crate::model::{build_model, RadioContext, RadioParams, WirelessKind};

    use super::helpers::linear_params;

    #[test]
    fn endpoints_reproduce_best_and_worst() {
        let model = build_model(WirelessKind::Linear, &linear_params()).unwrap();
        let center = model.qos_for(0.0, RadioContext::Direct).unwrap();
        assert_eq!(center.delay(), 5.0);
        assert_eq!(center.deviation(), 2.0);
        assert_eq!(center.bandwidth(), 10.0);
        assert_eq!(center.error_rate(), 1.0);

        let edge = model.qos_for(5.0, RadioContext::Direct).unwrap();
        assert_eq!(edge.delay(), 100.0);
        assert_eq!(edge.deviation(), 20.0);
        assert_eq!(edge.bandwidth(), 5.0);
        assert_eq!(edge.error_rate(), 2.0);
    }

    #[test]
    fn beyond_radius_degrades_to_minimum() {
        let model = build_model(WirelessKind::Linear, &linear_params()).unwrap();
        assert_eq!(model.qos_for(6.0, RadioContext::Direct).unwrap(), QoS::minimum());
    }

    #[test]
    fn channels_are_monotone_in_distance() {
        for kind in [WirelessKind::Linear, WirelessKind::Log2, WirelessKind::Log10] {
            let model = build_model(kind, &linear_params()).unwrap();
            let mut previous = model.qos_for(0.0, RadioContext::Direct).unwrap();
            for step in 1..=50 {
                let d = 5.0 * f64::from(step) / 50.0;
                let qos = model.qos_for(d, RadioContext::Direct).unwrap();
                assert!(qos.delay() >= previous.delay(), "{kind:?} delay at {d}");
                assert!(qos.deviation() >= previous.deviation(), "{kind:?} deviation at {d}");
                assert!(qos.bandwidth() <= previous.bandwidth(), "{kind:?} bandwidth at {d}");
                assert!(qos.error_rate() >= previous.error_rate(), "{kind:?} error at {d}");
                previous = qos;
            }
        }
    }

    #[test]
    fn missing_parameters_are_rejected() {
        let err = match build_model(WirelessKind::Linear, &RadioParams::default()) {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert!(matches!(err, WirelessError::MissingParameter("best_qos")));

        let no_radius: RadioParams = serde_json::from_value(json!({
            "best_qos": {"bandwidth": 10},
            "worst_qos": {"bandwidth": 5},
        }))
        .unwrap();
        let err = match build_model(WirelessKind::Linear, &no_radius) {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert!(matches!(err, WirelessError::MissingParameter("radius")));
    }

    #[test]
    fn nearest_cell_wins_by_default() {
        let model = build_model(WirelessKind::Linear, &linear_params()).unwrap();
        let cells = [
            crate::CellLoad { distance_km: 1.0, attached_ues: 5 },
            crate::CellLoad { distance_km: 2.0, attached_ues: 0 },
        ];
        let pick = model.select_cell(&cells).unwrap();
        assert_eq!(pick.index, 0);
        assert_eq!(pick.qos, model.qos_for(1.0, RadioContext::Direct).unwrap());
    }
}

#[cfg(test)]
mod stepwise {
    use std::collections::BTreeMap;

    use serde_json::json;

    use nsg_core::QoS;

    use crate::error::WirelessError;
    use crate::model::{RadioContext, WirelessModel};
    use crate::stepwise::Stepwise;

    fn two_bins() -> Stepwise {
        let bins: BTreeMap<String, serde_json::Value> = [
            (
                "0.5km".to_string(),
                json!({"latency": {"delay": 1, "deviation": 1}, "bandwidth": 50000, "error_rate": 0}),
            ),
            (
                "1km".to_string(),
                json!({"latency": {"delay": 10, "deviation": 3}, "bandwidth": 5000, "error_rate": 1}),
            ),
        ]
        .into();
        Stepwise::from_bins(&bins).unwrap()
    }

    #[test]
    fn lookup_picks_first_bin_with_bound_at_least_distance() {
        let model = two_bins();
        let near = model.qos_for(0.01, RadioContext::Direct).unwrap();
        assert_eq!(near.delay(), 1.0);
        assert_eq!(near.deviation(), 1.0);
        assert_eq!(near.bandwidth(), 50_000.0);
        assert_eq!(near.error_rate(), 0.0);

        let far = model.qos_for(0.501, RadioContext::Direct).unwrap();
        assert_eq!(far.delay(), 10.0);
        assert_eq!(far.deviation(), 3.0);
        assert_eq!(far.bandwidth(), 5_000.0);
        assert_eq!(far.error_rate(), 1.0);
    }

    #[test]
    fn bin_boundary_belongs_to_the_inner_bin() {
        assert_eq!(two_bins().qos_for(0.5, RadioContext::Direct).unwrap().delay(), 1.0);
    }

    #[test]
    fn radius_is_the_largest_bound() {
        assert_eq!(two_bins().radius_km(), 1.0);
    }

    #[test]
    fn at_least_one_bin_required() {
        let empty = BTreeMap::new();
        assert!(matches!(Stepwise::from_bins(&empty), Err(WirelessError::EmptyBins)));
    }

    #[test]
    fn flat_serves_one_qos_over_the_radius() {
        let mut qos = QoS::new();
        qos.set_delay(0.0);
        qos.set_deviation(0.0);
        qos.set_bandwidth(1_000_000.0);
        qos.set_error_rate(0.0);
        let flat = Stepwise::flat(0.5, qos.clone()).unwrap();
        assert_eq!(flat.radius_km(), 0.5);
        let sampled = flat.qos_for(0.010, RadioContext::Direct).unwrap();
        assert_eq!(sampled.delay(), 0.0);
        assert_eq!(sampled.deviation(), 0.0);
        assert_eq!(sampled.bandwidth(), 1_000_000.0);
        assert_eq!(sampled.error_rate(), 0.0);
    }

    #[test]
    fn negative_distance_is_rejected() {
        assert!(two_bins().qos_for(-0.1, RadioContext::Direct).is_err());
    }
}

#[cfg(test)]
mod siso {
    use crate::model::{RadioParams, WirelessModel};
    use crate::siso::Siso;

    use super::helpers::approx;

    fn default_siso() -> Siso {
        Siso::new(&RadioParams::default())
    }

    #[test]
    fn radius_from_capacity_floor() {
        assert_eq!(default_siso().radius_km(), 0.092);
    }

    #[test]
    fn bandwidth_window() {
        let siso = default_siso();
        assert_eq!(siso.bandwidth_at(0.0), 538.71 * 0.125);
        assert!(approx(siso.bandwidth_at(10.0), 528.903_403_297_434_9 * 0.125, 1e-9));
        assert!(approx(siso.bandwidth_at(90.0), 55.615_902_629_216_05 * 0.125, 1e-9));
        assert_eq!(siso.bandwidth_at(100.0), 53.87 * 0.125);
        assert_eq!(siso.bandwidth_at(1000.0), 53.87 * 0.125);
    }

    #[test]
    fn error_rate_curve() {
        let siso = default_siso();
        assert_eq!(siso.error_rate_at(0.0), 0.0);
        assert_eq!(siso.error_rate_at(50.0), 0.0);
        assert!(approx(siso.error_rate_at(70.0), 8.363_754_133_711_154e-8, 1e-9));
        assert!(approx(siso.error_rate_at(92.0), 1.605_501_632_007_122_5e-3, 1e-9));
    }

    #[test]
    fn qos_shape() {
        let qos = default_siso().qos_at(0.05).unwrap();
        assert_eq!(qos.delay(), 2.0);
        assert_eq!(qos.deviation(), 1.0);
        assert!(qos.bandwidth() > 0.0);
    }

    #[test]
    fn negative_distance_is_rejected() {
        assert!(default_siso().qos_at(-0.001).is_err());
    }
}

#[cfg(test)]
mod mimo {
    use serde_json::json;

    use nsg_core::QoS;

    use crate::mimo::Mimo;
    use crate::model::{CellLoad, RadioContext, RadioParams, WirelessModel};

    fn default_mimo() -> Mimo {
        Mimo::new(&RadioParams::default())
    }

    #[test]
    fn empty_cell_gets_full_spatial_streams() {
        let mimo = default_mimo();
        let cells = [CellLoad { distance_km: 0.01, attached_ues: 0 }];
        let pick = mimo.select_cell(&cells).unwrap();
        assert_eq!(pick.index, 0);
        let single = mimo.qos_for(0.01, RadioContext::Direct).unwrap();
        // 4 UE antennas against 8 free RU antennas → 4 streams.
        assert!((pick.qos.bandwidth() - 4.0 * single.bandwidth()).abs() < 1e-9);
    }

    #[test]
    fn congested_near_cell_loses_to_light_far_cell() {
        let mimo = default_mimo();
        let cells = [
            CellLoad { distance_km: 0.01, attached_ues: 2 }, // 8 − 2·4 = 0 streams
            CellLoad { distance_km: 0.05, attached_ues: 0 },
        ];
        let pick = mimo.select_cell(&cells).unwrap();
        assert_eq!(pick.index, 1);
        assert_ne!(pick.qos, QoS::minimum());
    }

    #[test]
    fn saturated_winner_disconnects_the_terminal() {
        let mimo = default_mimo();
        let cells = [CellLoad { distance_km: 0.01, attached_ues: 2 }];
        let pick = mimo.select_cell(&cells).unwrap();
        assert_eq!(pick.qos, QoS::minimum());
    }

    #[test]
    fn tie_prefers_the_nearer_cell() {
        let mimo = default_mimo();
        // Both cells inside the flat part of the bitrate window: identical
        // SISO bandwidth, identical streams → the first (nearer) wins.
        let cells = [
            CellLoad { distance_km: 0.0001, attached_ues: 0 },
            CellLoad { distance_km: 0.0002, attached_ues: 0 },
        ];
        assert_eq!(mimo.select_cell(&cells).unwrap().index, 0);
    }

    #[test]
    fn custom_antenna_budget() {
        let params: RadioParams =
            serde_json::from_value(json!({"ru_antennas": 4, "ue_antennas": 4})).unwrap();
        let mimo = Mimo::new(&params);
        let cells = [CellLoad { distance_km: 0.01, attached_ues: 1 }];
        // 4 − 1·4 = 0 streams left.
        assert_eq!(mimo.select_cell(&cells).unwrap().qos, QoS::minimum());
    }
}

#[cfg(test)]
mod kinds {
    use crate::error::WirelessError;
    use crate::model::{parse_radius_km, WirelessKind};

    #[test]
    fn spellings() {
        assert_eq!(WirelessKind::parse("linear_degradation").unwrap(), WirelessKind::Linear);
        assert_eq!(WirelessKind::parse("LinearDegradation").unwrap(), WirelessKind::Linear);
        assert_eq!(WirelessKind::parse("Log2Degradation").unwrap(), WirelessKind::Log2);
        assert_eq!(WirelessKind::parse("log10").unwrap(), WirelessKind::Log10);
        assert_eq!(WirelessKind::parse("step_wise").unwrap(), WirelessKind::Stepwise);
        assert_eq!(WirelessKind::parse("SISO").unwrap(), WirelessKind::Siso);
        assert_eq!(WirelessKind::parse("mimo").unwrap(), WirelessKind::Mimo);
        assert!(matches!(
            WirelessKind::parse("carrier_pigeon"),
            Err(WirelessError::UnknownKind(_))
        ));
    }

    #[test]
    fn radius_strings() {
        assert_eq!(parse_radius_km("5km").unwrap(), 5.0);
        assert_eq!(parse_radius_km("500m").unwrap(), 0.5);
        assert_eq!(parse_radius_km("0.5KM").unwrap(), 0.5);
        assert!(parse_radius_km("5").is_err());
        assert!(parse_radius_km("5miles").is_err());
    }
}
