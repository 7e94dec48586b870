//! Unit tests for nsg-core primitives.

#[cfg(test)]
mod qos {
    use serde_json::json;

    use crate::error::QoSError;
    use crate::qos::QoS;

    fn sample() -> QoS {
        QoS::parse(&json!({
            "latency": {"delay": "3.0ms", "deviation": "1.0ms"},
            "bandwidth": "10.0mbps",
            "error_rate": "1.0%",
        }))
        .unwrap()
    }

    #[test]
    fn parse_rejects_unknown_channel() {
        let err = QoS::parse(&json!({"test": "test"})).unwrap_err();
        assert!(matches!(err, QoSError::UnknownChannel(key) if key == "test"));
    }

    #[test]
    fn parse_rejects_non_object() {
        assert!(matches!(QoS::parse(&json!(42)), Err(QoSError::NotAnObject)));
    }

    #[test]
    fn parse_accepts_bare_numbers() {
        let qos = QoS::parse(&json!({
            "latency": {"delay": 5, "deviation": 2},
            "bandwidth": 10,
            "error_rate": 1,
        }))
        .unwrap();
        assert_eq!(qos.delay(), 5.0);
        assert_eq!(qos.deviation(), 2.0);
        assert_eq!(qos.bandwidth(), 10.0);
        assert_eq!(qos.error_rate(), 1.0);
    }

    #[test]
    fn parse_rejects_garbage_values() {
        assert!(QoS::parse(&json!({"latency": {"delay": "nothing"}})).is_err());
        assert!(QoS::parse(&json!({"bandwidth": "nothing"})).is_err());
        assert!(QoS::parse(&json!({"error_rate": "nothing"})).is_err());
        assert!(QoS::parse(&json!({"bandwidth": true})).is_err());
    }

    #[test]
    fn parse_flags_wrong_unit() {
        let err = QoS::parse(&json!({"bandwidth": "10kbps"})).unwrap_err();
        assert!(matches!(err, QoSError::InvalidUnit { channel: "bandwidth", .. }));
    }

    #[test]
    fn bandwidth_suffix_folds_case_but_delay_does_not() {
        let qos = QoS::parse(&json!({"bandwidth": "10.0MBPS"})).unwrap();
        assert_eq!(qos.bandwidth(), 10.0);
        let err = QoS::parse(&json!({"latency": {"delay": "5MS"}})).unwrap_err();
        assert!(matches!(err, QoSError::InvalidUnit { channel: "delay", .. }));
    }

    #[test]
    fn accessor_defaults() {
        let empty = QoS::new();
        assert_eq!(empty.delay(), 0.0);
        assert_eq!(empty.deviation(), 0.0);
        assert_eq!(empty.bandwidth(), 1_000_000.0);
        assert_eq!(empty.error_rate(), 0.0);
    }

    #[test]
    fn suffixed_values_round_trip() {
        let qos = sample();
        assert_eq!(qos.delay(), 3.0);
        assert_eq!(qos.deviation(), 1.0);
        assert_eq!(qos.bandwidth(), 10.0);
        assert_eq!(qos.error_rate(), 1.0);
    }

    #[test]
    fn error_rate_saturates_on_read() {
        let mut qos = QoS::new();
        qos.set_error_rate(150.0);
        assert_eq!(qos.error_rate(), 100.0);
    }

    #[test]
    fn merge_of_empties_keeps_defaults() {
        let merged = QoS::new().merge(&QoS::new());
        assert_eq!(merged.delay(), 0.0);
        assert_eq!(merged.deviation(), 0.0);
        assert_eq!(merged.bandwidth(), 1_000_000.0);
        assert_eq!(merged.error_rate(), 0.0);
    }

    #[test]
    fn merge_adds_latency_and_takes_min_bandwidth() {
        let a = sample();
        let b = QoS::parse(&json!({
            "latency": {"delay": "2.0ms", "deviation": "2.0ms"},
            "bandwidth": "5.0mbps",
            "error_rate": "3.0%",
        }))
        .unwrap();
        let merged = a.merge(&b);
        assert_eq!(merged.delay(), 5.0);
        assert_eq!(merged.deviation(), 3.0);
        assert_eq!(merged.bandwidth(), 5.0);
        assert_eq!(merged.error_rate(), 4.0);
    }

    #[test]
    fn merge_is_commutative_and_associative() {
        let a = sample();
        let mut b = QoS::new();
        b.set_delay(7.5);
        b.set_bandwidth(2.0);
        let mut c = QoS::new();
        c.set_deviation(0.25);
        c.set_error_rate(40.0);

        assert_eq!(a.merge(&b), b.merge(&a));
        assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
    }

    #[test]
    fn merge_sum_is_not_clamped_in_storage() {
        let mut a = QoS::new();
        a.set_error_rate(60.0);
        let merged = a.merge(&a);
        // Read saturates, but the stored sum survives structural equality.
        assert_eq!(merged.error_rate(), 100.0);
        let mut expected = QoS::new();
        expected.set_error_rate(120.0);
        expected.set_delay(0.0);
        expected.set_deviation(0.0);
        expected.set_bandwidth(1_000_000.0);
        assert_eq!(merged, expected);
    }

    #[test]
    fn structural_equality() {
        assert_eq!(sample(), sample());
        assert_ne!(sample(), QoS::minimum());
        // Unset and explicitly-zero channels are distinct values.
        let mut zeroed = QoS::new();
        zeroed.set_delay(0.0);
        assert_ne!(zeroed, QoS::new());
    }
}

#[cfg(test)]
mod wire {
    use serde_json::json;

    use crate::qos::QoS;

    #[test]
    fn formatted_minimum() {
        let wire = serde_json::to_value(QoS::minimum().formatted()).unwrap();
        assert_eq!(
            wire,
            json!({
                "latency": {"delay": "1000000.0ms", "deviation": "1000000.0ms"},
                "bandwidth": "0.0mbps",
                "error_rate": "100.0%",
            })
        );
    }

    #[test]
    fn formatted_round_trips_suffixes() {
        let qos = QoS::parse(&json!({
            "latency": {"delay": "3.0ms", "deviation": "1.0ms"},
            "bandwidth": "10.0mbps",
            "error_rate": "1.0%",
        }))
        .unwrap();
        let wire = serde_json::to_value(qos.formatted()).unwrap();
        assert_eq!(
            wire,
            json!({
                "latency": {"delay": "3.0ms", "deviation": "1.0ms"},
                "bandwidth": "10.0mbps",
                "error_rate": "1.0%",
            })
        );
    }

    #[test]
    fn bidirectional_halves_three_channels() {
        let wire = serde_json::to_value(QoS::minimum().formatted_bidirectional()).unwrap();
        assert_eq!(
            wire,
            json!({
                "latency": {"delay": "500000.0ms", "deviation": "500000.0ms"},
                "bandwidth": "0.0mbps",
                "error_rate": "50.0%",
            })
        );
    }

    #[test]
    fn bidirectional_omits_zero_channels() {
        let mut qos = QoS::new();
        qos.set_bandwidth(42.0);
        let wire = serde_json::to_value(qos.formatted_bidirectional()).unwrap();
        assert_eq!(wire, json!({"bandwidth": "42.0mbps"}));
    }

    #[test]
    fn halving_keeps_full_precision() {
        let mut qos = QoS::new();
        qos.set_delay(0.05);
        let wire = qos.formatted_bidirectional();
        assert_eq!(wire.latency.unwrap().delay.unwrap(), "0.025ms");
    }
}

#[cfg(test)]
mod geo {
    use crate::error::LocationError;
    use crate::geo::Location;

    #[test]
    fn zero_distance() {
        let p = Location::new(35.16, 33.36).unwrap();
        assert!(p.distance_km(&p) < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Location::new(30.0, -88.0).unwrap();
        let b = Location::new(31.0, -88.0).unwrap();
        let d = a.distance_km(&b);
        // ~111 km; the geocentric chord sits within 1 % of the arc here.
        assert!((d - 111.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn altitude_changes_distance() {
        let ground = Location::new(35.0, 33.0).unwrap();
        let tower = Location::with_alt(35.0, 33.0, Some(100.0)).unwrap();
        let d = ground.distance_km(&tower);
        assert!((d - 0.1).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn coordinate_ranges_are_enforced() {
        assert!(matches!(
            Location::new(91.0, 0.0),
            Err(LocationError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Location::new(0.0, -181.0),
            Err(LocationError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn unspecified_altitude_equals_zero() {
        let implicit = Location::new(33.0, 40.0).unwrap();
        let explicit = Location::with_alt(33.0, 40.0, Some(0.0)).unwrap();
        assert_eq!(implicit, explicit);
        assert_eq!(implicit.alt_m(), 0.0);
    }
}

#[cfg(test)]
mod geocode {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::geo::Location;
    use crate::geocode::{CachedGeocoder, Geocoder, NullGeocoder};

    /// Counts upstream calls so memoization is observable.
    #[derive(Default)]
    struct StubGeocoder {
        forward_calls: AtomicUsize,
        reverse_calls: AtomicUsize,
    }

    impl Geocoder for StubGeocoder {
        fn geocode(&self, place: &str) -> Option<(f64, f64)> {
            self.forward_calls.fetch_add(1, Ordering::SeqCst);
            (place == "Cyprus").then_some((35.16, 33.36))
        }

        fn reverse_country(&self, _lat: f64, _lon: f64) -> Option<String> {
            self.reverse_calls.fetch_add(1, Ordering::SeqCst);
            Some("cy".to_string())
        }
    }

    #[test]
    fn forward_lookups_are_memoized() {
        let cached = CachedGeocoder::new(StubGeocoder::default());
        for _ in 0..3 {
            assert_eq!(cached.geocode("Cyprus"), Some((35.16, 33.36)));
        }
        assert_eq!(cached.inner_forward_calls(), 1);
    }

    #[test]
    fn negative_answers_are_memoized_too() {
        let cached = CachedGeocoder::new(StubGeocoder::default());
        assert_eq!(cached.geocode("Atlantis"), None);
        assert_eq!(cached.geocode("Atlantis"), None);
        assert_eq!(cached.inner_forward_calls(), 1);
    }

    #[test]
    fn reverse_lookups_are_memoized() {
        let cached = CachedGeocoder::new(StubGeocoder::default());
        let mut loc = Location::new(35.16, 33.36).unwrap();
        loc.fill_country(&cached);
        assert_eq!(loc.country.as_deref(), Some("CY"));
        let mut again = Location::new(35.16, 33.36).unwrap();
        again.fill_country(&cached);
        assert_eq!(cached.inner_reverse_calls(), 1);
    }

    #[test]
    fn from_place_reports_failures() {
        let err = Location::from_place("Atlantis", &NullGeocoder).unwrap_err();
        assert!(matches!(err, crate::error::LocationError::GeocodeFailed(_)));
    }

    impl CachedGeocoder<StubGeocoder> {
        fn inner_forward_calls(&self) -> usize {
            self.inner().forward_calls.load(Ordering::SeqCst)
        }

        fn inner_reverse_calls(&self) -> usize {
            self.inner().reverse_calls.load(Ordering::SeqCst)
        }
    }
}
