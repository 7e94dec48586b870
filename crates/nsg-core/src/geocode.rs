//! Geocoder service abstraction.
//!
//! Geocoding is the only effectful dependency of the core model, and both
//! directions are pure functions of their input, so results are memoized
//! without bound.  Tests and offline runs inject [`NullGeocoder`] (or a
//! stub) instead of a networked implementation.

use std::sync::Mutex;

use rustc_hash::FxHashMap;

/// Forward and reverse geocoding.
pub trait Geocoder: Send + Sync {
    /// Resolve a free-form place name (country or address) to (lat, lon).
    fn geocode(&self, place: &str) -> Option<(f64, f64)>;

    /// Resolve coordinates to an ISO-ish country code.
    fn reverse_country(&self, lat: f64, lon: f64) -> Option<String>;
}

/// A geocoder that never resolves anything.  The default for offline use.
pub struct NullGeocoder;

impl Geocoder for NullGeocoder {
    fn geocode(&self, _place: &str) -> Option<(f64, f64)> {
        None
    }

    fn reverse_country(&self, _lat: f64, _lon: f64) -> Option<String> {
        None
    }
}

/// Memoizing wrapper around any [`Geocoder`].
///
/// Negative answers are cached too, so a misspelled place name costs one
/// upstream call, not one per query.  The reverse cache is keyed by the
/// formatted coordinate pair.
pub struct CachedGeocoder<G> {
    inner: G,
    forward: Mutex<FxHashMap<String, Option<(f64, f64)>>>,
    reverse: Mutex<FxHashMap<String, Option<String>>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            forward: Mutex::new(FxHashMap::default()),
            reverse: Mutex::new(FxHashMap::default()),
        }
    }

    /// The wrapped geocoder.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    fn geocode(&self, place: &str) -> Option<(f64, f64)> {
        if let Ok(mut memo) = self.forward.lock() {
            if let Some(hit) = memo.get(place) {
                return *hit;
            }
            let resolved = self.inner.geocode(place);
            memo.insert(place.to_string(), resolved);
            resolved
        } else {
            self.inner.geocode(place)
        }
    }

    fn reverse_country(&self, lat: f64, lon: f64) -> Option<String> {
        let key = format!("{lat},{lon}");
        if let Ok(mut memo) = self.reverse.lock() {
            if let Some(hit) = memo.get(&key) {
                return hit.clone();
            }
            let resolved = self.inner.reverse_country(lat, lon);
            memo.insert(key, resolved.clone());
            resolved
        } else {
            self.inner.reverse_country(lat, lon)
        }
    }
}
