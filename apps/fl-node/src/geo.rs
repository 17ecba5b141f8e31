//! Simulated geolocation sampler.
//!
//! Nodes carry no GPS; positions are sampled uniformly inside a fixed
//! bounding box along the PL–UA border and rounded to six decimals.
//! Injected into the capture loop so tests can pin the box.

use rand::Rng;

#[derive(Debug, Clone)]
pub struct GeoSampler {
    pub lat_range: (f64, f64),
    pub lon_range: (f64, f64),
}

impl Default for GeoSampler {
    fn default() -> Self {
        Self {
            lat_range: (49.0, 52.0),
            lon_range: (22.0, 25.0),
        }
    }
}

impl GeoSampler {
    pub fn sample(&self) -> (f64, f64) {
        let mut rng = rand::thread_rng();
        let lat = rng.gen_range(self.lat_range.0..self.lat_range.1);
        let lon = rng.gen_range(self.lon_range.0..self.lon_range.1);
        (round6(lat), round6(lon))
    }

    /// Sampled position in the wire form `"<lat>,<lon>"`.
    pub fn sample_location(&self) -> String {
        let (lat, lon) = self.sample();
        format!("{lat},{lon}")
    }
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}
