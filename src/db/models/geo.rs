use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees. Construction validates the
/// geographic range; rows with out-of-range coordinates are treated as
/// having no location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
        {
            Some(Self { latitude, longitude })
        } else {
            None
        }
    }

    /// Builds a point from nullable storage columns, discarding anything
    /// outside the valid range.
    pub fn from_columns(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::new(lat, lon),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -181.0).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
        assert!(GeoPoint::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn partial_columns_yield_no_point() {
        assert!(GeoPoint::from_columns(Some(25.2), None).is_none());
        assert!(GeoPoint::from_columns(None, None).is_none());
        assert_eq!(
            GeoPoint::from_columns(Some(25.2), Some(55.3)),
            GeoPoint::new(25.2, 55.3)
        );
    }
}
