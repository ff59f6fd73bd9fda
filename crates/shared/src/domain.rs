use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_YEAR: u16 = 2023;

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_newtype!(DistrictId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapMode {
    #[default]
    Population,
    Hotels,
}

impl MapMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Population => "population",
            Self::Hotels => "hotels",
        }
    }
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown map mode '{0}' (expected 'population' or 'hotels')")]
pub struct UnknownMapMode(pub String);

impl FromStr for MapMode {
    type Err = UnknownMapMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "population" => Ok(Self::Population),
            "hotels" => Ok(Self::Hotels),
            other => Err(UnknownMapMode(other.to_string())),
        }
    }
}

/// What the page controls currently ask the map to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub mode: MapMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<DistrictId>,
    pub year: u16,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            mode: MapMode::default(),
            district: None,
            year: DEFAULT_YEAR,
        }
    }
}

impl Selection {
    pub fn population(year: u16) -> Self {
        Self {
            mode: MapMode::Population,
            district: None,
            year,
        }
    }

    pub fn hotels() -> Self {
        Self {
            mode: MapMode::Hotels,
            ..Self::default()
        }
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(DistrictId::new(district));
        self
    }

    /// Sets the district filter from a control value; an empty value means "all districts".
    pub fn set_district_filter(&mut self, raw: &str) {
        let raw = raw.trim();
        self.district = if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(DistrictId::new(raw))
        };
    }
}

/// A WGS84 position in `[lat, lng]` order, the order the map library expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
