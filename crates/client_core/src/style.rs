//! Fixed visual parameters handed to the map surface. They serialize with the
//! option names the browser map library takes (`fillOpacity`, `maxZoom`, ...).

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    pub threshold: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatLayerOptions {
    pub radius: u32,
    pub blur: u32,
    pub max_zoom: u8,
    #[serde(rename = "max")]
    pub max_intensity: f64,
    #[serde(serialize_with = "gradient_as_map")]
    pub gradient: Vec<GradientStop>,
}

/// Heat gradients are objects keyed by threshold: `{"0.4": "blue", ...}`.
fn gradient_as_map<S: Serializer>(stops: &[GradientStop], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(stops.iter().map(|stop| (stop.threshold.to_string(), stop.color)))
}

impl Default for HeatLayerOptions {
    fn default() -> Self {
        Self {
            radius: 25,
            blur: 15,
            max_zoom: 17,
            max_intensity: 100.0,
            gradient: vec![
                GradientStop {
                    threshold: 0.4,
                    color: "blue",
                },
                GradientStop {
                    threshold: 0.6,
                    color: "cyan",
                },
                GradientStop {
                    threshold: 0.7,
                    color: "lime",
                },
                GradientStop {
                    threshold: 0.8,
                    color: "yellow",
                },
                GradientStop {
                    threshold: 1.0,
                    color: "red",
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryStyle {
    pub color: &'static str,
    pub weight: u32,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl Default for BoundaryStyle {
    fn default() -> Self {
        Self {
            color: "#ff7800",
            weight: 2,
            opacity: 0.7,
            fill_opacity: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: u32,
    pub fill_color: &'static str,
    pub color: &'static str,
    pub weight: u32,
    pub fill_opacity: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 8,
            fill_color: "#e63946",
            color: "#ffffff",
            weight: 1,
            fill_opacity: 0.9,
        }
    }
}
