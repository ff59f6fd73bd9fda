use shared::{
    domain::{LatLng, LatLngBounds},
    protocol::{Boundary, District, Hotel, PopulationPoint},
};

use crate::style::{BoundaryStyle, HeatLayerOptions, MarkerStyle};

/// Identifier a surface hands out for each layer it renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPopup {
    pub title: String,
    pub detail: String,
}

impl MarkerPopup {
    pub fn html(&self) -> String {
        format!(
            "<b>{}</b><br>{}",
            escape_html(&self.title),
            escape_html(&self.detail)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotelMarker {
    pub position: LatLng,
    pub popup: MarkerPopup,
    pub style: MarkerStyle,
}

impl HotelMarker {
    pub fn new(hotel: &Hotel, style: MarkerStyle) -> Self {
        Self {
            position: hotel.location,
            popup: MarkerPopup {
                title: hotel.name.clone(),
                detail: hotel.district.clone(),
            },
            style,
        }
    }
}

/// The rendering side of the map page: layers, viewport and the page controls
/// the synchronizer talks to.
pub trait MapSurface: Send + Sync {
    fn add_heat_layer(&self, points: &[PopulationPoint], options: &HeatLayerOptions) -> LayerId;
    fn add_boundary_layer(&self, boundary: &Boundary, style: &BoundaryStyle) -> LayerId;
    /// Markers are added to one clustering group, rendered as a single layer.
    fn add_marker_cluster(&self, markers: &[HotelMarker]) -> LayerId;
    fn remove_layer(&self, layer: LayerId);
    fn fit_bounds(&self, bounds: LatLngBounds);
    /// Blocking, user-visible notification.
    fn alert(&self, message: &str);
    fn set_district_options(&self, districts: &[District]);
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
