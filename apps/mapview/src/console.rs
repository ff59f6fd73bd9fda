use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use client_core::{BoundaryStyle, HeatLayerOptions, HotelMarker, LayerId, MapSurface};
use shared::{
    domain::LatLngBounds,
    protocol::{Boundary, District, PopulationPoint},
};
use tracing::warn;

use crate::config::Settings;

/// Text rendition of the map page: every layer change is printed to stdout.
#[derive(Default)]
pub struct ConsoleSurface {
    next_id: AtomicU64,
    live: Mutex<BTreeMap<LayerId, String>>,
    district_options: Mutex<Vec<District>>,
}

/// A panic while printing must not make the surface forget its layers, so a
/// poisoned lock still hands back the data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ConsoleSurface {
    fn add(&self, description: String) -> LayerId {
        let id = LayerId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        println!("+ layer #{} {description}", id.0);
        lock(&self.live).insert(id, description);
        id
    }

    pub fn live_layers(&self) -> Vec<(LayerId, String)> {
        lock(&self.live)
            .iter()
            .map(|(id, description)| (*id, description.clone()))
            .collect()
    }

    pub fn district_options(&self) -> Vec<District> {
        lock(&self.district_options).clone()
    }
}

impl MapSurface for ConsoleSurface {
    fn add_heat_layer(&self, points: &[PopulationPoint], options: &HeatLayerOptions) -> LayerId {
        let peak = points
            .iter()
            .map(|point| point.intensity)
            .fold(0.0_f64, f64::max);
        self.add(format!(
            "heat: {} points, peak {peak:.1}/{}, radius {} blur {}",
            points.len(),
            options.max_intensity,
            options.radius,
            options.blur
        ))
    }

    fn add_boundary_layer(&self, boundary: &Boundary, style: &BoundaryStyle) -> LayerId {
        self.add(format!(
            "boundary: {} polygon(s), stroke {} weight {}",
            boundary.shape.0.len(),
            style.color,
            style.weight
        ))
    }

    fn add_marker_cluster(&self, markers: &[HotelMarker]) -> LayerId {
        let id = self.add(format!("hotel cluster: {} markers", markers.len()));
        for marker in markers {
            println!(
                "    {} ({}) at {:.5}, {:.5}",
                marker.popup.title, marker.popup.detail, marker.position.lat, marker.position.lng
            );
        }
        id
    }

    fn remove_layer(&self, layer: LayerId) {
        let removed = lock(&self.live).remove(&layer);
        match removed {
            Some(description) => println!("- layer #{} {description}", layer.0),
            None => warn!(layer = layer.0, "console: remove for unknown layer"),
        }
    }

    fn fit_bounds(&self, bounds: LatLngBounds) {
        println!(
            "~ viewport [{:.5}, {:.5}] .. [{:.5}, {:.5}]",
            bounds.south_west.lat, bounds.south_west.lng, bounds.north_east.lat, bounds.north_east.lng
        );
    }

    fn alert(&self, message: &str) {
        eprintln!("!! {message}");
    }

    fn set_district_options(&self, districts: &[District]) {
        *lock(&self.district_options) = districts.to_vec();
        println!("district selector: all + {} district(s)", districts.len());
    }
}

pub fn print_base_map(settings: &Settings) {
    let [lat, lng] = settings.map_center;
    println!(
        "base map: {} (zoom {}, center {lat:.4}, {lng:.4})",
        settings.tile_url, settings.map_zoom
    );
    println!("          {}", settings.tile_attribution);
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
