use shared::protocol::{Boundary, PopulationPoint};

use crate::{
    style::{BoundaryStyle, HeatLayerOptions},
    surface::{HotelMarker, LayerId, MapSurface},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Heat,
    Boundary,
    HotelCluster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerHandle {
    pub id: LayerId,
    pub kind: LayerKind,
}

/// Layers currently on the map: at most one boundary and one mode overlay
/// (heat layer or hotel cluster). The `show_*` and `clear_*` methods are the
/// only way to change it, and each removes the old layer before adding a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSet {
    boundary: Option<LayerHandle>,
    overlay: Option<LayerHandle>,
}

impl LayerSet {
    pub fn boundary(&self) -> Option<LayerHandle> {
        self.boundary
    }

    pub fn overlay(&self) -> Option<LayerHandle> {
        self.overlay
    }

    pub fn handles(&self) -> impl Iterator<Item = LayerHandle> + '_ {
        self.boundary.iter().chain(self.overlay.iter()).copied()
    }

    pub fn count(&self, kind: LayerKind) -> usize {
        self.handles().filter(|handle| handle.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.boundary.is_none() && self.overlay.is_none()
    }

    pub(crate) fn clear_boundary<S: MapSurface + ?Sized>(&mut self, surface: &S) {
        if let Some(handle) = self.boundary.take() {
            surface.remove_layer(handle.id);
        }
    }

    pub(crate) fn clear_overlay<S: MapSurface + ?Sized>(&mut self, surface: &S) {
        if let Some(handle) = self.overlay.take() {
            surface.remove_layer(handle.id);
        }
    }

    pub(crate) fn show_boundary<S: MapSurface + ?Sized>(
        &mut self,
        surface: &S,
        boundary: &Boundary,
        style: &BoundaryStyle,
    ) -> LayerHandle {
        self.clear_boundary(surface);
        let handle = LayerHandle {
            id: surface.add_boundary_layer(boundary, style),
            kind: LayerKind::Boundary,
        };
        self.boundary = Some(handle);
        handle
    }

    pub(crate) fn show_heat<S: MapSurface + ?Sized>(
        &mut self,
        surface: &S,
        points: &[PopulationPoint],
        options: &HeatLayerOptions,
    ) -> LayerHandle {
        self.clear_overlay(surface);
        let handle = LayerHandle {
            id: surface.add_heat_layer(points, options),
            kind: LayerKind::Heat,
        };
        self.overlay = Some(handle);
        handle
    }

    pub(crate) fn show_hotels<S: MapSurface + ?Sized>(
        &mut self,
        surface: &S,
        markers: &[HotelMarker],
    ) -> LayerHandle {
        self.clear_overlay(surface);
        let handle = LayerHandle {
            id: surface.add_marker_cluster(markers),
            kind: LayerKind::HotelCluster,
        };
        self.overlay = Some(handle);
        handle
    }
}
