use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{MapMode, Selection},
    protocol::{Boundary, District, Hotel, PopulationPoint},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    error::FetchError,
    layers::LayerSet,
    source::MapDataSource,
    style::{BoundaryStyle, HeatLayerOptions, MarkerStyle},
    surface::{HotelMarker, MapSurface},
};

/// Issued once per `refresh`; a larger value always means a newer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer refresh was issued before this one could finish; nothing from
    /// this call was committed after that point.
    Superseded,
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to load {} data: {source}", .mode.as_str())]
    PrimaryData {
        mode: MapMode,
        #[source]
        source: FetchError,
    },
}

enum OverlayData {
    Population(Vec<PopulationPoint>),
    Hotels(Vec<Hotel>),
}

pub fn alert_message(mode: MapMode) -> &'static str {
    match mode {
        MapMode::Population => "Failed to load population data. Please try again later.",
        MapMode::Hotels => "Failed to load hotel data. Please try again later.",
    }
}

/// Keeps the layers on a [`MapSurface`] in step with the page's [`Selection`].
pub struct ViewSynchronizer {
    source: Arc<dyn MapDataSource>,
    surface: Arc<dyn MapSurface>,
    heat_options: HeatLayerOptions,
    boundary_style: BoundaryStyle,
    marker_style: MarkerStyle,
    layers: Mutex<LayerSet>,
    latest_token: AtomicU64,
}

impl ViewSynchronizer {
    pub fn new(source: Arc<dyn MapDataSource>, surface: Arc<dyn MapSurface>) -> Self {
        Self {
            source,
            surface,
            heat_options: HeatLayerOptions::default(),
            boundary_style: BoundaryStyle::default(),
            marker_style: MarkerStyle::default(),
            layers: Mutex::new(LayerSet::default()),
            latest_token: AtomicU64::new(0),
        }
    }

    pub async fn layers(&self) -> LayerSet {
        self.layers.lock().await.clone()
    }

    pub fn latest_token(&self) -> RefreshToken {
        RefreshToken(self.latest_token.load(Ordering::SeqCst))
    }

    fn issue_token(&self) -> RefreshToken {
        RefreshToken(self.latest_token.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn is_current(&self, token: RefreshToken) -> bool {
        self.latest_token() == token
    }

    fn superseded(&self, token: RefreshToken, stage: &'static str) -> RefreshOutcome {
        debug!(
            token = token.0,
            latest = self.latest_token().0,
            stage,
            "view: dropping superseded refresh"
        );
        RefreshOutcome::Superseded
    }

    /// Fetches and populates the district selector. Failures are logged and
    /// leave the selector empty.
    pub async fn load_district_options(&self) -> Vec<District> {
        match self.source.districts().await {
            Ok(districts) => {
                info!(count = districts.len(), "view: district options loaded");
                self.surface.set_district_options(&districts);
                districts
            }
            Err(err) => {
                error!(error = %err, "view: failed to load district options");
                Vec::new()
            }
        }
    }

    /// Brings the surface in line with `selection`: drops the old mode layer,
    /// swaps the district boundary, then renders the mode overlay. Fetches run
    /// one after another. Only the most recently issued refresh may commit.
    pub async fn refresh(&self, selection: &Selection) -> Result<RefreshOutcome, RefreshError> {
        let token = self.issue_token();
        info!(
            token = token.0,
            mode = %selection.mode,
            year = selection.year,
            district = selection.district.as_ref().map(|d| d.as_str()),
            "view: refresh"
        );

        {
            let mut layers = self.layers.lock().await;
            if !self.is_current(token) {
                return Ok(self.superseded(token, "clear_overlay"));
            }
            layers.clear_overlay(self.surface.as_ref());
        }

        let boundary = match &selection.district {
            Some(district) => match self.source.boundary(district).await {
                Ok(Some(boundary)) => Some(boundary),
                Ok(None) => {
                    warn!(%district, "view: district boundary not found");
                    None
                }
                Err(err) => {
                    warn!(%district, error = %err, "view: district boundary unavailable");
                    None
                }
            },
            None => None,
        };
        if self.commit_boundary(token, boundary.as_ref()).await == RefreshOutcome::Superseded {
            return Ok(RefreshOutcome::Superseded);
        }

        let fetched = match selection.mode {
            MapMode::Population => self
                .source
                .population(selection.year, selection.district.as_ref())
                .await
                .map(OverlayData::Population),
            MapMode::Hotels => self.source.hotels().await.map(OverlayData::Hotels),
        };

        let mut layers = self.layers.lock().await;
        if !self.is_current(token) {
            return Ok(self.superseded(token, "overlay"));
        }
        match fetched {
            Ok(OverlayData::Population(points)) => {
                let handle =
                    layers.show_heat(self.surface.as_ref(), &points, &self.heat_options);
                info!(
                    token = token.0,
                    layer = handle.id.0,
                    points = points.len(),
                    "view: heat layer shown"
                );
            }
            Ok(OverlayData::Hotels(hotels)) => {
                let markers: Vec<HotelMarker> = hotels
                    .iter()
                    .map(|hotel| HotelMarker::new(hotel, self.marker_style))
                    .collect();
                let handle = layers.show_hotels(self.surface.as_ref(), &markers);
                info!(
                    token = token.0,
                    layer = handle.id.0,
                    hotels = markers.len(),
                    "view: hotel cluster shown"
                );
            }
            Err(source) => {
                drop(layers);
                error!(
                    token = token.0,
                    mode = %selection.mode,
                    error = %source,
                    "view: failed to load map data"
                );
                self.surface.alert(alert_message(selection.mode));
                return Err(RefreshError::PrimaryData {
                    mode: selection.mode,
                    source,
                });
            }
        }

        Ok(RefreshOutcome::Applied)
    }

    async fn commit_boundary(
        &self,
        token: RefreshToken,
        boundary: Option<&Boundary>,
    ) -> RefreshOutcome {
        let mut layers = self.layers.lock().await;
        if !self.is_current(token) {
            return self.superseded(token, "boundary");
        }
        match boundary {
            Some(boundary) => {
                let handle =
                    layers.show_boundary(self.surface.as_ref(), boundary, &self.boundary_style);
                self.surface.fit_bounds(boundary.bounds);
                debug!(token = token.0, layer = handle.id.0, "view: boundary shown");
            }
            None => layers.clear_boundary(self.surface.as_ref()),
        }
        RefreshOutcome::Applied
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
