pub mod error;
pub mod layers;
pub mod source;
pub mod style;
pub mod surface;
pub mod sync;

pub use error::FetchError;
pub use layers::{LayerHandle, LayerKind, LayerSet};
pub use source::{HttpDataSource, MapDataSource};
pub use style::{BoundaryStyle, GradientStop, HeatLayerOptions, MarkerStyle};
pub use surface::{HotelMarker, LayerId, MapSurface, MarkerPopup};
pub use sync::{alert_message, RefreshError, RefreshOutcome, RefreshToken, ViewSynchronizer};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
