pub mod catalogue;
pub mod geometry;
pub mod layers;
pub mod popup;
pub mod river;

pub use catalogue::Catalogue;
pub use geometry::{Geometry, LngLat, coordinates_from_geometry};
pub use layers::VisibleLayers;
pub use popup::{MapPointerEvent, OpenPopup, PickedFeature, PopupManager, PopupMode};
pub use river::{CONTENT_HOST, RiverData, SelectedRiver, geojson_url};
