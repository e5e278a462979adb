//! Domain model: buffers, patch geometry, pick resolution and display layers.
//!
//! Nothing here draws. Widgets read `Inspector::layers()` and upload what
//! changed.

pub mod color_image;
pub mod inspector;
pub mod inspector_events;
pub mod layers;
pub mod metaimage;
pub mod nn_field;
pub mod overlay;
pub mod pick;
pub mod region;

pub use color_image::ColorImage;
pub use inspector::{Direction, HoverInfo, Inspector};
pub use layers::{DisplayLayers, LayerKind};
pub use nn_field::{NnField, ScalarPlane};
pub use overlay::RgbaBuffer;
pub use pick::{Interpretation, PickRejection, PickResult};
pub use region::{Point, Region};
