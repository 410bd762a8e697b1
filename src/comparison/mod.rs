pub mod controller;
pub mod divider;
pub mod drag;
pub mod handle;
pub mod surface;
pub mod sync;

pub use controller::{ComparisonController, GeometryProvider};
pub use divider::{ClipRegion, DividerPosition, MixLevels};
pub use drag::{ClickOrigin, ContainerBounds, ListenerScope, PointerTarget};
pub use handle::ComparisonHandle;
pub use surface::{MediaSurface, SurfaceRole};
