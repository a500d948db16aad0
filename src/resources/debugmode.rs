//! Debug toggle resource.
//!
//! The mere presence of this resource indicates that debug rendering should be
//! enabled. Remove it to disable the anchor markers.

use bevy_ecs::prelude::Resource;

/// Marker resource: when present, the render pass draws anchor crosses.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct DebugMode {}
