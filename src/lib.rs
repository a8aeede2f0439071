//! Fernway client core.
//!
//! Client-side engine for a 2D multiplayer canvas game: a layer-sorted scene
//! graph, a sprite animation state machine backed by a trim/scale frame cache,
//! and the movement/collision/camera resolution loop. Rendering backends and
//! network transports plug in through the `render` and `net` contracts.

pub mod assets;
pub mod camera;
pub mod client;
pub mod collision;
pub mod core;
pub mod input;
pub mod level;
pub mod movement;
pub mod net;
pub mod render;
pub mod scene;
pub mod sprites;
pub mod store;
