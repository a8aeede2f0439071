//! Sprite configuration, frame slicing, and the animation state machine.

pub mod config;
pub mod director;
pub mod slicer;

pub use config::{AnimationRow, SheetConfig, SpriteConfig, SpriteLibrary};
pub use director::{AnimationDirector, AnimationState, FrameRequest};
pub use slicer::FrameCache;
