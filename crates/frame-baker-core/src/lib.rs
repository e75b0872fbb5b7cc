//! Core library for turning rendered animation frames into game-ready textures.
//!
//! - Crop: per-frame opaque bounding boxes, one shared target size per sequence, anchored placement
//! - Sheet: linear or 2-row stacked spritesheets, optional opaque "UV" flattening over a key color
//! - Bake: runs crop then pack over a directory layout, one sequence at a time
//!
//! Quick example:
//! ```ignore
//! use std::path::Path;
//! use frame_baker_core::{CropConfig, SheetConfig, crop_sequence, pack_sequence};
//! # fn main() -> anyhow::Result<()> {
//! let dir = Path::new("out/fire-impact");
//! let (w, h) = crop_sequence(dir, &CropConfig::default())?;
//! let meta = pack_sequence(dir, &SheetConfig::new(true, false), Path::new("textures/fire-impact.png"))?;
//! println!("cropped to {w}x{h}, sheet {}x{}", meta.width, meta.height);
//! # Ok(()) }
//! ```

pub mod bake;
pub mod compositing;
pub mod config;
pub mod crop;
pub mod encode;
pub mod error;
pub mod export;
pub mod frames;
pub mod layout;
pub mod model;
pub mod sheet;

pub use bake::*;
pub use config::*;
pub use crop::*;
pub use error::*;
pub use export::*;
pub use frames::*;
pub use layout::*;
pub use model::*;
pub use sheet::*;

/// Convenience prelude for common types and functions.
/// Importing `frame_baker_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::bake::{BakeOptions, BakeReport, BatchReport, bake_project, bake_project_with, bake_sequence};
    pub use crate::config::{CropConfig, CropConfigBuilder, ProjectConfig, SequenceSettings, SheetConfig};
    pub use crate::crop::{crop_sequence, frame_bounding_box, plan_crop};
    pub use crate::error::{FrameBakeError, Result};
    pub use crate::frames::{Frame, FrameBuffer, load_sequence};
    pub use crate::layout::{SequenceLayout, slug};
    pub use crate::model::{Anchor, AnchorPolicy, AssetClass, BoundingBox, CropPlan, CropRect, SheetLayout, SheetMeta};
    pub use crate::sheet::{PackedSheet, pack_frames, pack_sequence};
}
