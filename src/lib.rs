//! spriteswap - Replace the subject of animated sprites while keeping badges
//!
//! This library provides functionality to:
//! - Decode GIF, APNG and still images into normalized frame sets
//! - Find the main subject and small badge overlays in a template frame
//! - Composite replacement artwork into the subject slot, growing the canvas
//!   instead of shrinking the replacement
//! - Encode the result as an animated GIF, alone or in parallel batches
//!
//! ```ignore
//! let result = spriteswap::composite(&template_bytes, &replacement_bytes)?;
//! std::fs::write("out.gif", &result.output_bytes)?;
//! println!("scale {:.2}x", result.geometry.scale_factor);
//! ```

pub mod batch;
pub mod classify;
pub mod cli;
pub mod composite;
pub mod config;
pub mod encode;
pub mod error;
pub mod frames;
pub mod geometry;
pub mod output;
pub mod pipeline;
pub mod regions;
pub mod resample;
pub mod thresholds;

pub use composite::CompositionGeometry;
pub use error::{CompositeError, Result};
pub use frames::{Disposal, Frame, FrameSet};
pub use geometry::BBox;
pub use pipeline::{composite, composite_with, CompositionResult};
pub use thresholds::Thresholds;
