//! ARF avatar export pipeline.
//!
//! Turns a normalized [`scene::SceneDescription`] into an Avatar
//! Representation Format container: per-component GLB assets, skin weight
//! tensors, deduplicated textures, the `arf.json` manifest and its
//! AnimationLinks table.

pub mod animlink;
pub mod container;
pub mod dedup;
pub mod error;
pub mod export;
pub mod glb;
pub mod ids;
pub mod lod;
pub mod logging;
pub mod manifest;
pub mod scene;
pub mod settings;
pub mod tensor;
pub mod texture;
pub mod transform;

pub use error::{ErrorClass, ExportError};
pub use export::{ExportOptions, ExportReport, Exporter, export_scene, export_to_file};
pub use logging::{LogLevel, ResultExt, init_logging, send_log};
