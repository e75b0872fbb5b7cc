//! Directory conventions shared by the crop and pack passes.

use std::path::{Path, PathBuf};

/// Directory/file slug for a layer name: lowercase words joined by `-`.
///
/// Splits on single spaces, so `"Fire  Ball"` becomes `"fire--ball"`.
pub fn slug(name: &str) -> String {
    name.split(' ')
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Where rendered frames are read from and where finished sheets go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceLayout {
    pub render_root: PathBuf,
    pub textures_dir: PathBuf,
}

impl SequenceLayout {
    pub fn new(render_root: impl Into<PathBuf>, textures_dir: impl Into<PathBuf>) -> Self {
        Self {
            render_root: render_root.into(),
            textures_dir: textures_dir.into(),
        }
    }

    /// `<render_root>/<slug>` holding one file per frame.
    pub fn sequence_dir(&self, name: &str) -> PathBuf {
        self.render_root.join(slug(name))
    }

    /// `<textures_dir>/<slug>.png`.
    pub fn result_path(&self, name: &str) -> PathBuf {
        result_path_in(&self.textures_dir, name)
    }

    /// `<textures_dir>/<slug>.json`.
    pub fn metadata_path(&self, name: &str) -> PathBuf {
        self.result_path(name).with_extension("json")
    }
}

pub fn result_path_in(textures_dir: &Path, name: &str) -> PathBuf {
    textures_dir.join(format!("{}.png", slug(name)))
}
