use crate::crop::DEFAULT_ALPHA_THRESHOLD;
use crate::error::{FrameBakeError, Result};
use crate::model::{Anchor, AnchorPolicy, AssetClass, SheetLayout, absolute_origin};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Crop configuration for one sequence.
/// Key notes:
///   - `fixed_width` / `fixed_height` of 0 derive the size from frame content
///   - `origin_x` / `origin_y` pin every frame's crop origin when both are >= 0
///     (negative values disable the pin and fall back to the anchors)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CropConfig {
    /// Fixed crop width in pixels (0 = widest bounding box).
    pub fixed_width: u32,
    /// Fixed crop height in pixels (0 = tallest bounding box).
    pub fixed_height: u32,
    pub anchor_x: Anchor,
    pub anchor_y: Anchor,
    /// Absolute crop origin X (negative = disabled).
    pub origin_x: i64,
    /// Absolute crop origin Y (negative = disabled).
    pub origin_y: i64,
    /// Normalized alpha at or below which a pixel is treated as transparent.
    pub alpha_threshold: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            fixed_width: 0,
            fixed_height: 0,
            anchor_x: Anchor::Center,
            anchor_y: Anchor::Center,
            origin_x: -1,
            origin_y: -1,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

impl CropConfig {
    pub fn anchor_policy(&self) -> AnchorPolicy {
        AnchorPolicy::new(self.anchor_x, self.anchor_y)
            .with_origin(absolute_origin(self.origin_x, self.origin_y))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.alpha_threshold) {
            return Err(FrameBakeError::InvalidConfig(format!(
                "alpha_threshold must be in [0, 1), got {}",
                self.alpha_threshold
            )));
        }
        for (axis, v) in [("origin_x", self.origin_x), ("origin_y", self.origin_y)] {
            if v > u32::MAX as i64 {
                return Err(FrameBakeError::InvalidConfig(format!(
                    "{axis} must be at most {}, got {v}",
                    u32::MAX
                )));
            }
        }
        Ok(())
    }

    /// Create a fluent builder for `CropConfig`.
    pub fn builder() -> CropConfigBuilder {
        CropConfigBuilder::new()
    }
}

/// Builder for `CropConfig`.
#[derive(Debug, Default, Clone)]
pub struct CropConfigBuilder {
    cfg: CropConfig,
}

impl CropConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: CropConfig::default(),
        }
    }
    pub fn fixed_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.fixed_width = w;
        self.cfg.fixed_height = h;
        self
    }
    pub fn fixed_width(mut self, v: u32) -> Self {
        self.cfg.fixed_width = v;
        self
    }
    pub fn fixed_height(mut self, v: u32) -> Self {
        self.cfg.fixed_height = v;
        self
    }
    pub fn anchor(mut self, x: Anchor, y: Anchor) -> Self {
        self.cfg.anchor_x = x;
        self.cfg.anchor_y = y;
        self
    }
    pub fn origin(mut self, x: i64, y: i64) -> Self {
        self.cfg.origin_x = x;
        self.cfg.origin_y = y;
        self
    }
    pub fn alpha_threshold(mut self, v: f64) -> Self {
        self.cfg.alpha_threshold = v;
        self
    }
    pub fn build(self) -> CropConfig {
        self.cfg
    }
}

/// Spritesheet configuration for one sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SheetConfig {
    pub layout: SheetLayout,
    pub asset_class: AssetClass,
}

impl SheetConfig {
    pub fn new(stacked: bool, is_uv: bool) -> Self {
        Self {
            layout: SheetLayout::from_stacked(stacked),
            asset_class: AssetClass::from_uv(is_uv),
        }
    }
}

/// Per-sequence settings as supplied by the render driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SequenceSettings {
    /// Human-readable layer name; the directory and output names derive from it.
    pub name: String,
    pub enabled: bool,
    pub renders: bool,
    /// Run the crop pass before packing (never applied to UV sequences).
    pub crop: bool,
    pub crop_x: i64,
    pub crop_y: i64,
    pub crop_width: u32,
    pub crop_height: u32,
    pub crop_align_x: Anchor,
    pub crop_align_y: Anchor,
    pub stack_frames: bool,
    pub is_uv: bool,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            renders: true,
            crop: false,
            crop_x: -1,
            crop_y: -1,
            crop_width: 0,
            crop_height: 0,
            crop_align_x: Anchor::Center,
            crop_align_y: Anchor::Center,
            stack_frames: false,
            is_uv: false,
        }
    }
}

impl SequenceSettings {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether the orchestrator processes this sequence at all.
    pub fn is_active(&self) -> bool {
        self.enabled && self.renders
    }

    /// Whether the crop pass runs for this sequence.
    pub fn wants_crop(&self) -> bool {
        self.crop && !self.is_uv
    }

    pub fn crop_config(&self, alpha_threshold: f64) -> CropConfig {
        CropConfig {
            fixed_width: self.crop_width,
            fixed_height: self.crop_height,
            anchor_x: self.crop_align_x,
            anchor_y: self.crop_align_y,
            origin_x: self.crop_x,
            origin_y: self.crop_y,
            alpha_threshold,
        }
    }

    pub fn sheet_config(&self) -> SheetConfig {
        SheetConfig::new(self.stack_frames, self.is_uv)
    }
}

/// A batch of sequences sharing one directory layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory holding one rendered sub-directory per sequence.
    pub render_root: PathBuf,
    /// Destination directory for finished sheets.
    pub textures_dir: PathBuf,
    /// Continue with remaining sequences after a failure.
    pub keep_going: bool,
    /// Process sequences concurrently (requires feature "parallel").
    pub parallel: bool,
    /// Also write a JSON description next to each sheet.
    pub metadata: bool,
    pub alpha_threshold: f64,
    pub sequences: Vec<SequenceSettings>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            render_root: PathBuf::from("out"),
            textures_dir: PathBuf::from("textures"),
            keep_going: false,
            parallel: false,
            metadata: false,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            sequences: Vec::new(),
        }
    }
}

impl ProjectConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|e| FrameBakeError::InvalidConfig(e.to_string()))
    }

    /// Load a YAML project file. Relative directories resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml_str(&text)?;
        if let Some(base) = path.parent() {
            if cfg.render_root.is_relative() {
                cfg.render_root = base.join(&cfg.render_root);
            }
            if cfg.textures_dir.is_relative() {
                cfg.textures_dir = base.join(&cfg.textures_dir);
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let defaults = CropConfig {
            alpha_threshold: self.alpha_threshold,
            ..Default::default()
        };
        defaults.validate()?;
        let mut seen = std::collections::HashSet::new();
        for s in &self.sequences {
            if s.name.trim().is_empty() {
                return Err(FrameBakeError::InvalidConfig(
                    "sequence name must not be empty".into(),
                ));
            }
            if !seen.insert(crate::layout::slug(&s.name)) {
                return Err(FrameBakeError::InvalidConfig(format!(
                    "sequence '{}' maps to the same directory as an earlier sequence",
                    s.name
                )));
            }
            s.crop_config(self.alpha_threshold)
                .validate()
                .map_err(|e| e.in_sequence(&s.name))?;
        }
        Ok(())
    }
}
