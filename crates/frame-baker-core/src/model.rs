use serde::{Deserialize, Deserializer, Serialize, de};
use std::str::FromStr;

/// Smallest axis-aligned rectangle (pixels) enclosing every visible pixel of a frame.
/// `x,y` is top-left; `width,height` are inclusive extents and always >= 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
    /// Inclusive right edge coordinate (`x + width - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.width.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + height - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.height.saturating_sub(1)
    }
}

/// Crop rectangle in source pixel space. The origin is signed because anchored
/// placement may start left of / above the source image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
    /// `(left, top, right, bottom)` with exclusive right/bottom edges.
    pub fn corners(&self) -> (i64, i64, i64, i64) {
        (
            self.x,
            self.y,
            self.x + self.width as i64,
            self.y + self.height as i64,
        )
    }
}

/// Uniform crop target shared by every frame of a sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CropPlan {
    pub target_width: u32,
    pub target_height: u32,
}

impl CropPlan {
    /// Per-axis maximum over `boxes`, with each axis replaced by a fixed value when > 0.
    pub fn from_boxes(boxes: &[BoundingBox], fixed_width: u32, fixed_height: u32) -> Self {
        let (mut w, mut h) = (0u32, 0u32);
        for b in boxes {
            w = w.max(b.width);
            h = h.max(b.height);
        }
        if fixed_width > 0 {
            w = fixed_width;
        }
        if fixed_height > 0 {
            h = fixed_height;
        }
        Self {
            target_width: w,
            target_height: h,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }
}

/// One-dimensional placement of a bounding box inside a larger crop target.
/// Deserializes from a name (`start`, `left`, `center`, `end`, ...) or from the
/// legacy tri-state integer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Box touches the left / top edge of the crop.
    Start,
    /// Box is centered; odd leftovers put the extra pixel before the box.
    #[default]
    Center,
    /// Box touches the right / bottom edge of the crop.
    End,
}

impl Anchor {
    /// Crop origin on one axis for a box starting at `pos` with extent `size`,
    /// cropped to `target` pixels.
    pub fn origin(self, pos: u32, size: u32, target: u32) -> i64 {
        let pos = pos as i64;
        let slack = target as i64 - size as i64;
        match self {
            Anchor::Start => pos,
            Anchor::Center => pos - div_ceil_signed(slack, 2),
            Anchor::End => pos - slack,
        }
    }

    /// Legacy tri-state integer (`<= -1`, `0`, `>= 1`).
    pub fn from_tri_state(v: i64) -> Self {
        match v {
            i64::MIN..=-1 => Anchor::Start,
            0 => Anchor::Center,
            _ => Anchor::End,
        }
    }
}

fn div_ceil_signed(n: i64, d: i64) -> i64 {
    let q = n / d;
    if n % d > 0 { q + 1 } else { q }
}

impl<'de> Deserialize<'de> for Anchor {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Name(String),
        }
        match Repr::deserialize(d)? {
            Repr::Int(v) => Ok(Anchor::from_tri_state(v)),
            Repr::Name(s) => s
                .parse()
                .map_err(|_| de::Error::custom(format!("unknown anchor '{s}'"))),
        }
    }
}

impl FromStr for Anchor {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" | "left" | "top" | "-1" => Ok(Self::Start),
            "center" | "middle" | "0" => Ok(Self::Center),
            "end" | "right" | "bottom" | "1" => Ok(Self::End),
            _ => Err(()),
        }
    }
}

/// X/Y anchors plus an optional absolute origin pinning every frame's crop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AnchorPolicy {
    pub x: Anchor,
    pub y: Anchor,
    #[serde(default)]
    pub origin: Option<(u32, u32)>,
}

impl AnchorPolicy {
    pub fn new(x: Anchor, y: Anchor) -> Self {
        Self { x, y, origin: None }
    }

    pub fn with_origin(mut self, origin: Option<(u32, u32)>) -> Self {
        self.origin = origin;
        self
    }

    /// Crop rectangle for a frame with bounding box `bbox` under `plan`.
    pub fn crop_rect(&self, bbox: &BoundingBox, plan: &CropPlan) -> CropRect {
        let (x, y) = match self.origin {
            Some((ox, oy)) => (ox as i64, oy as i64),
            None => (
                self.x.origin(bbox.x, bbox.width, plan.target_width),
                self.y.origin(bbox.y, bbox.height, plan.target_height),
            ),
        };
        CropRect::new(x, y, plan.target_width, plan.target_height)
    }
}

/// Absolute origin from signed settings; any negative component disables it.
/// Components above `u32::MAX` are rejected by [`crate::CropConfig::validate`].
pub fn absolute_origin(x: i64, y: i64) -> Option<(u32, u32)> {
    if x < 0 || y < 0 {
        return None;
    }
    Some((u32::try_from(x).ok()?, u32::try_from(y).ok()?))
}

/// Spritesheet tiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SheetLayout {
    /// One row, frames left to right.
    #[default]
    Linear,
    /// Two rows; consecutive frame pairs share a column.
    Stacked,
}

impl SheetLayout {
    pub fn from_stacked(stacked: bool) -> Self {
        if stacked {
            SheetLayout::Stacked
        } else {
            SheetLayout::Linear
        }
    }

    /// `(columns, rows)` for `count` frames.
    pub fn grid(self, count: u32) -> (u32, u32) {
        match self {
            SheetLayout::Linear => (count, 1),
            SheetLayout::Stacked => (count.div_ceil(2), 2),
        }
    }

    /// Top-left of cell `index` for frames of `frame_w` x `frame_h`, or `None`
    /// when it does not fit in `u32` pixel coordinates.
    pub fn cell_origin(self, index: u32, frame_w: u32, frame_h: u32) -> Option<(u32, u32)> {
        match self {
            SheetLayout::Linear => Some((index.checked_mul(frame_w)?, 0)),
            SheetLayout::Stacked => Some((
                (index / 2).checked_mul(frame_w)?,
                (index % 2).checked_mul(frame_h)?,
            )),
        }
    }
}

impl FromStr for SheetLayout {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "strip" | "row" => Ok(Self::Linear),
            "stacked" | "stack" => Ok(Self::Stacked),
            _ => Err(()),
        }
    }
}

/// Texture class of a packed sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Alpha-preserving, default compression.
    #[default]
    Standard,
    /// Opaque over a key color, uncompressed.
    Uv,
}

impl AssetClass {
    pub fn from_uv(is_uv: bool) -> Self {
        if is_uv {
            AssetClass::Uv
        } else {
            AssetClass::Standard
        }
    }
}

/// A frame placed on a sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetCell {
    /// Source file name of the frame.
    pub key: String,
    pub index: u32,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Description of a packed spritesheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SheetMeta {
    pub app: String,
    pub version: String,
    pub layout: SheetLayout,
    pub asset_class: AssetClass,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: u32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<SheetCell>,
}
