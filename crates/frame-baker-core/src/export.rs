use crate::error::Result;
use crate::model::SheetMeta;
use serde_json::{Value, json};
use std::path::Path;

/// Serialize a sheet description as `{ frames: [...], meta: {...} }`.
/// Frame entries use the `frame: {x, y, w, h}` shape common to engine importers.
pub fn to_json(meta: &SheetMeta) -> Value {
    let frames: Vec<Value> = meta
        .cells
        .iter()
        .map(|c| {
            json!({
                "key": c.key,
                "index": c.index,
                "frame": {"x": c.x, "y": c.y, "w": c.w, "h": c.h},
            })
        })
        .collect();
    json!({
        "frames": frames,
        "meta": {
            "app": meta.app,
            "version": meta.version,
            "layout": meta.layout,
            "assetClass": meta.asset_class,
            "frameSize": {"w": meta.frame_width, "h": meta.frame_height},
            "frameCount": meta.frame_count,
            "size": {"w": meta.width, "h": meta.height},
        }
    })
}

/// Write [`to_json`] output, pretty-printed, to `path`.
pub fn write_json(meta: &SheetMeta, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(&to_json(meta))
        .map_err(|e| crate::error::FrameBakeError::Io(e.into()))?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}
