//! Sequence orchestration: crop (when requested) then pack, one sequence at a time.

use crate::config::{ProjectConfig, SequenceSettings};
use crate::crop::crop_sequence;
use crate::error::{FrameBakeError, Result};
use crate::export::write_json;
use crate::layout::SequenceLayout;
use crate::sheet::pack_sequence;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Options that apply to every sequence of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakeOptions {
    pub alpha_threshold: f64,
    pub metadata: bool,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            alpha_threshold: crate::crop::DEFAULT_ALPHA_THRESHOLD,
            metadata: false,
        }
    }
}

/// Outcome of one baked sequence.
#[derive(Debug, Clone, Serialize)]
pub struct BakeReport {
    pub name: String,
    /// Crop target, or `None` when the crop pass did not run.
    pub crop_size: Option<(u32, u32)>,
    pub frame_count: u32,
    pub sheet_size: (u32, u32),
    pub output: PathBuf,
    pub elapsed: Duration,
}

/// Outcome of a project run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub baked: Vec<BakeReport>,
    /// Sequences that failed, each error tagged with its sequence name.
    pub failed: Vec<FrameBakeError>,
    /// Names of sequences that were disabled or not rendered.
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[instrument(skip_all, fields(sequence = %settings.name))]
/// Crop (unless disabled or a UV sequence) and pack one sequence.
/// Errors carry the sequence name.
pub fn bake_sequence(
    settings: &SequenceSettings,
    layout: &SequenceLayout,
    opts: &BakeOptions,
) -> Result<BakeReport> {
    let started = Instant::now();
    let name = settings.name.as_str();
    let dir = layout.sequence_dir(name);

    let run = || -> Result<BakeReport> {
        let crop_size = if settings.wants_crop() {
            let cfg = settings.crop_config(opts.alpha_threshold);
            Some(crop_sequence(&dir, &cfg)?)
        } else {
            None
        };

        let output = layout.result_path(name);
        let meta = pack_sequence(&dir, &settings.sheet_config(), &output)?;
        if opts.metadata {
            write_json(&meta, &layout.metadata_path(name))?;
        }

        Ok(BakeReport {
            name: name.to_string(),
            crop_size,
            frame_count: meta.frame_count,
            sheet_size: (meta.width, meta.height),
            output,
            elapsed: started.elapsed(),
        })
    };

    let report = run().map_err(|e| e.in_sequence(name))?;
    info!(
        crop = ?report.crop_size,
        secs = report.elapsed.as_secs_f64(),
        "sequence baked"
    );
    Ok(report)
}

/// Bake every active sequence of `project` in declaration order.
///
/// Stops at the first failure unless `keep_going` is set. With the `parallel`
/// feature and `parallel: true`, sequences run concurrently; results keep
/// declaration order.
pub fn bake_project(project: &ProjectConfig) -> Result<BatchReport> {
    bake_project_with(project, |_, _| {})
}

#[instrument(skip_all, fields(sequences = project.sequences.len()))]
/// Like [`bake_project`], calling `on_sequence` with each sequence's outcome as
/// soon as it finishes. In parallel runs the callback fires from worker threads
/// in completion order.
pub fn bake_project_with<F>(project: &ProjectConfig, on_sequence: F) -> Result<BatchReport>
where
    F: Fn(&SequenceSettings, &Result<BakeReport>) + Sync,
{
    project.validate()?;
    let layout = SequenceLayout::new(&project.render_root, &project.textures_dir);
    let opts = BakeOptions {
        alpha_threshold: project.alpha_threshold,
        metadata: project.metadata,
    };

    let mut report = BatchReport::default();
    let mut active: Vec<&SequenceSettings> = Vec::new();
    for s in &project.sequences {
        if s.is_active() {
            active.push(s);
        } else {
            report.skipped.push(s.name.clone());
        }
    }

    let started = Instant::now();
    let results = run_all(&active, &layout, &opts, project, &on_sequence);
    for r in results {
        match r {
            Ok(b) => report.baked.push(b),
            Err(e) => {
                if !project.keep_going {
                    return Err(e);
                }
                warn!(error = %e, "sequence failed");
                report.failed.push(e);
            }
        }
    }

    info!(
        baked = report.baked.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        secs = started.elapsed().as_secs_f64(),
        "done"
    );
    Ok(report)
}

fn run_all<F>(
    active: &[&SequenceSettings],
    layout: &SequenceLayout,
    opts: &BakeOptions,
    project: &ProjectConfig,
    on_sequence: &F,
) -> Vec<Result<BakeReport>>
where
    F: Fn(&SequenceSettings, &Result<BakeReport>) + Sync,
{
    let bake_one = |s: &SequenceSettings| {
        let r = bake_sequence(s, layout, opts);
        on_sequence(s, &r);
        r
    };

    #[cfg(feature = "parallel")]
    {
        if project.parallel {
            return active.par_iter().map(|s| bake_one(*s)).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        if project.parallel {
            warn!("parallel requested but the `parallel` feature is disabled; running sequentially");
        }
    }

    let mut out = Vec::with_capacity(active.len());
    for s in active {
        let r = bake_one(*s);
        let failed = r.is_err();
        out.push(r);
        if failed && !project.keep_going {
            break;
        }
    }
    out
}
