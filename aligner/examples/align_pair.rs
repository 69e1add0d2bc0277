//! Example: Align Two Photographs From Control Points
//!
//! Reads a YAML job describing a reference image, a target image and four
//! matching control points on each, warps the target onto the reference and
//! writes the result.
//!
//! ```yaml
//! reference: historic.jpg
//! target: modern.jpg
//! output: aligned.png
//! reference_points: [[412, 233], [1610, 250], [1588, 1041], [398, 1020]]
//! target_points: [[380, 301], [1702, 288], [1695, 1150], [371, 1139]]
//! # optional, image space of the aligned result
//! crop: { x: 0, y: 0, w: 1600, h: 1000 }
//! toolkit:
//!   warper: fallback
//! log:
//!   level: debug
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --example align_pair -- /path/to/job.yaml
//! ```

use std::env;
use std::path::{Path, PathBuf};

use aligner::prelude::*;
use anyhow::{bail, Context};
use common::log_setup::{setup_logging, LogConfig};
use glam::DVec2;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Job {
    reference: PathBuf,
    target: PathBuf,
    output: PathBuf,
    reference_points: Vec<DVec2>,
    target_points: Vec<DVec2>,
    #[serde(default)]
    crop: Option<SelectionBox>,
    #[serde(default)]
    toolkit: ToolkitConfig,
    #[serde(default)]
    log: LogConfig,
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <job.yaml>", args[0]);
        std::process::exit(1);
    }

    let job_path = Path::new(&args[1]);
    let job: Job = serde_yml::from_str(
        &std::fs::read_to_string(job_path)
            .with_context(|| format!("Failed to read job file {}", job_path.display()))?,
    )
    .with_context(|| format!("Invalid job file {}", job_path.display()))?;

    setup_logging(&job.log)?;

    let mut toolkit = Toolkit::new(job.toolkit.clone());
    println!("Warper: {}", toolkit.warper_kind());

    for (id, path) in [(PanelId::Left, &job.reference), (PanelId::Right, &job.target)] {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        toolkit
            .load_panel_encoded(id, &bytes)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let size = toolkit.panel(id).dims().image.size();
        println!("Loaded {}: {}x{}", path.display(), size.w, size.h);
    }

    toolkit.set_control_points(PanelId::Left, &job.reference_points)?;
    toolkit.set_control_points(PanelId::Right, &job.target_points)?;
    println!(
        "Control point correlation: reference {:.3}, target {:.3}",
        toolkit.correlation(PanelId::Left),
        toolkit.correlation(PanelId::Right)
    );

    let homography = toolkit
        .request_align(PanelId::Right)
        .context("Alignment failed")?;
    println!("Homography: {homography}");

    if let Some(selection) = &job.crop {
        let size = toolkit.request_crop(PanelId::Right, selection)?;
        println!("Cropped to {}x{}", size.w, size.h);
    }

    for event in toolkit.drain_events() {
        if let ToolkitEvent::Message { panel, message } = event {
            println!("[{panel}] {}: {}", message.kind, message.msg);
        }
    }

    let format = output_format(&job.output)?;
    let bytes = toolkit.request_download(PanelId::Right, format)?;
    std::fs::write(&job.output, bytes)
        .with_context(|| format!("Failed to write {}", job.output.display()))?;
    println!("Saved {}", job.output.display());

    Ok(())
}

fn output_format(path: &Path) -> anyhow::Result<EncodeFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    Ok(match ext.as_deref() {
        Some("png") => EncodeFormat::Png,
        Some("jpg" | "jpeg") => EncodeFormat::Jpeg,
        Some("tif" | "tiff") => EncodeFormat::Tiff,
        other => bail!("Unsupported output extension {other:?}; use png, jpg or tiff"),
    })
}
