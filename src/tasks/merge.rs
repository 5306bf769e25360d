use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use image::RgbaImage;
use tracing::{debug, error, info};

use crate::config::Configuration;
use crate::decode::{SlotStatus, decode_image, inspect_slot};
use crate::error::{MergeError, Slot};
use crate::export::{Encoder, JpegExporter, output_file_name, write_output};
use crate::processing::compose::{PaintOptions, paint};
use crate::processing::layout::{A3_PORTRAIT, CanvasSize, SplitLayout, vertical_split};

/// The files currently chosen for each slot.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    top: Option<PathBuf>,
    bottom: Option<PathBuf>,
}

impl Selection {
    pub fn new(top: Option<PathBuf>, bottom: Option<PathBuf>) -> Self {
        Self { top, bottom }
    }

    pub fn set(&mut self, slot: Slot, path: Option<PathBuf>) {
        match slot {
            Slot::Top => self.top = path,
            Slot::Bottom => self.bottom = path,
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&Path> {
        match slot {
            Slot::Top => self.top.as_deref(),
            Slot::Bottom => self.bottom.as_deref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.top.is_some() && self.bottom.is_some()
    }

    fn require(&self, slot: Slot) -> Result<PathBuf, MergeError> {
        self.get(slot)
            .map(Path::to_path_buf)
            .ok_or(MergeError::MissingSelection { slot })
    }

    pub fn status(&self, slot: Slot) -> SlotStatus {
        inspect_slot(self.get(slot))
    }
}

/// Enabled state of the merge control.
///
/// Disabled while a merge runs; otherwise follows the selection.
#[derive(Debug, Default)]
pub struct MergeTrigger {
    in_flight: bool,
}

impl MergeTrigger {
    pub fn is_enabled(&self, selection: &Selection) -> bool {
        !self.in_flight && selection.is_complete()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Both decoded bitmaps for a single merge attempt.
#[derive(Debug)]
pub struct MergeContext {
    pub top: RgbaImage,
    pub bottom: RgbaImage,
}

impl MergeContext {
    /// Decodes both slots concurrently; the first failure aborts the pair.
    pub async fn load(selection: &Selection) -> Result<Self, MergeError> {
        let top_path = selection.require(Slot::Top)?;
        let bottom_path = selection.require(Slot::Bottom)?;
        let (top, bottom) = tokio::try_join!(
            decode_image(Slot::Top, top_path),
            decode_image(Slot::Bottom, bottom_path),
        )?;
        Ok(Self { top, bottom })
    }

    pub fn layout(&self, canvas: CanvasSize) -> SplitLayout {
        vertical_split(canvas, self.top.dimensions(), self.bottom.dimensions())
    }
}

/// Status line shown around a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStatus {
    Merging,
    Done(PathBuf),
    Failed(&'static str),
}

impl MergeStatus {
    pub fn message(&self) -> String {
        match self {
            MergeStatus::Merging => "Merging... please wait a moment.".to_string(),
            MergeStatus::Done(path) => {
                format!("Merge complete! Saved the A3 portrait JPEG to {}.", path.display())
            }
            MergeStatus::Failed(msg) => (*msg).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub path: PathBuf,
    pub layout: SplitLayout,
    pub bytes: usize,
}

pub struct Merger<E = JpegExporter> {
    canvas: CanvasSize,
    paint: PaintOptions,
    encoder: Arc<E>,
    output_dir: PathBuf,
    file_prefix: String,
}

impl Merger<JpegExporter> {
    pub fn from_config(cfg: &Configuration) -> Self {
        Self {
            canvas: A3_PORTRAIT,
            paint: PaintOptions {
                background: cfg.background,
                filter: cfg.resize_filter,
            },
            encoder: Arc::new(JpegExporter {
                quality: cfg.encoder_quality(),
            }),
            output_dir: cfg.output_dir.clone(),
            file_prefix: cfg.file_prefix.clone(),
        }
    }
}

impl<E: Encoder> Merger<E> {
    pub fn with_encoder<F: Encoder>(self, encoder: F) -> Merger<F> {
        Merger {
            canvas: self.canvas,
            paint: self.paint,
            encoder: Arc::new(encoder),
            output_dir: self.output_dir,
            file_prefix: self.file_prefix,
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Decode, lay out, paint, encode, write.
    pub async fn merge(&self, selection: &Selection) -> Result<MergeOutcome, MergeError> {
        let ctx = MergeContext::load(selection).await?;
        let layout = ctx.layout(self.canvas);
        debug!(?layout, "computed split layout");

        let paint_opts = self.paint;
        let encoder = Arc::clone(&self.encoder);
        let bytes = tokio::task::spawn_blocking(move || {
            let canvas = paint(&layout, &ctx.top, &ctx.bottom, paint_opts)?;
            drop(ctx);
            encoder.encode(&canvas)
        })
        .await??;

        let name = output_file_name(
            &self.file_prefix,
            Local::now().naive_local(),
            self.encoder.extension(),
        );
        let path = write_output(&self.output_dir, &name, &bytes).await?;
        Ok(MergeOutcome {
            path,
            layout,
            bytes: bytes.len(),
        })
    }
}

/// Runs one merge behind the trigger control and reports the final status.
pub async fn run<E: Encoder>(
    merger: &Merger<E>,
    selection: &Selection,
    trigger: &mut MergeTrigger,
) -> (MergeStatus, Result<MergeOutcome, MergeError>) {
    if let Some(slot) = Slot::ALL
        .into_iter()
        .find(|slot| selection.get(*slot).is_none())
    {
        let err = MergeError::MissingSelection { slot };
        return (MergeStatus::Failed(err.user_message()), Err(err));
    }

    trigger.in_flight = true;
    info!("{}", MergeStatus::Merging.message());
    let result = merger.merge(selection).await;
    trigger.in_flight = false;

    let status = match &result {
        Ok(outcome) => {
            info!(
                bytes = outcome.bytes,
                top = ?outcome.layout.top,
                bottom = ?outcome.layout.bottom,
                "merge finished"
            );
            MergeStatus::Done(outcome.path.clone())
        }
        Err(err) => {
            error!(?err, "merge failed");
            MergeStatus::Failed(err.user_message())
        }
    };
    (status, result)
}
