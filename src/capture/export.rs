use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoFormat};
use crate::encode::gif::{GifSink, GifSinkOpts};
use crate::encode::sink::{FrameSink, Quality, SinkConfig};
use crate::engine::session::Engine;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Output container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// H.264 MP4 through `ffmpeg`.
    #[default]
    Mp4,
    /// VP9 WebM through `ffmpeg`.
    Webm,
    /// Animated GIF.
    Gif,
}

/// What to record.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Output container.
    pub format: ExportFormat,
    /// Encoder quality tier.
    pub quality: Quality,
    /// Capture rate; the engine's when `None`.
    pub fps: Option<Fps>,
    /// Expected width. Must match the surface when given.
    pub width: Option<u32>,
    /// Expected height. Must match the surface when given.
    pub height: Option<u32>,
    /// Seconds of timeline to record; the natural length of a finite timeline when `None`.
    pub duration_secs: Option<f64>,
    /// Wall-clock allowance beyond the duration; the engine's when `None`.
    pub timeout_margin_secs: Option<f64>,
}

/// Progress report delivered after every captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    /// Frames handed to the sink so far.
    pub frame: u64,
    /// Frames the export will produce.
    pub total_frames: u64,
}

impl ExportProgress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            1.0
        } else {
            self.frame as f64 / self.total_frames as f64
        }
    }
}

/// Exclusive right to record an engine's surface.
#[derive(Clone, Debug, Default)]
pub struct CaptureSlot(Arc<AtomicBool>);

impl CaptureSlot {
    /// Free slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot until the returned guard drops.
    pub fn try_acquire(&self) -> KinetypeResult<CaptureGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| KinetypeError::ConcurrentExport)?;
        Ok(CaptureGuard(Arc::clone(&self.0)))
    }

    /// Return `true` while a guard is alive.
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases its [`CaptureSlot`] on drop.
#[derive(Debug)]
pub struct CaptureGuard(Arc<AtomicBool>);

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Build the default sink for `opts.format`.
pub fn sink_for(opts: &ExportOptions) -> Box<dyn FrameSink> {
    let video = |format| -> Box<dyn FrameSink> {
        let mut sink_opts = FfmpegSinkOpts::new(format);
        sink_opts.quality = opts.quality;
        Box::new(FfmpegSink::new(sink_opts))
    };
    match opts.format {
        ExportFormat::Mp4 => video(VideoFormat::Mp4),
        ExportFormat::Webm => video(VideoFormat::Webm),
        ExportFormat::Gif => Box::new(GifSink::new(GifSinkOpts {
            quality: opts.quality,
            ..GifSinkOpts::default()
        })),
    }
}

/// Records an engine's timeline frame by frame into a sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct Exporter;

struct Plan {
    cfg: SinkConfig,
    total_frames: u64,
    budget_secs: f64,
}

impl Exporter {
    /// Record and encode.
    ///
    /// Fails with [`KinetypeError::ConcurrentExport`] while another export holds the engine's
    /// capture slot and with [`KinetypeError::CaptureUnavailable`] when the sink cannot record,
    /// both before any frame is drawn. Playback restarts at `t = 0` and the first frame is drawn
    /// before the sink begins. Each frame advances the timeline by exactly `1/fps`. When the
    /// wall-clock budget (duration plus margin) runs out, the sink is aborted and
    /// [`KinetypeError::ExportTimeout`] is returned. Playhead, rate and play state are restored
    /// afterwards and the restored frame is redrawn.
    #[tracing::instrument(skip_all, fields(format = ?opts.format))]
    pub fn export(
        engine: &mut Engine,
        opts: &ExportOptions,
        sink: &mut dyn FrameSink,
        mut progress: Option<&mut dyn FnMut(ExportProgress)>,
    ) -> KinetypeResult<Vec<u8>> {
        let _guard = engine.capture_slot().try_acquire()?;
        sink.check_available().map_err(|e| match e {
            KinetypeError::CaptureUnavailable(_) => e,
            other => KinetypeError::capture_unavailable(other.to_string()),
        })?;
        let plan = plan(engine, opts)?;

        let saved_playhead = engine.controller().playhead();
        let saved_rate = engine.controller().rate();
        let saved_playing = engine.controller().is_playing();
        engine.controller_mut().set_rate(1.0)?;
        engine.controller_mut().restart();
        engine.controller_mut().play();

        let res = record(engine, &plan, sink, &mut progress);
        if res.is_err() {
            sink.abort();
        }

        let controller = engine.controller_mut();
        controller.set_rate(saved_rate)?;
        if saved_playing {
            controller.play();
        } else {
            controller.pause();
        }
        controller.restore_playhead(saved_playhead);
        let redraw = engine.tick(0.0);

        let frames = res?;
        redraw?;
        let out = sink.take_output()?;
        tracing::debug!(frames, bytes = out.len(), "export finished");
        Ok(out)
    }
}

fn plan(engine: &Engine, opts: &ExportOptions) -> KinetypeResult<Plan> {
    let timeline = engine.controller().timeline().ok_or_else(|| {
        KinetypeError::invalid_operation("nothing to export; apply a preset first")
    })?;
    let fps = match opts.fps {
        Some(fps) => Fps::new(fps.num, fps.den)?,
        None => engine.config().fps,
    };

    let duration = match opts.duration_secs {
        Some(d) if d.is_finite() && d > 0.0 => d,
        Some(d) => {
            return Err(KinetypeError::validation(format!(
                "export duration must be finite and > 0, got {d}"
            )));
        }
        None => timeline.duration_secs().ok_or_else(|| {
            KinetypeError::validation("export of an unbounded timeline needs a duration")
        })?,
    };
    let total_frames = fps.secs_to_frames_round(duration).max(1);

    let size = engine.surface().size();
    if opts.width.is_some_and(|w| w != size.width) || opts.height.is_some_and(|h| h != size.height) {
        return Err(KinetypeError::validation(format!(
            "export size {}x{} does not match the surface {}x{}",
            opts.width.unwrap_or(size.width),
            opts.height.unwrap_or(size.height),
            size.width,
            size.height
        )));
    }

    let margin = opts
        .timeout_margin_secs
        .unwrap_or(engine.config().export_timeout_margin_secs);
    if !margin.is_finite() || margin < 0.0 {
        return Err(KinetypeError::validation(format!(
            "export timeout margin must be finite and >= 0, got {margin}"
        )));
    }

    Ok(Plan {
        cfg: SinkConfig {
            width: size.width,
            height: size.height,
            fps,
        },
        total_frames,
        budget_secs: fps.frames_to_secs(total_frames) + margin,
    })
}

fn record(
    engine: &mut Engine,
    plan: &Plan,
    sink: &mut dyn FrameSink,
    progress: &mut Option<&mut dyn FnMut(ExportProgress)>,
) -> KinetypeResult<u64> {
    let started = Instant::now();
    let dt = plan.cfg.fps.frame_duration_secs();

    engine.tick(0.0)?;
    let first = engine.render_frame()?;
    sink.begin(plan.cfg)?;
    sink.push_frame(FrameIndex(0), &first)?;
    let mut report = |frame| {
        if let Some(cb) = progress.as_mut() {
            cb(ExportProgress {
                frame,
                total_frames: plan.total_frames,
            });
        }
    };
    report(1);

    for i in 1..plan.total_frames {
        let elapsed = started.elapsed().as_secs_f64();
        if elapsed > plan.budget_secs {
            tracing::warn!(elapsed, budget = plan.budget_secs, frames = i, "export timed out");
            return Err(KinetypeError::ExportTimeout {
                elapsed_secs: elapsed,
                budget_secs: plan.budget_secs,
                frames_written: i,
            });
        }
        engine.tick(dt)?;
        let frame = engine.render_frame()?;
        sink.push_frame(FrameIndex(i), &frame)?;
        report(i + 1);
    }

    sink.end()?;
    Ok(plan.total_frames)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/export.rs"]
mod tests;
