use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::encode::sink::{FrameSink, Quality, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::foundation::math::flatten_premul_over_bg_to_opaque_rgba8;
use crate::render::backend::FrameRGBA;

/// Container/codec pair produced by [`FfmpegSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoFormat {
    /// H.264 in MP4.
    Mp4,
    /// VP9 in WebM.
    Webm,
}

impl VideoFormat {
    fn muxer(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    fn codec_args(self, crf: u8) -> Vec<String> {
        let codec: &[&str] = match self {
            Self::Mp4 => &["-c:v", "libx264", "-pix_fmt", "yuv420p"],
            Self::Webm => &["-c:v", "libvpx-vp9", "-pix_fmt", "yuv420p", "-b:v", "0"],
        };
        let mut args: Vec<String> = codec.iter().map(|s| (*s).to_owned()).collect();
        args.push("-crf".to_owned());
        args.push(crf.to_string());
        if self == Self::Mp4 {
            args.push("-movflags".to_owned());
            args.push("+faststart".to_owned());
        }
        args
    }
}

/// Constant rate factor for a quality tier (lower is better).
pub fn crf_for(quality: Quality) -> u8 {
    match quality {
        Quality::Low => 32,
        Quality::Medium => 26,
        Quality::High => 20,
        Quality::Ultra => 16,
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output format.
    pub format: VideoFormat,
    /// Quality tier.
    pub quality: Quality,
    /// Output file. `None` encodes into a temporary file that is read back and removed.
    pub out_path: Option<PathBuf>,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Options for in-memory output in `format`.
    pub fn new(format: VideoFormat) -> Self {
        Self {
            format,
            quality: Quality::default(),
            out_path: None,
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Also keep the encoded file at `path`.
    pub fn with_out_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_path = Some(path.into());
        self
    }
}

/// Removes a temporary file when dropped.
#[derive(Debug)]
struct TempFile(PathBuf);

impl TempFile {
    fn new(ext: &str) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let name = format!("kinetype-{}-{n}.{ext}", std::process::id());
        Self(std::env::temp_dir().join(name))
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    temp: Option<TempFile>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    output: Vec<u8>,
}

impl std::fmt::Debug for FfmpegSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSink")
            .field("opts", &self.opts)
            .field("running", &self.child.is_some())
            .field("last_idx", &self.last_idx)
            .finish()
    }
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            temp: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            output: Vec::new(),
        }
    }

    fn target_path(&self) -> Option<&Path> {
        self.opts
            .out_path
            .as_deref()
            .or_else(|| self.temp.as_ref().map(|t| t.0.as_path()))
    }

    fn join_stderr(&mut self) -> KinetypeResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| KinetypeError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| KinetypeError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

impl FrameSink for FfmpegSink {
    fn check_available(&self) -> KinetypeResult<()> {
        if is_ffmpeg_on_path() {
            Ok(())
        } else {
            Err(KinetypeError::capture_unavailable(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ))
        }
    }

    fn begin(&mut self, cfg: SinkConfig) -> KinetypeResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(KinetypeError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(KinetypeError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(KinetypeError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        if let Some(out) = &self.opts.out_path {
            ensure_parent_dir(out)?;
            if !self.opts.overwrite && out.exists() {
                return Err(KinetypeError::validation(format!(
                    "output file '{}' already exists",
                    out.display()
                )));
            }
        } else {
            self.temp = Some(TempFile::new(self.opts.format.muxer()));
        }
        let target = self
            .target_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| KinetypeError::encode("ffmpeg sink has no output path"))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite || self.opts.out_path.is_none() {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: raw RGBA8 frames. `ffmpeg` does not understand premul, so alpha is flattened
        // before writing to stdin.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);
        cmd.args(self.opts.format.codec_args(crf_for(self.opts.quality)));
        cmd.args(["-f", self.opts.format.muxer()]);
        cmd.arg(&target);

        let mut child = cmd.spawn().map_err(|e| {
            KinetypeError::capture_unavailable(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| KinetypeError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| KinetypeError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(format = ?self.opts.format, target = %target.display(), "ffmpeg started");
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.output.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| KinetypeError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(KinetypeError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(KinetypeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(KinetypeError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(KinetypeError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            KinetypeError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> KinetypeResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| KinetypeError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            KinetypeError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = self.join_stderr()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            self.temp = None;
            return Err(KinetypeError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        if let Some(path) = self.target_path().map(Path::to_path_buf) {
            use anyhow::Context as _;
            self.output = std::fs::read(&path)
                .with_context(|| format!("read encoded output '{}'", path.display()))?;
        }
        self.temp = None;
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.join_stderr();
        self.temp = None;
        self.cfg = None;
        tracing::debug!("ffmpeg sink aborted");
    }

    fn take_output(&mut self) -> KinetypeResult<Vec<u8>> {
        Ok(std::mem::take(&mut self.output))
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate, as `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> KinetypeResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
