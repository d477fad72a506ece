use super::*;

#[test]
fn crf_falls_as_quality_rises() {
    let crfs: Vec<u8> = [Quality::Low, Quality::Medium, Quality::High, Quality::Ultra]
        .into_iter()
        .map(crf_for)
        .collect();
    assert!(crfs.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn codec_args_match_the_container() {
    let mp4 = VideoFormat::Mp4.codec_args(20);
    assert!(mp4.iter().any(|a| a == "libx264"));
    assert!(mp4.iter().any(|a| a == "yuv420p"));
    assert!(mp4.windows(2).any(|w| w[0] == "-crf" && w[1] == "20"));

    let webm = VideoFormat::Webm.codec_args(32);
    assert!(webm.iter().any(|a| a == "libvpx-vp9"));
    assert!(!webm.iter().any(|a| a == "+faststart"));
}

#[test]
fn availability_follows_path_lookup() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new(VideoFormat::Mp4));
    let available = sink.check_available();
    if is_ffmpeg_on_path() {
        assert!(available.is_ok());
    } else {
        assert!(matches!(
            available,
            Err(KinetypeError::CaptureUnavailable(_))
        ));
    }
}

#[test]
fn odd_sizes_are_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(VideoFormat::Webm));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 2,
            fps: Fps::default(),
        })
        .unwrap_err();
    assert!(matches!(err, KinetypeError::Validation(_)));
    assert!(sink.child.is_none());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(VideoFormat::Mp4));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

#[test]
fn temp_file_is_removed_on_drop() {
    let temp = TempFile::new("mp4");
    std::fs::write(&temp.0, b"x").unwrap();
    let path = temp.0.clone();
    assert!(path.exists());
    drop(temp);
    assert!(!path.exists());
}
