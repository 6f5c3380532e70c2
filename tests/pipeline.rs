use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    process::Command as Process,
};

use pendulum_anim::{
    cli::{Args, Command},
    core::config::{render::RenderOptions, Config},
    pipeline::run,
    vis::video::EncodeError,
};

const COMMON_PATH: &str = "tests/end_to_end";

fn output(name: &str) -> PathBuf {
    let folder = Path::new(COMMON_PATH);
    fs::create_dir_all(folder).unwrap();
    let path = folder.join(name);
    if path.is_file() {
        fs::remove_file(&path).unwrap();
    }
    path
}

fn config_from_cli(arguments: &[&str], dpi: u32) -> Config {
    let Ok(Command::Run(args)) = Args::parse_from(arguments.iter().copied()) else {
        panic!("arguments should parse: {arguments:?}");
    };
    let mut config = args.into_config();
    config.render = RenderOptions {
        dpi,
        ..RenderOptions::default()
    };
    config
}

#[test_log::test]
fn one_second_gif_has_100_frames_at_100_fps() {
    let path = output("one_second.gif");
    let out = path.to_string_lossy().into_owned();
    let config = config_from_cli(&["-t", "1", "-f", "9.8", "-o", &out], 20);

    let summary = run(&config).unwrap();

    assert_eq!(summary.frames, 100);
    assert_eq!(summary.resolution, (128, 96));

    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(File::open(&path).unwrap()).unwrap();
    assert_eq!((decoder.width(), decoder.height()), (128, 96));

    let mut frames = 0;
    let mut first = None;
    let mut last = None;
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        assert_eq!(frame.delay, 1);
        if first.is_none() {
            first = Some(frame.buffer.to_vec());
        }
        last = Some(frame.buffer.to_vec());
        frames += 1;
    }
    assert_eq!(frames, 100);
    // Released from rest at -pi/2, the bob has moved by the last frame.
    assert_ne!(first, last);
}

#[test]
fn frames_are_black_on_white() {
    let path = output("colors.gif");
    let out = path.to_string_lossy().into_owned();
    let config = config_from_cli(&["--time=1", "--freq=9.8", "--len=2", "--out", &out], 20);

    run(&config).unwrap();

    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(File::open(&path).unwrap()).unwrap();
    let frame = decoder.read_next_frame().unwrap().unwrap();
    assert!(frame.buffer.contains(&255));
    assert!(frame.buffer.contains(&0));
}

#[test]
fn zero_duration_is_rejected_before_writing() {
    let path = output("zero.gif");
    let out = path.to_string_lossy().into_owned();
    let config = config_from_cli(&["-t", "0", "-f", "9.8", "-o", &out], 20);

    let error = run(&config).unwrap_err();

    assert!(matches!(
        error.downcast_ref::<EncodeError>(),
        Some(EncodeError::NoFrames)
    ));
    assert!(!path.exists());
}

#[test]
fn unknown_extension_is_rejected_before_writing() {
    let path = output("pendulum.txt");
    let out = path.to_string_lossy().into_owned();
    let config = config_from_cli(&["-t", "1", "-f", "9.8", "-o", &out], 20);

    let error = run(&config).unwrap_err();

    assert!(matches!(
        error.downcast_ref::<EncodeError>(),
        Some(EncodeError::UnsupportedContainer { .. })
    ));
    assert!(!path.exists());
}

/// Decoded frame count and frame rate of the first video stream.
fn video_stream_info(path: &Path) -> (usize, String) {
    let output = Process::new("ffprobe")
        .args(["-v", "error", "-select_streams", "v:0", "-count_frames"])
        .args(["-show_entries", "stream=nb_read_frames,r_frame_rate"])
        .args(["-of", "default=noprint_wrappers=1"])
        .arg(path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let value = |key: &str| {
        text.lines()
            .find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
            .unwrap()
            .trim()
            .to_string()
    };
    (value("nb_read_frames").parse().unwrap(), value("r_frame_rate"))
}

#[test]
#[ignore = "needs ffmpeg with libx264"]
fn default_mp4_has_one_frame_per_sample_at_100_fps() {
    let path = output("pendulum.mp4");
    let out = path.to_string_lossy().into_owned();
    let config = config_from_cli(&["-t", "1", "-f", "9.8", "-o", &out], 20);

    let summary = run(&config).unwrap();

    assert_eq!(summary.frames, 100);
    assert_eq!(video_stream_info(&path), (100, "100/1".to_string()));
}

#[test]
#[ignore = "needs ffmpeg with libvpx-vp9"]
fn webm_has_one_frame_per_sample_at_100_fps() {
    let path = output("pendulum.webm");
    let out = path.to_string_lossy().into_owned();
    let config = config_from_cli(&["-t", "1", "-f", "9.8", "-o", &out], 20);

    run(&config).unwrap();

    assert_eq!(video_stream_info(&path), (100, "100/1".to_string()));
}
