//! End-to-end pipeline scenarios over generated WAV fixtures.

use std::f64::consts::TAU;
use std::io::Write;
use std::path::{Path, PathBuf};

use breathscan_core::{
    detect_pauses, process_one_file, BreathscanError, DetectorConfig, Severity, SeverityThresholds,
    WavError, WavReader,
};

const SAMPLE_RATE: u32 = 16_000;

/// Writes a mono 16-bit WAV built from (seconds, amplitude) segments.
/// Zero amplitude emits digital silence; anything else a 440 Hz tone.
fn write_wav(dir: &tempfile::TempDir, name: &str, segments: &[(f64, f64)]) -> PathBuf {
    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create fixture");
    for &(secs, amplitude) in segments {
        let frames = (secs * f64::from(SAMPLE_RATE)).round() as usize;
        for i in 0..frames {
            let value = if amplitude == 0.0 {
                0i16
            } else {
                let phase = TAU * 440.0 * i as f64 / f64::from(SAMPLE_RATE);
                (amplitude * phase.sin() * f64::from(i16::MAX)) as i16
            };
            writer.write_sample(value).expect("write sample");
        }
    }
    writer.finalize().expect("finalize fixture");
    path
}

fn screening_config() -> DetectorConfig {
    DetectorConfig {
        base_threshold: 0.00001,
        thresholds: SeverityThresholds {
            hypopnea_secs: 2.0,
            mild_secs: 4.0,
            moderate_secs: 8.0,
            severe_secs: 12.0,
        },
        ..DetectorConfig::default()
    }
}

#[test]
fn silence_tone_silence_yields_two_graded_pauses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_wav(&dir, "night.wav", &[(10.0, 0.0), (1.0, 0.5), (15.0, 0.0)]);

    let pauses = process_one_file(&path, &screening_config()).expect("process fixture");

    assert_eq!(pauses.len(), 2, "expected exactly two pauses, got {pauses:?}");

    let first = &pauses[0];
    assert_eq!(first.source, "night.wav");
    assert_eq!(first.index, 1);
    assert_eq!(first.start_secs, 0.0);
    assert!(
        (first.end_secs - 10.0).abs() < 0.2,
        "first pause should end near the 10 s mark, ended at {}",
        first.end_secs
    );

    let second = &pauses[1];
    assert_eq!(second.index, 2);
    assert!(
        (second.start_secs - 11.0).abs() < 0.5,
        "second pause should start near the 11 s mark, started at {}",
        second.start_secs
    );
    assert!((second.end_secs - 26.0).abs() < 1e-9);

    // ~14.7 s exceeds the configured severe cutoff of 12 s.
    assert_eq!(second.severity, Severity::SevereApnea);
    assert_eq!(first.severity, Severity::ModerateApnea);
}

#[test]
fn fully_loud_recording_yields_no_pauses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_wav(&dir, "awake.wav", &[(3.0, 0.4)]);

    let pauses = process_one_file(&path, &screening_config()).expect("process fixture");
    assert!(pauses.is_empty(), "got {pauses:?}");
}

#[test]
fn reprocessing_the_same_file_is_deterministic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_wav(&dir, "repeat.wav", &[(5.0, 0.0), (1.0, 0.5), (6.0, 0.0)]);
    let config = screening_config();

    let first = process_one_file(&path, &config).expect("first run");
    let second = process_one_file(&path, &config).expect("second run");
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn decoded_frames_sum_to_declared_frame_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stereo.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create fixture");
    for i in 0..2_000i32 {
        writer.write_sample((i % 3_000) as i16).expect("left");
        writer.write_sample((-i % 3_000) as i16).expect("right");
    }
    writer.finalize().expect("finalize fixture");

    let mut reader = WavReader::open(&path).expect("open fixture");
    assert_eq!(reader.num_frames(), 2_000);

    let mut buffer = vec![0f64; 256 * 2];
    let mut total = 0u64;
    loop {
        let n = reader.read_frames(&mut buffer, 256).expect("decode");
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    assert_eq!(total, 2_000);
    assert_eq!(reader.read_frames(&mut buffer, 256).expect("decode"), 0);
}

#[test]
fn wrong_riff_marker_fails_before_any_frame_is_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("not_audio.wav");
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(b"JUNKDATA definitely not a wave container")
        .expect("write junk");
    drop(file);

    let err = detect_pauses(&path, &DetectorConfig::default()).expect_err("open must fail");
    match err {
        BreathscanError::MalformedContainer { path: p, source } => {
            assert_eq!(p, path);
            assert!(matches!(source, WavError::HeaderMismatch(_)), "got {source:?}");
        }
        other => panic!("expected MalformedContainer, got {other:?}"),
    }
}

#[test]
fn nonexistent_path_yields_empty_list() {
    let pauses = process_one_file(
        Path::new("/definitely/not/here/recording.wav"),
        &DetectorConfig::default(),
    )
    .expect("missing files are skipped");
    assert!(pauses.is_empty());
}
