use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_wav(dir: &Path, name: &str, value: i16, frames: usize, sample_rate: u32) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..frames {
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn osm() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("osm"))
}

#[test]
fn probe_reports_length() {
    let dir = TempDir::new().unwrap();
    let wav = write_wav(dir.path(), "tone.wav", 1_000, 22_050, 44_100);

    osm()
        .arg("probe")
        .arg(&wav)
        .assert()
        .success()
        .stdout(predicate::str::contains("format: wav"))
        .stdout(predicate::str::contains("frames: 22050"))
        .stdout(predicate::str::contains("seconds: 0.500"));
}

#[test]
fn probe_json_output() {
    let dir = TempDir::new().unwrap();
    let wav = write_wav(dir.path(), "tone.wav", 1_000, 4_410, 44_100);

    let output = osm().args(["probe", "--json"]).arg(&wav).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["frames"], 4_410);
    assert_eq!(report["sample_rate"], 44_100);
}

#[test]
fn streaming_report_shows_retained_bytes() {
    let dir = TempDir::new().unwrap();
    let wav = write_wav(dir.path(), "tone.wav", 1_000, 4_410, 44_100);
    let size = std::fs::metadata(&wav).unwrap().len();

    let output = osm()
        .args(["probe", "--json", "--stream"])
        .arg(&wav)
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mode"], "streaming");
    assert_eq!(report["frames"], 4_410);
    assert_eq!(report["compressed_bytes"], size);

    osm()
        .arg("probe")
        .arg(&wav)
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: decompressed"))
        .stdout(predicate::str::contains("compressed bytes").not());
}

#[test]
fn probe_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "definitely not audio").unwrap();

    osm()
        .arg("probe")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported"));
}

#[test]
fn render_mixes_inputs() {
    let dir = TempDir::new().unwrap();
    let a = write_wav(dir.path(), "a.wav", 4_000, 4_410, 44_100);
    let b = write_wav(dir.path(), "b.wav", 8_000, 8_820, 44_100);
    let out = dir.path().join("mix.wav");

    osm()
        .arg("render")
        .arg(&a)
        .arg(&b)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("8820 frames written"));

    let mut reader = hound::WavReader::open(&out).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(spec.bits_per_sample, 16);

    let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), 8_820 * 2);
    // Both inputs overlap at the start; only the longer one remains later.
    assert!((samples[0] as i32 - 12_000).abs() <= 2);
    assert!((samples[1] as i32 - 12_000).abs() <= 2);
    assert!((samples[6_000 * 2] as i32 - 8_000).abs() <= 2);
}

#[test]
fn render_applies_gain_and_frame_count() {
    let dir = TempDir::new().unwrap();
    let wav = write_wav(dir.path(), "a.wav", 8_000, 44_100, 44_100);
    let out = dir.path().join("half.wav");

    osm()
        .arg("render")
        .arg(&wav)
        .args(["--gain", "50", "--frames", "1000", "--out"])
        .arg(&out)
        .assert()
        .success();

    let mut reader = hound::WavReader::open(&out).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), 2_000);
    assert!((samples[500] as i32 - 4_000).abs() <= 2);
}

#[test]
fn render_pans_hard_left() {
    let dir = TempDir::new().unwrap();
    let wav = write_wav(dir.path(), "a.wav", 8_000, 1_000, 44_100);
    let out = dir.path().join("left.wav");

    osm()
        .arg("render")
        .arg(&wav)
        .args(["--pan", "-1", "--out"])
        .arg(&out)
        .assert()
        .success();

    let mut reader = hound::WavReader::open(&out).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert!((samples[10] as i32 - 8_000).abs() <= 2);
    assert_eq!(samples[11], 0);
}

#[test]
fn create_settings_json_prints_defaults() {
    osm()
        .args(["create", "settings-json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sample_rate\": 44100"))
        .stdout(predicate::str::contains("\"pan_law\": \"linear\""));
}

#[test]
fn missing_input_fails() {
    osm()
        .args(["probe", "/definitely/not/here.wav"])
        .assert()
        .failure();
}
