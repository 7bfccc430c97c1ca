//! End-to-end batch tests over real WAV files on disk.

use std::path::Path;

use hush_core::{
    batch::{run_batch, BatchConfig, FileOutcome},
    engine::ReductionParams,
    suppress::SpectralGate,
};

fn write_wav(path: &Path, interleaved: &[i16], channels: u16, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in interleaved {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn read_wav(path: &Path) -> Vec<i16> {
    let mut reader = hound::WavReader::open(path).unwrap();
    reader.samples::<i16>().map(|s| s.unwrap()).collect()
}

/// A loud ramp that survives the spectral gate's short-chunk RMS check.
fn loud_ramp(len: usize) -> Vec<i16> {
    (0..len).map(|i| ((i % 20_000) as i16).wrapping_sub(10_000)).collect()
}

#[test]
fn batch_cleans_valid_files_and_isolates_the_bad_one() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let left = loud_ramp(44_100);
    write_wav(&input_dir.path().join("mono.wav"), &left, 1, 44_100);

    // Stereo: right channel is garbage that must be discarded by the downmix
    let interleaved: Vec<i16> = left
        .iter()
        .flat_map(|&l| [l, l.wrapping_neg()])
        .collect();
    write_wav(&input_dir.path().join("stereo.wav"), &interleaved, 2, 44_100);

    // Not an mp3 at all — must fail without stopping the batch
    std::fs::write(input_dir.path().join("broken.mp3"), b"not audio").unwrap();

    // Not audio — must be skipped entirely
    std::fs::write(input_dir.path().join("notes.txt"), b"readme").unwrap();

    let config = BatchConfig {
        // aggressiveness 0 keeps gated content untouched, so valid outputs
        // must match their inputs sample for sample
        params: ReductionParams {
            chunk_count: 100,
            aggressiveness: 0.0,
        },
        ..Default::default()
    };
    let gate = SpectralGate::new();
    let summary = run_batch(input_dir.path(), output_dir.path(), &config, &gate).unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.outcomes.len(), 3);
    assert!(summary.has_failures());

    match &summary.outcomes[0] {
        FileOutcome::Failure { input, .. } => {
            assert!(input.ends_with("broken.mp3"));
        }
        other => panic!("expected broken.mp3 first, got {other:?}"),
    }

    let mono_out = read_wav(&output_dir.path().join("cleaned_mono.wav"));
    assert_eq!(mono_out, left);

    // Channel 0 selected, inverted right channel discarded
    let stereo_out = read_wav(&output_dir.path().join("cleaned_stereo.wav"));
    assert_eq!(stereo_out, left);

    // No scratch files survive the run
    let leftovers: Vec<_> = std::fs::read_dir(output_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 2, "unexpected files: {leftovers:?}");
}

#[test]
fn parallel_workers_produce_the_same_outputs() {
    let input_dir = tempfile::tempdir().unwrap();
    let seq_dir = tempfile::tempdir().unwrap();
    let par_dir = tempfile::tempdir().unwrap();

    for i in 0..4 {
        write_wav(
            &input_dir.path().join(format!("clip{i}.wav")),
            &loud_ramp(22_050 + i * 997),
            1,
            22_050,
        );
    }

    let gate = SpectralGate::new();
    let sequential = BatchConfig::default();
    let parallel = BatchConfig {
        workers: 3,
        ..Default::default()
    };

    let seq = run_batch(input_dir.path(), seq_dir.path(), &sequential, &gate).unwrap();
    let par = run_batch(input_dir.path(), par_dir.path(), &parallel, &gate).unwrap();

    assert_eq!(seq.succeeded, 4);
    assert_eq!(par.succeeded, 4);
    assert!(!par.has_failures());

    for i in 0..4 {
        let name = format!("cleaned_clip{i}.wav");
        let a = read_wav(&seq_dir.path().join(&name));
        let b = read_wav(&par_dir.path().join(&name));
        assert_eq!(a, b, "{name}");
        assert_eq!(a.len(), 22_050 + i * 997, "{name} sample count");
    }
}

#[test]
fn too_short_file_is_reported_not_fatal() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    // 50 samples cannot be split into 100 chunks
    write_wav(&input_dir.path().join("blip.wav"), &loud_ramp(50), 1, 8_000);

    let gate = SpectralGate::new();
    let summary = run_batch(
        input_dir.path(),
        output_dir.path(),
        &BatchConfig::default(),
        &gate,
    )
    .unwrap();

    assert_eq!(summary.failed, 1);
    match &summary.outcomes[0] {
        FileOutcome::Failure { reason, .. } => {
            assert!(reason.contains("invalid reduction parameters"), "{reason}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn occupied_output_name_fails_that_file_without_scratch_leftovers() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    write_wav(&input_dir.path().join("a.wav"), &loud_ramp(44_100), 1, 44_100);
    write_wav(&input_dir.path().join("b.wav"), &loud_ramp(44_100), 1, 44_100);

    // A directory already holds a.wav's output name, so its staging rename
    // must fail after the cleaned audio was fully produced
    std::fs::create_dir(output_dir.path().join("cleaned_a.wav")).unwrap();

    let gate = SpectralGate::new();
    let summary = run_batch(
        input_dir.path(),
        output_dir.path(),
        &BatchConfig::default(),
        &gate,
    )
    .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    match &summary.outcomes[0] {
        FileOutcome::Failure { input, .. } => assert!(input.ends_with("a.wav")),
        other => panic!("expected a.wav to fail, got {other:?}"),
    }

    // Only the squatting directory and b's output remain — no scratch files
    let mut names: Vec<_> = std::fs::read_dir(output_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["cleaned_a.wav", "cleaned_b.wav"]);
}

#[test]
fn output_directory_is_created_when_missing() {
    let input_dir = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output_dir = root.path().join("nested").join("out");

    write_wav(&input_dir.path().join("a.wav"), &loud_ramp(44_100), 1, 44_100);

    let gate = SpectralGate::new();
    let summary = run_batch(input_dir.path(), &output_dir, &BatchConfig::default(), &gate).unwrap();

    assert_eq!(summary.succeeded, 1);
    assert!(output_dir.join("cleaned_a.wav").is_file());
}
