use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

use recording_renamer::datetime::PermissiveParser;
use recording_renamer::error::{DateParseError, RenameError};
use recording_renamer::models::RowOutcome;
use recording_renamer::rename::{self, RenameOptions};

fn setup(root: &Path, csv: &str, inputs: &[(&str, &str)]) -> RenameOptions {
    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    for (name, data) in inputs {
        fs::write(input.join(name), data).unwrap();
    }
    let csv_path = root.join("meta.csv");
    fs::write(&csv_path, csv).unwrap();
    RenameOptions::new(csv_path)
        .input_dir(input)
        .output_dir(root.join("out").join("renamed"))
}

fn output_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn existing_recording_is_copied_under_timestamp() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\nrec1.wav,2025-11-05 14:30:00\n",
        &[("rec1.wav", "RIFF....WAVEfmt ")],
    );

    let mut out = Vec::new();
    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut out).expect("run");

    let dst = opts.output_dir.join("20251105_143000.WAV");
    assert_eq!(fs::read(&dst).unwrap(), b"RIFF....WAVEfmt ");
    assert_eq!(output_names(&opts.output_dir), vec!["20251105_143000.WAV"]);
    assert_eq!(report.copied(), 1);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Renamed: rec1.wav -> 20251105_143000.WAV"));
    assert!(text.contains(&format!("Done! Renamed files saved in: {}", opts.output_dir.display())));
}

#[test]
fn missing_source_is_reported_and_skipped() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\nmissing.wav,2025-11-05 14:30:00\nrec2.wav,2025-11-05 15:00:00\n",
        &[("rec2.wav", "two")],
    );

    let mut out = Vec::new();
    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut out).expect("run");

    assert!(matches!(report.outcomes[0], RowOutcome::NotFound { .. }));
    assert!(matches!(report.outcomes[1], RowOutcome::Copied { .. }));
    assert_eq!(output_names(&opts.output_dir), vec!["20251105_150000.WAV"]);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("File not found:"));
    assert!(text.contains("missing.wav"));
}

#[test]
fn bad_date_does_not_stop_the_run() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\na.wav,yesterday-ish\nb.wav,\nc.wav,2025-11-05 16:45:10\n",
        &[("a.wav", "a"), ("b.wav", "b"), ("c.wav", "c")],
    );

    let mut out = Vec::new();
    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut out).expect("run");

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.errors(), 2);
    assert!(matches!(&report.outcomes[0], RowOutcome::DateParse { original, .. } if original == "a.wav"));
    assert!(matches!(&report.outcomes[1], RowOutcome::DateParse { original, .. } if original == "b.wav"));
    assert_eq!(output_names(&opts.output_dir), vec!["20251105_164510.WAV"]);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Error processing a.wav: unrecognised date/time 'yesterday-ish'"));
}

#[test]
fn missing_column_fails_before_touching_files() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        " File name ,Recorded\nrec1.wav,2025-11-05 14:30:00\n",
        &[("rec1.wav", "data")],
    );

    let mut out = Vec::new();
    let err = rename::rename_recordings(&opts, &PermissiveParser, &mut out).unwrap_err();
    match err {
        RenameError::MissingColumns { missing } => assert_eq!(missing, vec!["Start date".to_string()]),
        other => panic!("unexpected error: {}", other),
    }
    assert!(!opts.output_dir.exists());
    assert!(out.is_empty());
}

#[test]
fn padded_headers_and_values_are_accepted() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name , Start date ,Gain\n  rec1.wav  ,  2025-11-05 14:30:00 ,12\n",
        &[("rec1.wav", "data")],
    );

    let mut out = Vec::new();
    rename::rename_recordings(&opts, &PermissiveParser, &mut out).expect("run");
    assert!(opts.output_dir.join("20251105_143000.WAV").exists());
}

#[test]
fn second_run_overwrites_with_identical_result() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\nrec1.wav,2025-11-05 14:30:00\nrec2.wav,2025-11-05 14:31:00\n",
        &[("rec1.wav", "one"), ("rec2.wav", "two")],
    );

    rename::rename_recordings(&opts, &PermissiveParser, &mut Vec::new()).expect("first run");
    let first = output_names(&opts.output_dir);
    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut Vec::new()).expect("second run");

    assert_eq!(report.errors(), 0);
    assert_eq!(output_names(&opts.output_dir), first);
    assert_eq!(fs::read(opts.output_dir.join("20251105_143100.WAV")).unwrap(), b"two");
}

#[test]
fn modification_time_is_preserved() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\nrec1.wav,2025-11-05 14:30:00\n",
        &[("rec1.wav", "data")],
    );
    let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let src = fs::OpenOptions::new().write(true).open(opts.input_dir.join("rec1.wav")).unwrap();
    src.set_modified(stamp).unwrap();
    drop(src);

    rename::rename_recordings(&opts, &PermissiveParser, &mut Vec::new()).expect("run");

    let copied = fs::metadata(opts.output_dir.join("20251105_143000.WAV")).unwrap();
    assert_eq!(copied.modified().unwrap(), stamp);
}

#[test]
fn dry_run_writes_nothing() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\nrec1.wav,2025-11-05 14:30:00\nnope.wav,2025-11-05 14:30:00\n",
        &[("rec1.wav", "data")],
    )
    .dry_run(true);

    let mut out = Vec::new();
    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut out).expect("run");

    assert!(!opts.output_dir.exists());
    assert!(matches!(&report.outcomes[0], RowOutcome::Planned { new_name, .. } if new_name == "20251105_143000.WAV"));
    assert!(matches!(report.outcomes[1], RowOutcome::NotFound { .. }));
    assert!(String::from_utf8(out).unwrap().contains("Would rename: rec1.wav -> 20251105_143000.WAV"));
}

#[test]
fn duplicate_timestamps_keep_last_copy() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\na.wav,2025-11-05 14:30:00\nb.wav,05.11.2025 14:30:00\n",
        &[("a.wav", "first"), ("b.wav", "second")],
    );

    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut Vec::new()).expect("run");

    assert_eq!(report.copied(), 2);
    assert_eq!(report.duplicates, vec!["20251105_143000.WAV".to_string()]);
    assert_eq!(fs::read(opts.output_dir.join("20251105_143000.WAV")).unwrap(), b"second");
}

#[test]
fn custom_parser_replaces_permissive_grammar() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\nrec1.wav,2025-11-05 14:30:00\nrec2.wav,11/05/2025 14:30\n",
        &[("rec1.wav", "1"), ("rec2.wav", "2")],
    );
    let strict = |s: &str| {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .map_err(|_| DateParseError::Unrecognised(s.to_string()))
    };

    let report = rename::rename_recordings(&opts, &strict, &mut Vec::new()).expect("run");
    assert!(matches!(report.outcomes[0], RowOutcome::Copied { .. }));
    assert!(matches!(report.outcomes[1], RowOutcome::DateParse { .. }));
}

#[test]
fn unreferenced_recordings_are_listed() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\nrec1.wav,2025-11-05 14:30:00\n",
        &[("rec1.wav", "1"), ("stray.WAV", "2"), ("notes.txt", "3")],
    );

    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut Vec::new()).expect("run");
    let exts = vec!["*.wav".to_string()];
    let orphans = rename::unreferenced_inputs(&opts.input_dir, &report, &exts);
    assert_eq!(orphans, vec![opts.input_dir.join("stray.WAV")]);
}

#[test]
fn delimiter_only_row_is_reported_not_dropped() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date,Depth\n,,\nrec1.wav,2025-11-05 14:30:00,3\n",
        &[("rec1.wav", "1")],
    );

    let mut out = Vec::new();
    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut out).expect("run");

    assert_eq!(report.outcomes.len(), 2);
    assert!(matches!(&report.outcomes[0], RowOutcome::DateParse { original, .. } if original.is_empty()));
    assert!(matches!(report.outcomes[1], RowOutcome::Copied { .. }));
    assert_eq!(output_names(&opts.output_dir), vec!["20251105_143000.WAV"]);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Error processing : empty date value"));
}

#[test]
fn copy_failure_is_row_local() {
    let td = tempdir().unwrap();
    let opts = setup(
        td.path(),
        "File name,Start date\nsub,2025-11-05 10:00:00\nrec1.wav,2025-11-05 14:30:00\n",
        &[("rec1.wav", "1")],
    );
    fs::create_dir_all(opts.input_dir.join("sub")).unwrap();

    let mut out = Vec::new();
    let report = rename::rename_recordings(&opts, &PermissiveParser, &mut out).expect("run");

    assert!(matches!(&report.outcomes[0], RowOutcome::Copy { original, .. } if original == "sub"));
    assert!(matches!(report.outcomes[1], RowOutcome::Copied { .. }));
    assert_eq!(report.errors(), 1);
    assert!(!opts.output_dir.join("20251105_100000.WAV").exists());
    assert_eq!(output_names(&opts.output_dir), vec!["20251105_143000.WAV"]);
    assert!(String::from_utf8(out).unwrap().contains("Error processing sub: "));
}
