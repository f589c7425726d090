//! Integration tests for the pipeline and action dispatch.
//!
//! These tests verify end-to-end behavior including:
//! - Exact and histogram detection on real files
//! - Sequential/parallel agreement
//! - Corrupt and missing inputs
//! - Actions applied to the sorted result

use assert_fs::prelude::*;
use duplicate_image_pairs::core::action::{Action, ActionDispatcher};
use duplicate_image_pairs::core::comparator::ComparisonMethod;
use duplicate_image_pairs::core::pipeline::Pipeline;
use duplicate_image_pairs::core::search::Match;
use duplicate_image_pairs::DedupError;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Four colored quadrants; the color distribution does not depend on size
fn quadrants(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        match (x * 2 / width, y * 2 / height) {
            (0, 0) => Rgb([200, 30, 30]),
            (1, 0) => Rgb([30, 200, 30]),
            (0, _) => Rgb([30, 30, 200]),
            _ => Rgb([240, 240, 240]),
        }
    })
}

fn names(root: &Path, matches: &[Match]) -> Vec<(String, String)> {
    let rel = |p: &PathBuf| p.strip_prefix(root).unwrap().display().to_string();
    matches.iter().map(|m| (rel(&m.first), rel(&m.second))).collect()
}

#[test]
fn exact_scenario_reports_one_match_among_three_files() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.jpg"), b"\xFF\xD8\xFF\xE0 first picture").unwrap();
    fs::write(temp_dir.path().join("b.jpg"), b"\xFF\xD8\xFF\xE0 first picture").unwrap();
    fs::write(temp_dir.path().join("c.jpg"), b"\xFF\xD8\xFF\xE0 other picture").unwrap();

    let result = Pipeline::builder()
        .root(temp_dir.path())
        .method(ComparisonMethod::Exact)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.total_files(), 3);
    assert_eq!(
        names(temp_dir.path(), &result.matches),
        vec![("a.jpg".to_string(), "b.jpg".to_string())]
    );

    let report = ActionDispatcher::new(Action::NoAction).dispatch(&result.matches);
    assert_eq!(report.applied, 1);
}

#[test]
fn empty_directory_dispatches_nothing() {
    let temp_dir = TempDir::new().unwrap();

    let result = Pipeline::builder().root(temp_dir.path()).build().run().unwrap();
    let report = ActionDispatcher::new(Action::DeleteFirst).dispatch(&result.matches);

    assert_eq!(result.total_files(), 0);
    assert!(result.matches.is_empty());
    assert_eq!(report.applied + report.failed, 0);
}

#[test]
fn histogram_matches_resized_copy() {
    let temp_dir = TempDir::new().unwrap();
    quadrants(100, 100).save(temp_dir.path().join("small.png")).unwrap();
    quadrants(200, 200).save(temp_dir.path().join("large.png")).unwrap();
    RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]))
        .save(temp_dir.path().join("black.png"))
        .unwrap();

    let result = Pipeline::builder()
        .root(temp_dir.path())
        .method(ComparisonMethod::Histogram)
        .aspect_fuzziness(0.05)
        .rms_threshold(0.01)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.total_files(), 3);
    assert_eq!(
        names(temp_dir.path(), &result.matches),
        vec![("large.png".to_string(), "small.png".to_string())]
    );
    // Each image decoded once despite taking part in two pairs
    assert_eq!(result.cache_stats.signatures, 3);
}

#[test]
fn histogram_rejects_different_aspect_ratio() {
    let temp_dir = TempDir::new().unwrap();
    RgbImage::from_pixel(100, 100, Rgb([10, 20, 30]))
        .save(temp_dir.path().join("square.png"))
        .unwrap();
    RgbImage::from_pixel(200, 100, Rgb([10, 20, 30]))
        .save(temp_dir.path().join("wide.png"))
        .unwrap();

    let result = Pipeline::builder()
        .root(temp_dir.path())
        .method(ComparisonMethod::Histogram)
        .rms_threshold(1.0)
        .build()
        .run()
        .unwrap();

    assert_eq!(result.total_files(), 2);
    assert!(result.matches.is_empty());
}

#[test]
fn corrupt_image_never_matches() {
    let temp_dir = TempDir::new().unwrap();
    quadrants(50, 50).save(temp_dir.path().join("a.png")).unwrap();
    quadrants(50, 50).save(temp_dir.path().join("b.png")).unwrap();
    fs::write(temp_dir.path().join("corrupt.jpg"), b"this is not a valid image file").unwrap();
    fs::write(temp_dir.path().join("corrupt2.png"), b"this is not a valid image file").unwrap();

    for parallel in [false, true] {
        let result = Pipeline::builder()
            .root(temp_dir.path())
            .method(ComparisonMethod::Histogram)
            .aspect_fuzziness(1.0)
            .rms_threshold(10.0)
            .parallel(parallel)
            .build()
            .run()
            .unwrap();

        assert_eq!(result.total_files(), 4);
        assert_eq!(
            names(temp_dir.path(), &result.matches),
            vec![("a.png".to_string(), "b.png".to_string())]
        );
    }
}

#[test]
fn parallel_and_sequential_agree_on_real_files() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    for i in 0..30u8 {
        let dir = if i % 2 == 0 { temp_dir.path() } else { nested.as_path() };
        fs::write(dir.join(format!("img{i:02}.gif")), [i % 4; 16]).unwrap();
    }

    let run = |parallel: bool, chunk_size: usize| {
        Pipeline::builder()
            .root(temp_dir.path())
            .parallel(parallel)
            .chunk_size(chunk_size)
            .workers(Some(4))
            .build()
            .run()
            .unwrap()
            .matches
    };

    let sequential = run(false, 0);
    // 4 content classes of 7 or 8 files each: 2 * C(8,2) + 2 * C(7,2)
    assert_eq!(sequential.len(), 2 * 28 + 2 * 21);
    assert_eq!(run(true, 0), sequential);
    assert_eq!(run(true, 1), sequential);
    assert_eq!(run(true, 1000), sequential);
}

#[test]
fn matches_are_sorted_before_dispatch() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["d.png", "c.png", "b.png", "a.png"] {
        fs::write(temp_dir.path().join(name), b"same").unwrap();
    }

    let result = Pipeline::builder()
        .root(temp_dir.path())
        .parallel(true)
        .chunk_size(1)
        .build()
        .run()
        .unwrap();

    let mut sorted = result.matches.clone();
    sorted.sort();
    assert_eq!(result.matches, sorted);
    assert_eq!(result.matches.len(), 6);
}

#[test]
fn delete_second_removes_duplicates_and_keeps_originals() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.jpg").write_binary(b"duplicate bytes").unwrap();
    temp.child("b.jpg").write_binary(b"duplicate bytes").unwrap();
    temp.child("c.jpg").write_binary(b"unique bytes").unwrap();
    temp.child("notes.txt").write_str("duplicate bytes").unwrap();

    let result = Pipeline::builder().root(temp.path()).build().run().unwrap();
    let report = ActionDispatcher::new(Action::DeleteSecond).dispatch(&result.matches);

    assert_eq!(report.applied, 1);
    temp.child("a.jpg").assert(predicate::path::exists());
    temp.child("b.jpg").assert(predicate::path::missing());
    temp.child("c.jpg").assert(predicate::path::exists());
    temp.child("notes.txt").assert(predicate::path::exists());
}

#[test]
fn nonexistent_root_is_a_startup_error() {
    let result = Pipeline::builder()
        .root("/nonexistent/path/that/does/not/exist")
        .build()
        .run();

    assert!(matches!(result, Err(DedupError::Scan(_))));
}

#[test]
fn hidden_directories_are_scanned() {
    let temp_dir = TempDir::new().unwrap();
    let hidden = temp_dir.path().join(".photos");
    fs::create_dir(&hidden).unwrap();
    fs::write(hidden.join("a.jpg"), b"same bytes").unwrap();
    fs::write(temp_dir.path().join("b.jpg"), b"same bytes").unwrap();

    let result = Pipeline::builder().root(temp_dir.path()).build().run().unwrap();
    assert_eq!(result.total_files(), 2);
    assert_eq!(result.matches.len(), 1);

    let result = Pipeline::builder()
        .root(temp_dir.path())
        .exclude_hidden(true)
        .build()
        .run()
        .unwrap();
    assert_eq!(result.total_files(), 1);
    assert!(result.matches.is_empty());
}

#[test]
fn delete_first_follows_path_byte_order() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("2020").create_dir_all().unwrap();
    temp.child("2020-copy").create_dir_all().unwrap();
    temp.child("2020/x.jpg").write_binary(b"duplicate bytes").unwrap();
    temp.child("2020-copy/x.jpg").write_binary(b"duplicate bytes").unwrap();

    let result = Pipeline::builder().root(temp.path()).build().run().unwrap();
    assert_eq!(
        names(temp.path(), &result.matches),
        vec![("2020-copy/x.jpg".to_string(), "2020/x.jpg".to_string())]
    );

    let report = ActionDispatcher::new(Action::DeleteFirst).dispatch(&result.matches);

    assert_eq!(report.applied, 1);
    temp.child("2020-copy/x.jpg").assert(predicate::path::missing());
    temp.child("2020/x.jpg").assert(predicate::path::exists());
}
