mod common;

use common::{Scratch, init_logging, white, with_red_square, write_png};
use pixel_compare::{CompareConfig, ComparisonItem, ComparisonPipeline, ComparisonResult, Region};

fn pipeline_in(scratch: &Scratch) -> ComparisonPipeline {
    ComparisonPipeline::new(CompareConfig::default())
        .unwrap()
        .with_artifact_dir(scratch.artifacts())
}

#[test]
fn identical_files_have_no_difference() {
    init_logging();
    let scratch = Scratch::new("identical");
    let a = write_png(&scratch.path("a.png"), &white(64, 48));
    let b = write_png(&scratch.path("b.png"), &white(64, 48));

    let result = pipeline_in(&scratch).compare(&ComparisonItem::new(1, a, b));

    let ComparisonResult::Succeeded(report) = result else {
        panic!("expected success, got {result:?}");
    };
    assert_eq!(report.difference_percentage, 0.0);
    assert_eq!(report.region_count, 0);
    assert!(report.regions.is_empty());
}

#[test]
fn red_square_is_measured_and_localized() {
    init_logging();
    let scratch = Scratch::new("square");
    let a = write_png(&scratch.path("a.png"), &white(100, 100));
    let b = write_png(&scratch.path("b.png"), &with_red_square(100, 100, (40, 40), 20));

    let result = pipeline_in(&scratch).compare(&ComparisonItem::new(7, a, b));

    let ComparisonResult::Succeeded(report) = result else {
        panic!("expected success, got {result:?}");
    };
    assert!((report.difference_percentage - 4.0).abs() < 1e-9);
    assert_eq!(report.regions, vec![Region::new(37, 37, 26, 26).unwrap()]);
    assert_eq!(report.size_info.image1, (100, 100));

    for artifact in [
        &report.diff_visualization_image,
        &report.annotated_image1,
        &report.annotated_image2,
    ] {
        assert!(artifact.is_file(), "{} missing", artifact.display());
        let name = artifact.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.contains("_7_"), "{name}");
        let reloaded = image::open(artifact).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (100, 100));
    }

    let diff = image::open(&report.diff_visualization_image).unwrap().to_rgba8();
    assert_eq!(diff.get_pixel(50, 50).0, [0, 255, 255, 255]);
    assert_eq!(diff.get_pixel(5, 5).0, common::WHITE);
}

#[test]
fn repeated_runs_do_not_overwrite_artifacts() {
    let scratch = Scratch::new("repeat");
    let a = write_png(&scratch.path("a.png"), &white(20, 20));
    let b = write_png(&scratch.path("b.png"), &with_red_square(20, 20, (5, 5), 10));
    let pipeline = pipeline_in(&scratch);
    let item = ComparisonItem::new(1, a, b);

    let (ComparisonResult::Succeeded(first), ComparisonResult::Succeeded(second)) =
        (pipeline.compare(&item), pipeline.compare(&item))
    else {
        panic!("both runs should succeed");
    };
    assert_ne!(first.diff_visualization_image, second.diff_visualization_image);
}

#[test]
fn different_dimensions_are_a_size_mismatch() {
    let scratch = Scratch::new("mismatch");
    let a = write_png(&scratch.path("a.png"), &white(100, 100));
    let b = write_png(&scratch.path("b.png"), &white(100, 101));

    let result = pipeline_in(&scratch).compare(&ComparisonItem::new(3, a, b));

    match &result {
        ComparisonResult::SizeMismatch { size_info } => {
            assert_eq!(size_info.to_string(), "image 1: 100x100, image 2: 100x101");
        }
        other => panic!("expected size mismatch, got {other:?}"),
    }
    assert!(!result.is_failure());
    // no pixel work, so nothing was written
    assert!(!scratch.artifacts().exists());
}

#[test]
fn missing_file_fails_with_its_path() {
    let scratch = Scratch::new("missing");
    let a = write_png(&scratch.path("a.png"), &white(10, 10));
    let absent = scratch.path("nope.png");

    let result = pipeline_in(&scratch).compare(&ComparisonItem::new(4, a, absent.clone()));

    match result {
        ComparisonResult::Failed { error_message } => {
            assert!(error_message.contains(&absent.display().to_string()), "{error_message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn undecodable_file_fails() {
    let scratch = Scratch::new("garbage");
    let a = write_png(&scratch.path("a.png"), &white(10, 10));
    let garbage = scratch.path("garbage.png");
    std::fs::write(&garbage, b"definitely not a png").unwrap();

    let result = pipeline_in(&scratch).compare(&ComparisonItem::new(5, a, garbage));

    assert!(result.is_failure(), "{result:?}");
    assert!(result.status_label().starts_with("failed: "));
}

#[test]
fn format_is_read_from_content_not_extension() {
    let scratch = Scratch::new("sniffed");
    let png_as_img = scratch.path("a.img");
    white(32, 32)
        .save_with_format(&png_as_img, image::ImageFormat::Png)
        .expect("Error Saving File.");
    let jpeg_as_png = scratch.path("b.png");
    image::RgbImage::from_pixel(32, 32, image::Rgb([255, 255, 255]))
        .save_with_format(&jpeg_as_png, image::ImageFormat::Jpeg)
        .expect("Error Saving File.");

    let result = pipeline_in(&scratch).compare(&ComparisonItem::new(8, png_as_img, jpeg_as_png));

    let ComparisonResult::Succeeded(report) = result else {
        panic!("expected success, got {result:?}");
    };
    assert_eq!(report.region_count, 0);
    assert!(report.difference_percentage < 1.0);
}

#[test]
fn unwritable_artifact_dir_fails_the_pair() {
    let scratch = Scratch::new("unwritable");
    let a = write_png(&scratch.path("a.png"), &white(20, 20));
    let b = write_png(&scratch.path("b.png"), &with_red_square(20, 20, (5, 5), 10));
    let occupied = scratch.path("not_a_dir");
    std::fs::write(&occupied, b"regular file").unwrap();

    let pipeline = ComparisonPipeline::new(CompareConfig::default())
        .unwrap()
        .with_artifact_dir(&occupied);
    let result = pipeline.compare(&ComparisonItem::new(9, a, b));

    match result {
        ComparisonResult::Failed { error_message } => {
            assert!(error_message.contains(&occupied.display().to_string()), "{error_message}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(occupied.is_file());
}
