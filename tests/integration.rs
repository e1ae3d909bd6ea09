use std::path::PathBuf;

use panelstat::{
    dataset::collect_annotation_files, AnalysisError, AnalyzerBuilder, Dataset, DegeneratePolicy,
    GeometryError, Layout, ObjectKind,
};

const VOLUME: &str = r#"{
    "images": [
        {"id": 1, "file_name": "TitleA/000.jpg", "width": 800, "height": 600},
        {"id": 2, "file_name": "TitleA/001.jpg", "width": 800, "height": 600}
    ],
    "categories": [
        {"id": 1, "name": "frame"},
        {"id": 2, "name": "balloon"},
        {"id": 3, "name": "face"},
        {"id": 4, "name": "body"}
    ],
    "annotations": [
        {"id": 100, "image_id": 1, "category_id": 1, "bbox": [0, 0, 400, 300]},
        {"id": 101, "image_id": 1, "category_id": 2, "bbox": [20, 20, 60, 80]},
        {"id": 102, "image_id": 1, "category_id": 2, "bbox": [300, 20, 60, 80]},
        {"id": 103, "image_id": 1, "category_id": 3, "bbox": [150, 100, 80, 80]},
        {"id": 104, "image_id": 1, "category_id": 4, "bbox": [120, 80, 160, 220],
         "segmentation": {"size": [600, 800], "counts": [0, 24000, 456000]}},

        {"id": 110, "image_id": 1, "category_id": 1, "bbox": [400, 0, 400, 300]},
        {"id": 111, "image_id": 1, "category_id": 2, "bbox": [420, 20, 60, 80]},
        {"id": 112, "image_id": 1, "category_id": 2, "bbox": [500, 20, 60, 80]},
        {"id": 113, "image_id": 1, "category_id": 3, "bbox": [650, 100, 80, 80]},

        {"id": 200, "image_id": 2, "category_id": 1, "bbox": [0, 0, 800, 600]},
        {"id": 201, "image_id": 2, "category_id": 2, "bbox": [700, 500, 200, 200]},
        {"id": 202, "image_id": 2, "category_id": 3, "bbox": [100, 100, 0, 50]}
    ]
}"#;

fn fixture_dir(name: &str) -> PathBuf {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = PathBuf::from(std::env!("CARGO_TARGET_TMPDIR")).join(name);
    std::fs::create_dir_all(&dir).expect("Failed to create fixture dir");
    std::fs::write(dir.join("TitleA.json"), VOLUME).expect("Failed to write fixture");
    std::fs::write(dir.join("notes.txt"), "not an annotation file")
        .expect("Failed to write fixture");
    dir
}

#[test]
fn panel_pass_over_directory() {
    let dir = fixture_dir("panel_pass");
    let files = collect_annotation_files(&[dir.clone()]).expect("Failed to list files");
    assert_eq!(files, vec![dir.join("TitleA.json")]);

    let dataset = Dataset::open_all(&files).expect("Failed to load dataset");
    let analyzer = AnalyzerBuilder::new()
        .output_dir(dir.join("reports"))
        .build()
        .expect("Failed to build analyzer");
    let report = analyzer.panels(&dataset).expect("Panel analysis failed");

    assert_eq!(report.total_frames(), 3);
    assert_eq!(report.two_text_one_face, 2);
    assert_eq!(report.layouts.get(&Layout::Flanked), Some(&1));
    assert_eq!(report.layouts.get(&Layout::TextsLeft), Some(&1));

    // the balloon hanging off page 2 is only a quarter inside its frame,
    // the zero-width face lies inside it
    let last = &report.frames[2];
    assert_eq!((last.text_count, last.face_count), (0, 1));

    let written = analyzer.write_panels(&report).expect("Failed to write reports");
    let text = std::fs::read_to_string(&written[0]).expect("Missing text report");
    assert!(text.contains("Total frames: 3\n"));
    assert!(text.contains("tct: 1\n"));
    // texts per frame are 2, 2 and 0
    assert!(text.contains("Standard deviation: 1.154701\nVariance: 1.333333\n"));
    let csv = std::fs::read_to_string(&written[1]).expect("Missing CSV report");
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.starts_with(
        "image_id,file_name,frame_id,text_count,face_count,object_count,layout\n"
    ));
}

#[test]
fn degenerate_objects_can_be_rejected() {
    let dir = fixture_dir("degenerate");
    let dataset = Dataset::open(&dir.join("TitleA.json")).expect("Failed to load dataset");
    let analyzer = AnalyzerBuilder::new()
        .degenerate_policy(DegeneratePolicy::Reject)
        .build()
        .expect("Failed to build analyzer");

    let err = analyzer.panels(&dataset).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::Geometry {
            source: GeometryError::DegenerateCandidate { id: Some(202) }
        }
    );
}

#[test]
fn object_pass_writes_reports() {
    let dir = fixture_dir("object_pass");
    let dataset = Dataset::open(&dir.join("TitleA.json")).expect("Failed to load dataset");
    let analyzer = AnalyzerBuilder::new()
        .output_dir(dir.join("reports"))
        .build()
        .expect("Failed to build analyzer");

    let report = analyzer.objects(&dataset, &ObjectKind::Body);
    assert_eq!(report.total_annotations, 1);
    assert_eq!(report.images_with_objects, 1);
    let segmentation = report.segmentation_ratio.as_ref().expect("No segmentation ratio");
    assert!((segmentation.mean - 0.05).abs() < 1e-12);

    let written = analyzer.write_objects(&report).expect("Failed to write reports");
    assert!(written[0].ends_with("body_statistics.txt"));
    let text = std::fs::read_to_string(&written[0]).expect("Missing text report");
    assert!(text.contains("Distribution by Body Count:\n1: 1 images (100.0%)\n"));
    assert!(text.contains(" 1. TitleA: 1 images, avg 1.00 body\n"));
    assert!(text.contains("Area Statistics (pixels):\nMean: 24000.00\n"));
    let csv = std::fs::read_to_string(&written[1]).expect("Missing CSV report");
    assert_eq!(
        csv,
        "image_id,file_name,manga_title,count\n\
         1,TitleA/000.jpg,TitleA,1\n\
         2,TitleA/001.jpg,TitleA,0\n"
    );
}

#[test]
fn non_finite_threshold_is_rejected() {
    assert!(matches!(
        AnalyzerBuilder::new().threshold(f64::NAN).build(),
        Err(GeometryError::InvalidThreshold { .. })
    ));
}
