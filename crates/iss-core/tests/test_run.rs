mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ndarray::{Array2, Array3};

use iss_core::error::IssError;
use iss_core::progress::ProgressReporter;
use iss_core::spots::{BlobDetector, BlobDetectorConfig, Spot};
use iss_core::stack::{Axes, ImageStack, SliceIndex};

use common::{blob_plane, log_config, stack_from_planes, two_by_two_stack};

fn sorted(spots: &[Spot]) -> Vec<Spot> {
    let mut spots = spots.to_vec();
    spots.sort_by(|a, b| {
        (a.plane, a.y, a.x, a.spot_id)
            .cmp(&(b.plane, b.y, b.x, b.spot_id))
            .then(a.radius.total_cmp(&b.radius))
    });
    spots
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_two_by_two_stack_one_spot_per_slice() {
    let (stack, centres) = two_by_two_stack();
    let detector = BlobDetector::new(log_config()).unwrap();

    let grouped = detector.run_grouped(&stack, None).unwrap();
    assert_eq!(grouped.len(), 4);
    for (table, index) in &grouped {
        assert!(index.z.is_none());
        assert_eq!(table.len(), 1, "slice {index:?}");
        let spot = &table.spots()[0];
        let (ey, ex) = centres[index.round][index.ch];
        let tolerance = spot.radius as usize;
        assert!(spot.y.abs_diff(ey) <= tolerance, "slice {index:?}: {spot:?}");
        assert!(spot.x.abs_diff(ex) <= tolerance, "slice {index:?}: {spot:?}");
        assert_eq!(spot.spot_id, 0);
    }

    let combined = detector.run(&stack, None).unwrap();
    assert_eq!(combined.len(), 4);
}

#[test]
fn test_detection_called_once_per_round_channel() {
    let planes = (0..2)
        .map(|_| (0..3).map(|_| Array2::<f32>::zeros((8, 8))).collect())
        .collect();
    let stack = stack_from_planes(planes);

    let calls = AtomicUsize::new(0);
    let results = stack
        .transform(
            |image| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(image.dim())
            },
            &[Axes::Round, Axes::Ch],
            None,
        )
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 6);
    let indices: HashSet<SliceIndex> = results.iter().map(|(_, i)| *i).collect();
    assert_eq!(indices.len(), 6);
    for (dim, _) in results {
        assert_eq!(dim, (1, 8, 8));
    }
}

#[test]
fn test_run_grouped_yields_one_table_per_round_channel() {
    let (rounds, chs) = (2, 3);
    let planes = (0..rounds)
        .map(|r| {
            (0..chs)
                .map(|c| blob_plane(32, 32, 8 + 4 * r, 8 + 5 * c, 2.0))
                .collect()
        })
        .collect();
    let stack = stack_from_planes(planes);
    let detector = BlobDetector::new(log_config()).unwrap();

    for n in [None, Some(3)] {
        let grouped = detector.run_grouped(&stack, n).unwrap();
        assert_eq!(grouped.len(), rounds * chs);

        let indices: HashSet<(usize, usize)> = grouped
            .iter()
            .map(|(_, i)| {
                assert!(i.z.is_none());
                (i.round, i.ch)
            })
            .collect();
        let expected: HashSet<(usize, usize)> = (0..rounds)
            .flat_map(|r| (0..chs).map(move |c| (r, c)))
            .collect();
        assert_eq!(indices, expected);

        for (table, index) in &grouped {
            assert_eq!(table.len(), 1, "slice {index:?}");
        }
        assert_eq!(detector.run(&stack, n).unwrap().len(), rounds * chs);
    }
}

#[test]
fn test_slices_are_detected_independently() {
    // A blob that only exists in round 1 must not leak into round 0.
    let planes = vec![
        vec![Array2::<f32>::zeros((32, 32))],
        vec![blob_plane(32, 32, 16, 16, 2.0)],
    ];
    let stack = stack_from_planes(planes);
    let detector = BlobDetector::new(log_config()).unwrap();

    let grouped = detector.run_grouped(&stack, Some(2)).unwrap();
    for (table, index) in grouped {
        let expected = if index.round == 1 { 1 } else { 0 };
        assert_eq!(table.len(), expected, "slice {index:?}");
    }
}

#[test]
fn test_combined_size_is_sum_of_slices() {
    let planes = vec![
        vec![blob_plane(32, 32, 10, 10, 2.0), Array2::<f32>::zeros((32, 32))],
        vec![
            {
                let mut p = blob_plane(32, 32, 8, 8, 2.0);
                common::add_blob_2d(&mut p, 24, 24, 2.0, 1.0);
                p
            },
            blob_plane(32, 32, 20, 12, 2.0),
        ],
    ];
    let stack = stack_from_planes(planes);
    let detector = BlobDetector::new(log_config()).unwrap();

    let grouped = detector.run_grouped(&stack, None).unwrap();
    let per_slice: usize = grouped.iter().map(|(t, _)| t.len()).sum();
    assert!(grouped.iter().any(|(t, _)| t.is_empty()));

    let combined = detector.run(&stack, None).unwrap();
    assert_eq!(combined.len(), per_slice);
    assert_eq!(combined.len(), 4);
}

#[test]
fn test_parallel_matches_sequential() {
    let (stack, _) = two_by_two_stack();
    let detector = BlobDetector::new(log_config()).unwrap();

    let sequential = detector.run(&stack, None).unwrap();
    let parallel = detector.run(&stack, Some(4)).unwrap();
    assert_eq!(sorted(sequential.spots()), sorted(parallel.spots()));
}

#[test]
fn test_all_blank_stack_gives_empty_table() {
    let planes = vec![vec![Array2::<f32>::zeros((16, 16)); 2]; 2];
    let stack = stack_from_planes(planes);
    let detector = BlobDetector::new(log_config()).unwrap();
    let spots = detector.run(&stack, Some(2)).unwrap();
    assert!(spots.is_empty());
}

// ---------------------------------------------------------------------------
// Volumes and planes
// ---------------------------------------------------------------------------

fn three_plane_stack() -> ImageStack {
    let mut volume = Array3::<f32>::zeros((3, 32, 32));
    let centres = [(6, 6), (16, 20), (25, 9)];
    for (z, &(y, x)) in centres.iter().enumerate() {
        volume
            .index_axis_mut(ndarray::Axis(0), z)
            .assign(&blob_plane(32, 32, y, x, 2.0));
    }
    ImageStack::from_volumes(vec![vec![volume]]).unwrap()
}

#[test]
fn test_per_plane_detection_reports_source_plane() {
    let stack = three_plane_stack();
    let detector = BlobDetector::new(log_config().with_is_volume(false)).unwrap();

    let grouped = detector.run_grouped(&stack, None).unwrap();
    assert_eq!(grouped.len(), 3);

    let spots = detector.run(&stack, None).unwrap();
    let mut found: Vec<(usize, usize, usize)> = spots.iter().map(|s| (s.plane, s.y, s.x)).collect();
    found.sort();
    assert_eq!(found, vec![(0, 6, 6), (1, 16, 20), (2, 25, 9)]);
}

#[test]
fn test_kernel_failure_aborts_run() {
    let stack = three_plane_stack();
    let config = BlobDetectorConfig::new(1.0, 3.0, 3, 0.001).with_detector_method("blob_doh");

    let volume = BlobDetector::new(config.clone()).unwrap();
    for n in [None, Some(2)] {
        assert!(matches!(
            volume.run(&stack, n),
            Err(IssError::UnsupportedDimensionality { .. })
        ));
    }

    let planes = BlobDetector::new(config.with_is_volume(false)).unwrap();
    assert!(planes.run(&stack, Some(2)).is_ok());
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl ProgressReporter for Recorder {
    fn begin(&self, total_items: usize) {
        self.events.lock().unwrap().push(format!("begin {total_items}"));
    }

    fn advance(&self, _items_done: usize) {
        self.events.lock().unwrap().push("advance".into());
    }

    fn finish(&self) {
        self.events.lock().unwrap().push("finish".into());
    }
}

#[test]
fn test_progress_reported_per_slice() {
    let (stack, _) = two_by_two_stack();
    let detector = BlobDetector::new(log_config()).unwrap();
    let recorder = Recorder::default();

    let spots = detector.run_reported(&stack, Some(2), &recorder).unwrap();
    assert_eq!(spots.len(), 4);

    let events = recorder.events.into_inner().unwrap();
    assert_eq!(events.first().map(String::as_str), Some("begin 4"));
    assert_eq!(events.last().map(String::as_str), Some("finish"));
    assert_eq!(events.iter().filter(|e| *e == "advance").count(), 4);
}
