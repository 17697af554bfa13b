//! End-to-end pipeline tests over the public API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use signvote_engine::{
    EngineConfig, GesturePipeline, KnnClassifier, LandmarkSource, NdjsonSource,
    NormalizedLandmarks, NullClassifier, RecordStream, Sample,
};
use signvote_models::{
    Gesture, LandmarkFrame, Observation, PayloadLabel, Point3, VoteKind, LANDMARK_COUNT,
};

fn open_hand() -> [Point3; LANDMARK_COUNT] {
    let mut pts = [Point3::ORIGIN; LANDMARK_COUNT];
    pts[0] = Point3::new(0.50, 0.80, 0.0);
    pts[1] = Point3::new(0.42, 0.74, 0.0);
    pts[2] = Point3::new(0.36, 0.68, 0.0);
    pts[3] = Point3::new(0.31, 0.62, 0.0);
    pts[4] = Point3::new(0.27, 0.56, 0.0);
    for (f, x) in [0.44_f32, 0.50, 0.56, 0.62].iter().enumerate() {
        for j in 0..4 {
            pts[5 + f * 4 + j] = Point3::new(*x, 0.60 - 0.08 * j as f32, 0.0);
        }
    }
    pts
}

fn fist() -> [Point3; LANDMARK_COUNT] {
    let mut pts = open_hand();
    for (f, x) in [0.44_f32, 0.50, 0.56, 0.62].iter().enumerate() {
        let base = 5 + f * 4;
        pts[base] = Point3::new(*x, 0.60, 0.0);
        pts[base + 1] = Point3::new(*x, 0.52, 0.0);
        pts[base + 2] = Point3::new(*x, 0.52, -0.06);
        pts[base + 3] = Point3::new(*x, 0.57, -0.06);
    }
    pts
}

fn hand(points: [Point3; LANDMARK_COUNT]) -> Observation {
    Observation::Hand(LandmarkFrame::new(points, None))
}

fn geometric_only() -> GesturePipeline {
    GesturePipeline::new(&EngineConfig::default(), Arc::new(NullClassifier))
}

#[test]
fn test_steady_fist_emits_on_entry_and_each_cooldown() {
    let mut pipeline = geometric_only();
    let start = Instant::now();

    // 30 fps for 2 seconds.
    let events: Vec<usize> = (0..60)
        .filter_map(|i| {
            let now = start + Duration::from_millis(33 * i as u64);
            pipeline.process(&hand(fist()), now).event.map(|_| i)
        })
        .collect();

    // Entry at frame 0, then first frame past 1.5 s (frame 46 at 1.518 s).
    assert_eq!(events, vec![0, 46]);
}

#[test]
fn test_switching_gestures_emits_each_edge() {
    let mut pipeline = geometric_only();
    let start = Instant::now();
    let mut kinds = Vec::new();

    let script = [fist(), fist(), open_hand(), open_hand(), open_hand(), open_hand()];
    for (i, points) in script.into_iter().enumerate() {
        let outcome = pipeline.process(&hand(points), start + Duration::from_millis(33 * i as u64));
        if let Some(event) = outcome.event {
            kinds.push((i, event.kind));
        }
    }

    // Majority flips to NO once open-hand frames outnumber the two fist frames.
    assert_eq!(kinds, vec![(0, VoteKind::Yes), (4, VoteKind::No)]);
}

#[test]
fn test_confident_model_overrides_geometry() {
    let open = NormalizedLandmarks::from_frame(&LandmarkFrame::new(open_hand(), None));
    let closed = NormalizedLandmarks::from_frame(&LandmarkFrame::new(fist(), None));
    // Deliberately inverted labels: the model must win at >= 0.60.
    let model = KnnClassifier::fit(vec![
        Sample::new(open.feature_vector(), Gesture::Yes),
        Sample::new(closed.feature_vector(), Gesture::No),
    ])
    .unwrap();
    assert_eq!(model.k(), 1);

    let pipeline = GesturePipeline::new(&EngineConfig::default(), Arc::new(model));
    let fused = pipeline.classify(&LandmarkFrame::new(open_hand(), None));
    assert_eq!(fused.label, Gesture::Yes);
    assert_eq!(fused.confidence, 1.0);
}

#[tokio::test]
async fn test_ndjson_to_record_stream() {
    let fist_line = serde_json::json!({
        "landmarks": fist().iter().map(|p| [p.x, p.y, p.z]).collect::<Vec<_>>(),
        "handedness": "Right"
    })
    .to_string();
    let input = format!(
        "{fist}\n{fist}\n{fist}\n{{\"landmarks\": null}}\n{{\"landmarks\": null}}\n",
        fist = fist_line
    );

    let mut source = NdjsonSource::new(input.as_bytes());
    let mut pipeline = geometric_only();
    let mut stream = RecordStream::new(Vec::new());
    let start = Instant::now();
    let mut frames = 0u64;

    while let Some(observation) = source.next_observation().await.unwrap() {
        let outcome = pipeline.process(&observation, start + Duration::from_millis(33 * frames));
        stream.publish(outcome.payload).unwrap();
        frames += 1;
    }

    assert_eq!(frames, 5);
    // One YES record for the steady fist, one NONE record once it leaves.
    let output = String::from_utf8(stream.into_inner()).unwrap();
    let records: Vec<serde_json::Value> = output
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["gesture"], PayloadLabel::Yes.as_str());
    assert_eq!(records[1]["gesture"], PayloadLabel::None.as_str());
    assert_eq!(records[1]["confidence"], 0.0);
}
