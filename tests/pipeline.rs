use std::fs;
use std::path::Path;
use std::time::Duration;

use hazard_watch::config::{CameraConfig, WatchConfig};
use hazard_watch::pipeline::{
    CollectSink, ConsoleSink, Monitor, StreamPipeline, TickOutput, TickSink,
};
use image::{Rgb, RgbImage};

fn write_frames(dir: &Path, count: usize) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..count {
        RgbImage::from_pixel(64, 48, Rgb([20, 20, 20]))
            .save(dir.join(format!("frame_{:03}.png", i)))
            .unwrap();
    }
}

fn camera(root: &Path, name: &str, frames: usize, preds: &str) -> CameraConfig {
    let source = root.join(name);
    write_frames(&source, frames);
    let model = root.join(format!("{}.jsonl", name));
    fs::write(&model, preds).unwrap();
    CameraConfig {
        name: name.to_string(),
        source: source.display().to_string(),
        model: model.display().to_string(),
    }
}

fn config(cameras: Vec<CameraConfig>) -> WatchConfig {
    WatchConfig {
        tick_interval_ms: 0,
        cameras,
        ..Default::default()
    }
}

fn build(config: &WatchConfig) -> Vec<StreamPipeline> {
    config
        .cameras
        .iter()
        .map(|c| StreamPipeline::from_config(c, config).unwrap())
        .collect()
}

const CAM1: &str = "[[0, 0, 10, 10, 0.9, 0], [5, 5, 15, 15, 0.8, 1]]\n\
                    [[0, 0, 10, 10, 0.9, 0], [30, 30, 40, 40, 0.8, 1]]\n\
                    broken\n";
const CAM2: &str = "[]\n[[0, 0, 20, 20, 0.7, 0], [0, 0, 20, 20, 0.6, 0]]\n";

#[test]
fn sequential_run_tags_hazards_per_camera() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(vec![
        camera(dir.path(), "cam1", 3, CAM1),
        camera(dir.path(), "cam2", 2, CAM2),
    ]);
    config.validate().unwrap();

    let mut monitor = Monitor::new(build(&config), Duration::ZERO);
    let mut sink = CollectSink::default();
    let stats = monitor.run_sequential(0, &mut sink);

    assert_eq!(stats.outputs, 5);
    assert_eq!(stats.hazard_ticks, 1);
    assert_eq!(stats.inference_failures, 1);

    let cam1: Vec<&TickOutput> = sink.outputs.iter().filter(|o| o.camera == "cam1").collect();
    assert_eq!(cam1.len(), 3);
    assert!(cam1[0].alert.hazard_active);
    assert_eq!(cam1[0].relabeled, 1);
    assert_eq!(
        cam1[0].summaries,
        vec![
            "class: crane, conf: 0.90, box: (0, 0, 10, 10)",
            "class: hazard, conf: 0.80, box: (5, 5, 15, 15)",
        ]
    );
    assert!(!cam1[1].alert.hazard_active);
    assert!(cam1[2].inference_failed);
    assert!(cam1[2].summaries.is_empty());

    // 同类别重叠不告警
    let cam2: Vec<&TickOutput> = sink.outputs.iter().filter(|o| o.camera == "cam2").collect();
    assert_eq!(cam2.len(), 2);
    assert!(cam2.iter().all(|o| !o.alert.hazard_active));
    assert_eq!(cam2[1].summaries.len(), 2);

    for pipeline in monitor.pipelines() {
        assert!(pipeline.is_exhausted());
        assert!(!pipeline.alert().hazard_active);
    }
}

#[test]
fn parallel_run_delivers_every_tick() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(vec![
        camera(dir.path(), "cam1", 3, CAM1),
        camera(dir.path(), "cam2", 2, CAM2),
    ]);

    let mut monitor = Monitor::new(build(&config), Duration::ZERO);
    let mut sink = CollectSink::default();
    let stats = monitor.run_parallel(0, &mut sink);

    assert_eq!(stats.outputs, 5);
    assert_eq!(stats.hazard_ticks, 1);

    // 每路内部保持帧顺序
    for name in ["cam1", "cam2"] {
        let ids: Vec<u64> = sink
            .outputs
            .iter()
            .filter(|o| o.camera == name)
            .map(|o| o.frame_id)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}

#[test]
fn tick_limit_stops_early() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(vec![camera(dir.path(), "cam1", 3, CAM1)]);

    let mut monitor = Monitor::new(build(&config), Duration::ZERO);
    let mut sink = CollectSink::default();
    let stats = monitor.run_sequential(1, &mut sink);
    assert_eq!(stats.outputs, 1);
    assert!(!monitor.pipelines()[0].is_exhausted());
}

#[test]
fn console_sink_saves_hazard_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let shots = dir.path().join("shots");
    let config = config(vec![camera(dir.path(), "cam1", 3, CAM1)]);

    let mut pipelines = build(&config);
    let mut sink = ConsoleSink::new(Some(shots.clone()));
    while let Some(output) = pipelines[0].tick() {
        sink.consume(&output);
    }

    let saved: Vec<_> = fs::read_dir(&shots).unwrap().collect();
    assert_eq!(saved.len(), 1);
    let path = saved[0].as_ref().unwrap().path();
    assert!(path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("cam1_000000_"))
        .unwrap_or(false));
    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (64, 48));
}

#[test]
fn missing_source_fails_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let cam = CameraConfig {
        name: "cam1".into(),
        source: dir.path().join("nothing").display().to_string(),
        model: dir.path().join("none.jsonl").display().to_string(),
    };
    let config = config(vec![cam.clone()]);
    assert!(StreamPipeline::from_config(&cam, &config).is_err());
}
