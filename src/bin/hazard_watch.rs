// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 双路摄像头危险接近监控
///
/// 主程序入口 - 直接运行: cargo run --bin hazard-watch --release -- --source1 cam1/ --model1 cam1.jsonl ...
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hazard_watch::config::{Args, WatchConfig};
use hazard_watch::pipeline::{ConsoleSink, Monitor, StreamPipeline};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hazard_watch=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WatchConfig::load(path),
        None => WatchConfig::default(),
    };
    config.apply_args(&args);
    config.validate().context("invalid configuration")?;

    info!(
        "✅ {} 路摄像头 | 危险类别对 ({}, {}) | 周期 {}ms",
        config.cameras.len(),
        config.labels[config.hazard_pair.0 as usize],
        config.labels[config.hazard_pair.1 as usize],
        config.tick_interval_ms
    );

    let mut pipelines = Vec::with_capacity(config.cameras.len());
    for camera in &config.cameras {
        info!("📹 {}: 帧源 {} | 模型 {}", camera.name, camera.source, camera.model);
        let pipeline = StreamPipeline::from_config(camera, &config)
            .with_context(|| format!("failed to start {}", camera.name))?;
        pipelines.push(pipeline);
    }

    let mut monitor = Monitor::new(pipelines, Duration::from_millis(config.tick_interval_ms));
    let mut sink = ConsoleSink::new(config.snapshot_dir.clone());

    let stats = if args.parallel {
        monitor.run_parallel(args.ticks, &mut sink)
    } else {
        monitor.run_sequential(args.ticks, &mut sink)
    };

    info!(
        "📊 共处理 {} 帧, 告警 {} 帧, 推理失败 {} 次",
        stats.outputs, stats.hazard_ticks, stats.inference_failures
    );
    Ok(())
}
