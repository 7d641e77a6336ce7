// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 多路监控调度 (Monitor)
//!
//! 固定周期驱动各路 `StreamPipeline::tick`. 串行模式在当前线程依次执行,
//! 并行模式每路一个工作线程, 结果通过channel整体交付

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use tracing::{error, info, warn};

use super::stream::{detection_text, StreamPipeline, TickOutput};

/// tick结果消费者 (界面层接口)
pub trait TickSink {
    fn consume(&mut self, output: &TickOutput);
}

/// 运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub outputs: u64,
    pub hazard_ticks: u64,
    pub inference_failures: u64,
}

impl RunStats {
    fn record(&mut self, output: &TickOutput) {
        self.outputs += 1;
        if output.alert.hazard_active {
            self.hazard_ticks += 1;
        }
        if output.inference_failed {
            self.inference_failures += 1;
        }
    }
}

pub struct Monitor {
    pipelines: Vec<StreamPipeline>,
    interval: Duration,
}

impl Monitor {
    pub fn new(pipelines: Vec<StreamPipeline>, interval: Duration) -> Self {
        Self {
            pipelines,
            interval,
        }
    }

    pub fn pipelines(&self) -> &[StreamPipeline] {
        &self.pipelines
    }

    fn all_exhausted(&self) -> bool {
        self.pipelines.iter().all(|p| p.is_exhausted())
    }

    /// 串行调度; `max_ticks` 为0时运行到所有帧源耗尽
    pub fn run_sequential(&mut self, max_ticks: u64, sink: &mut dyn TickSink) -> RunStats {
        info!(
            "▶️ 串行调度 {} 路, 周期 {:?}",
            self.pipelines.len(),
            self.interval
        );
        let mut stats = RunStats::default();
        let mut tick = 0;

        while (max_ticks == 0 || tick < max_ticks) && !self.all_exhausted() {
            let start = Instant::now();
            for pipeline in self.pipelines.iter_mut() {
                if let Some(output) = pipeline.tick() {
                    stats.record(&output);
                    sink.consume(&output);
                }
            }
            tick += 1;
            thread::sleep(self.interval.saturating_sub(start.elapsed()));
        }

        info!("⏹️ 调度结束: {} 次tick, {} 次告警", tick, stats.hazard_ticks);
        stats
    }

    /// 并行调度: 每路一个工作线程, 互不共享状态
    pub fn run_parallel(&mut self, max_ticks: u64, sink: &mut dyn TickSink) -> RunStats {
        info!(
            "▶️ 并行调度 {} 路, 周期 {:?}",
            self.pipelines.len(),
            self.interval
        );
        let interval = self.interval;
        let (tx, rx) = bounded::<TickOutput>(8);
        let mut stats = RunStats::default();

        thread::scope(|s| {
            for pipeline in self.pipelines.iter_mut() {
                let tx = tx.clone();
                s.spawn(move || {
                    let mut tick = 0;
                    while (max_ticks == 0 || tick < max_ticks) && !pipeline.is_exhausted() {
                        let start = Instant::now();
                        if let Some(output) = pipeline.tick() {
                            if tx.send(output).is_err() {
                                warn!("[{}] 结果通道已关闭", pipeline.name());
                                break;
                            }
                        }
                        tick += 1;
                        thread::sleep(interval.saturating_sub(start.elapsed()));
                    }
                });
            }
            drop(tx);

            for output in rx.iter() {
                stats.record(&output);
                sink.consume(&output);
            }
        });

        info!("⏹️ 调度结束: {} 次告警", stats.hazard_ticks);
        stats
    }
}

/// 控制台输出, 可选保存告警帧截图
pub struct ConsoleSink {
    snapshot_dir: Option<PathBuf>,
}

impl ConsoleSink {
    pub fn new(snapshot_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = &snapshot_dir {
            if let Err(e) = std::fs::create_dir_all(dir) {
                error!("❌ 截图目录创建失败 {}: {}", dir.display(), e);
            }
        }
        Self { snapshot_dir }
    }

    pub fn snapshot_path(&self, output: &TickOutput) -> Option<PathBuf> {
        self.snapshot_dir.as_ref().map(|dir| {
            dir.join(format!(
                "{}_{:06}_{}.png",
                output.camera,
                output.frame_id,
                crate::gen_time_string("")
            ))
        })
    }
}

impl TickSink for ConsoleSink {
    fn consume(&mut self, output: &TickOutput) {
        let alert = output.alert.messages.join("; ");
        if output.alert.hazard_active {
            warn!("🚨 [{}] 帧 #{} {}", output.camera, output.frame_id, alert);
        } else {
            info!("✅ [{}] 帧 #{} {}", output.camera, output.frame_id, alert);
        }
        info!("   [{}] {}", output.camera, detection_text(&output.summaries));

        if !output.alert.hazard_active {
            return;
        }
        if let Some(path) = self.snapshot_path(output) {
            match output.annotated.image.save(&path) {
                Ok(()) => info!("📸 告警截图: {}", path.display()),
                Err(e) => error!("❌ 截图保存失败 {}: {}", path.display(), e),
            }
        }
    }
}

/// 收集全部tick结果 (测试与嵌入使用)
#[derive(Default)]
pub struct CollectSink {
    pub outputs: Vec<TickOutput>,
}

impl TickSink for CollectSink {
    fn consume(&mut self, output: &TickOutput) {
        self.outputs.push(output.clone());
    }
}
