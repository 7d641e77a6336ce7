// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 视频处理流水线 (Video Processing Pipeline)
///
/// 每路摄像头一个独立流水线, 不共享可变状态:
/// - StreamPipeline: 拉帧 → 检测 → 重叠分析 → 标注 → 告警
/// - Monitor:        固定周期调度 (串行 / 每路一线程)
pub mod monitor;
pub mod stream;

pub use monitor::{CollectSink, ConsoleSink, Monitor, RunStats, TickSink};
pub use stream::{detection_text, summarize, AlertLevel, AlertState, StreamPipeline, TickOutput};
