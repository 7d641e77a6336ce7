// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 监控配置参数
pub mod detection; // 检测结果与重叠分析
pub mod error;
pub mod input; // 视频输入系统
pub mod pipeline; // 单路流水线与多路调度
pub mod renderer; // 画面标注

pub use crate::config::{Args, CameraConfig, WatchConfig};
pub use crate::detection::{
    BBox, Detection, DetectionSet, Detector, OverlapAnalyzer, TagOutcome, HAZARD_CLASS_ID,
};
pub use crate::input::{Frame, FrameSource};
pub use crate::pipeline::{AlertState, Monitor, StreamPipeline, TickOutput, TickSink};
pub use crate::renderer::FrameAnnotator;

/// 本地时间字符串, 各字段以 `delimiter` 分隔
pub fn gen_time_string(delimiter: &str) -> String {
    let t_now = chrono::Local::now();
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%3f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    t_now.format(&fmt).to_string()
}
