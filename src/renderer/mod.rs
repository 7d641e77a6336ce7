// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 渲染系统: 检测框与标签绘制
pub mod annotator;

pub use annotator::FrameAnnotator;
