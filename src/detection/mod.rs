// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 检测系统 (Detection System)
///
/// 单帧内的检测结果处理, 不跨帧保留状态
/// - Detector:        帧 → 检测结果 (外部能力)
/// - parse:           检测器原始输出解析
/// - OverlapAnalyzer: 类别对重叠 → 危险标记
pub mod detector;
pub mod overlap;
pub mod parse;
pub mod types;

pub use detector::{Detector, ReplayDetector, ScriptedDetector};
pub use overlap::{iou, OverlapAnalyzer, TagOutcome};
pub use parse::{parse_predictions, parse_rows, rows_to_array, BoxLayout};
pub use types::{BBox, ColorTable, Detection, DetectionSet, LabelTable, HAZARD_CLASS_ID};
