// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 单路摄像头流水线 (Stream Pipeline)
//! 每次tick: 拉帧 → 检测 → 重叠分析 → 标注 → 生成检测摘要与告警状态

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::{CameraConfig, WatchConfig};
use crate::detection::detector::{Detector, ReplayDetector};
use crate::detection::overlap::OverlapAnalyzer;
use crate::detection::types::{Detection, LabelTable};
use crate::error::SourceError;
use crate::input::{Frame, FrameSource, ImageSequenceSource};
use crate::renderer::FrameAnnotator;

/// 告警等级 (供界面选择配色)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Normal,
    Alert,
}

/// 每路摄像头最新告警状态, 每次tick覆盖
#[derive(Clone, Debug, PartialEq)]
pub struct AlertState {
    pub hazard_active: bool,
    pub messages: Vec<String>,
}

impl AlertState {
    pub fn normal() -> Self {
        Self {
            hazard_active: false,
            messages: vec!["no alert".to_string()],
        }
    }

    pub fn hazard(count: usize, class_a: &str, class_b: &str) -> Self {
        Self {
            hazard_active: true,
            messages: vec![format!(
                "ALERT: {} hazard overlap(s) between {} and {}",
                count, class_a, class_b
            )],
        }
    }

    pub fn level(&self) -> AlertLevel {
        if self.hazard_active {
            AlertLevel::Alert
        } else {
            AlertLevel::Normal
        }
    }
}

impl Default for AlertState {
    fn default() -> Self {
        Self::normal()
    }
}

/// 一次tick的完整结果, 整体交付给界面
#[derive(Clone, Debug)]
pub struct TickOutput {
    pub camera: String,
    pub frame_id: u64,
    pub annotated: Frame,
    pub summaries: Vec<String>,
    pub alert: AlertState,
    pub relabeled: usize,
    pub malformed: usize,
    /// 本帧出现的异常类别ID (升序, 去重)
    pub malformed_classes: Vec<u32>,
    pub inference_failed: bool,
}

/// 单个检测的摘要: 类别, 置信度(两位小数), 坐标(取整)
pub fn summarize(det: &Detection, labels: &LabelTable) -> String {
    format!(
        "class: {}, conf: {:.2}, box: ({:.0}, {:.0}, {:.0}, {:.0})",
        labels.label(det.class_id),
        det.confidence,
        det.bbox.x1,
        det.bbox.y1,
        det.bbox.x2,
        det.bbox.y2
    )
}

/// 检测结果展示文本
pub fn detection_text(summaries: &[String]) -> String {
    if summaries.is_empty() {
        "detections: none".to_string()
    } else {
        format!("detections: {}", summaries.join(", "))
    }
}

pub struct StreamPipeline {
    name: String,
    source: Box<dyn FrameSource + Send>,
    detector: Box<dyn Detector + Send>,
    analyzer: OverlapAnalyzer,
    annotator: FrameAnnotator,
    labels: LabelTable,

    alert: AlertState,
    last_frame: Option<Frame>,
}

impl StreamPipeline {
    pub fn new(
        name: impl Into<String>,
        source: Box<dyn FrameSource + Send>,
        detector: Box<dyn Detector + Send>,
        analyzer: OverlapAnalyzer,
        annotator: FrameAnnotator,
    ) -> Self {
        let labels = annotator.labels().clone();
        Self {
            name: name.into(),
            source,
            detector,
            analyzer,
            annotator,
            labels,
            alert: AlertState::normal(),
            last_frame: None,
        }
    }

    /// 按配置组装: 图片目录帧源 + 回放检测器
    pub fn from_config(camera: &CameraConfig, config: &WatchConfig) -> Result<Self, SourceError> {
        let source = ImageSequenceSource::open(&camera.source)?;
        let detector = ReplayDetector::open(&camera.model, config.box_layout)?;

        let mut annotator = FrameAnnotator::new(config.color_table(), config.label_table())
            .with_thickness_factor(config.line_thickness_factor);
        if let Some(font_path) = &config.font_path {
            annotator = annotator.with_font_file(font_path);
        }

        Ok(Self::new(
            camera.name.clone(),
            Box::new(source),
            Box::new(detector),
            OverlapAnalyzer::new(config.hazard_pair, config.hazard_class_id),
            annotator,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alert(&self) -> &AlertState {
        &self.alert
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.source.is_exhausted()
    }

    /// 检测器输出中超出标签表或使用保留危险类别的类别ID
    fn malformed_classes(&self, detections: &[Detection]) -> BTreeSet<u32> {
        let hazard = self.analyzer.hazard_class_id();
        detections
            .iter()
            .map(|d| d.class_id)
            .filter(|&c| !self.labels.contains(c) || c == hazard)
            .collect()
    }

    /// 执行一次tick; 无帧时返回 None, 保留上一次的画面与告警状态
    pub fn tick(&mut self) -> Option<TickOutput> {
        let frame = self.source.read()?;

        let (raw, inference_failed) = match self.detector.infer(&frame) {
            Ok(dets) => (dets, false),
            Err(e) => {
                warn!(
                    "⚠️ [{}] 推理失败 (帧 #{}, {}): {:#}",
                    self.name,
                    frame.frame_id,
                    self.detector.name(),
                    e
                );
                (Vec::new(), true)
            }
        };

        let malformed_ids = self.malformed_classes(&raw);
        let malformed = raw
            .iter()
            .filter(|d| malformed_ids.contains(&d.class_id))
            .count();
        for id in &malformed_ids {
            warn!(
                "⚠️ [{}] 检测器类别与标签表不匹配: class_id {}, 标签表大小 {}",
                self.name,
                id,
                self.labels.len()
            );
        }

        let tagged = self.analyzer.tag(&raw);
        let annotated = self.annotator.render(&frame, &tagged.detections);

        let summaries: Vec<String> = tagged
            .detections
            .iter()
            .map(|d| summarize(d, &self.labels))
            .collect();

        let alert = if tagged.hazard {
            let (a, b) = self.analyzer.hazard_pair();
            AlertState::hazard(tagged.relabeled, self.labels.label(a), self.labels.label(b))
        } else {
            AlertState::normal()
        };

        debug!(
            "[{}] 帧 #{}: {} 个目标, 危险 {}",
            self.name,
            frame.frame_id,
            summaries.len(),
            tagged.relabeled
        );

        self.alert = alert.clone();
        self.last_frame = Some(annotated.clone());

        Some(TickOutput {
            camera: self.name.clone(),
            frame_id: frame.frame_id,
            annotated,
            summaries,
            alert,
            relabeled: tagged.relabeled,
            malformed,
            malformed_classes: malformed_ids.into_iter().collect(),
            inference_failed,
        })
    }
}
