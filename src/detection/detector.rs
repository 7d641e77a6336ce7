// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 检测器接口 (Detector)
//! 职责: 帧 → DetectionSet. 模型加载与前向推理对流水线不透明

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use super::parse::{parse_rows, BoxLayout};
use super::types::DetectionSet;
use crate::error::SourceError;
use crate::input::Frame;

/// 统一的检测器接口
///
/// 推理失败返回 `Err`, 由流水线降级为空结果并告警
pub trait Detector {
    fn infer(&mut self, frame: &Frame) -> Result<DetectionSet>;

    /// 检测器名称 (用于日志)
    fn name(&self) -> &str;
}

/// 回放检测器: 每行一帧的JSON预测矩阵 `[[x1,y1,x2,y2,conf,cls], ...]`
pub struct ReplayDetector {
    name: String,
    lines: Lines<BufReader<File>>,
    layout: BoxLayout,
    line_no: usize,
}

impl ReplayDetector {
    pub fn open(path: impl AsRef<Path>, layout: BoxLayout) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("📦 回放检测结果: {}", path.display());
        Ok(Self {
            name: path.display().to_string(),
            lines: BufReader::new(file).lines(),
            layout,
            line_no: 0,
        })
    }
}

impl Detector for ReplayDetector {
    fn infer(&mut self, _frame: &Frame) -> Result<DetectionSet> {
        let Some(line) = self.lines.next() else {
            return Ok(Vec::new());
        };
        self.line_no += 1;
        let line = line.with_context(|| format!("line {}", self.line_no))?;
        if line.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Vec<f32>> = serde_json::from_str(&line)
            .with_context(|| format!("line {}: invalid prediction matrix", self.line_no))?;
        parse_rows(&rows, self.layout).with_context(|| format!("line {}", self.line_no))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 脚本检测器: 按顺序返回预设结果, `None` 表示推理失败. 耗尽后返回空结果
pub struct ScriptedDetector {
    script: VecDeque<Option<DetectionSet>>,
}

impl ScriptedDetector {
    pub fn new(script: impl IntoIterator<Item = Option<DetectionSet>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl Detector for ScriptedDetector {
    fn infer(&mut self, _frame: &Frame) -> Result<DetectionSet> {
        match self.script.pop_front() {
            Some(Some(dets)) => Ok(dets),
            Some(None) => Err(anyhow!("scripted inference failure")),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
