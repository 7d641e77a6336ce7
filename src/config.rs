// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 监控配置 - 通过JSON文件与命令行调整参数

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::detection::parse::BoxLayout;
use crate::detection::types::{
    ColorTable, LabelTable, DEFAULT_COLORS, DEFAULT_LABELS, HAZARD_CLASS_ID,
};
use crate::error::ConfigError;
use crate::renderer::annotator::DEFAULT_THICKNESS_FACTOR;

/// 双路摄像头危险接近监控
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about = "吊车-工人危险接近监控", long_about = None)]
pub struct Args {
    /// JSON配置文件
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 摄像头1 帧源 (图片目录)
    #[arg(long)]
    pub source1: Option<String>,

    /// 摄像头2 帧源 (图片目录)
    #[arg(long)]
    pub source2: Option<String>,

    /// 摄像头1 检测结果回放文件 (JSON lines)
    #[arg(long)]
    pub model1: Option<String>,

    /// 摄像头2 检测结果回放文件 (JSON lines)
    #[arg(long)]
    pub model2: Option<String>,

    /// 最大tick数, 0表示直到帧源耗尽
    #[arg(short, long, default_value_t = 0)]
    pub ticks: u64,

    /// 每路摄像头独立线程运行
    #[arg(long)]
    pub parallel: bool,

    /// 告警帧截图目录
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,
}

/// 单路摄像头配置
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub name: String,
    pub source: String, // 帧源
    pub model: String,  // 检测器 (回放文件)
}

/// 监控参数配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    // === 类别 ===
    pub labels: Vec<String>,
    pub colors: Vec<(u8, u8, u8)>,
    pub hazard_pair: (u32, u32), // (A, B), B 为改标主体
    pub hazard_class_id: u32,

    // === 调度 ===
    pub tick_interval_ms: u64,

    // === 绘制 ===
    pub line_thickness_factor: f32,
    pub font_path: Option<PathBuf>, // 未配置时使用内置字体

    // === 输入/输出 ===
    pub box_layout: BoxLayout,
    pub snapshot_dir: Option<PathBuf>,
    pub cameras: Vec<CameraConfig>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
            colors: DEFAULT_COLORS.to_vec(),
            hazard_pair: (0, 1),
            hazard_class_id: HAZARD_CLASS_ID,

            tick_interval_ms: 30,

            line_thickness_factor: DEFAULT_THICKNESS_FACTOR,
            font_path: None,

            box_layout: BoxLayout::Xyxy,
            snapshot_dir: None,
            cameras: vec![
                CameraConfig {
                    name: "camera1".into(),
                    ..Default::default()
                },
                CameraConfig {
                    name: "camera2".into(),
                    ..Default::default()
                },
            ],
        }
    }
}

impl WatchConfig {
    /// 从JSON文件加载配置, 失败时使用默认值
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                info!("✅ 配置已从 {} 加载", path.display());
                config
            }
            Err(e) => {
                warn!("⚠️ {}, 使用默认值", e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 命令行参数覆盖配置文件
    pub fn apply_args(&mut self, args: &Args) {
        let overrides = [
            (0, args.source1.as_ref(), args.model1.as_ref()),
            (1, args.source2.as_ref(), args.model2.as_ref()),
        ];
        for (idx, source, model) in overrides {
            if source.is_none() && model.is_none() {
                continue;
            }
            while self.cameras.len() <= idx {
                let name = format!("camera{}", self.cameras.len() + 1);
                self.cameras.push(CameraConfig {
                    name,
                    ..Default::default()
                });
            }
            let camera = &mut self.cameras[idx];
            if let Some(source) = source {
                camera.source = source.clone();
            }
            if let Some(model) = model {
                camera.model = model.clone();
            }
        }
        if args.snapshot_dir.is_some() {
            self.snapshot_dir = args.snapshot_dir.clone();
        }
    }

    /// 启动前校验: 每路摄像头必须同时配置帧源与模型
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cameras.is_empty() {
            return Err(ConfigError::NoCameras);
        }
        for camera in &self.cameras {
            if camera.source.trim().is_empty() {
                return Err(ConfigError::MissingSource(camera.name.clone()));
            }
            if camera.model.trim().is_empty() {
                return Err(ConfigError::MissingModel(camera.name.clone()));
            }
        }

        if self.labels.is_empty() {
            return Err(ConfigError::EmptyLabels);
        }
        let (a, b) = self.hazard_pair;
        let n = self.labels.len() as u32;
        if a == b || a >= n || b >= n || a == self.hazard_class_id || b == self.hazard_class_id {
            return Err(ConfigError::InvalidHazardPair(a, b));
        }

        // 两张表都需覆盖危险类别, 避免取模后与普通类别混淆
        let hazard = self.hazard_class_id;
        if hazard as usize >= self.labels.len() {
            return Err(ConfigError::HazardNotCovered {
                table: "label",
                len: self.labels.len(),
                hazard,
            });
        }
        if hazard as usize >= self.colors.len() {
            return Err(ConfigError::HazardNotCovered {
                table: "color",
                len: self.colors.len(),
                hazard,
            });
        }
        Ok(())
    }

    pub fn label_table(&self) -> LabelTable {
        LabelTable::new(self.labels.clone())
    }

    pub fn color_table(&self) -> ColorTable {
        ColorTable::new(self.colors.clone())
    }
}
