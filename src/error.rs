// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// 检测器原始输出解析错误
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("row {row}: expected 6 values, got {width}")]
    RowWidth { row: usize, width: usize },

    #[error("row {row}: non-finite value")]
    NonFinite { row: usize },

    #[error("row {row}: negative class id {value}")]
    NegativeClass { row: usize, value: f32 },
}

/// 配置加载与校验错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("camera {0}: no stream source configured")]
    MissingSource(String),

    #[error("camera {0}: no model configured")]
    MissingModel(String),

    #[error("no cameras configured")]
    NoCameras,

    #[error("label table is empty")]
    EmptyLabels,

    #[error("hazard pair ({0}, {1}) must name two different classes inside the label table")]
    InvalidHazardPair(u32, u32),

    #[error("{table} table has {len} entries, hazard class id {hazard} is not covered")]
    HazardNotCovered {
        table: &'static str,
        len: usize,
        hazard: u32,
    },
}

/// 帧源打开错误
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no images found in {0}")]
    Empty(PathBuf),
}
