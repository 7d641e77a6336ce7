// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 检测器原始输出解析
//!
//! 每行一个检测: `[x1, y1, x2, y2, conf, cls]` 或 `[cx, cy, w, h, conf, cls]`

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::types::{BBox, Detection, DetectionSet};
use crate::error::ParseError;

/// 每行数值个数
pub const ROW_WIDTH: usize = 6;

/// 检测框坐标格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxLayout {
    #[default]
    Xyxy,
    Xywh,
}

fn parse_row(row: usize, values: &[f32], layout: BoxLayout) -> Result<Detection, ParseError> {
    if values.len() != ROW_WIDTH {
        return Err(ParseError::RowWidth {
            row,
            width: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ParseError::NonFinite { row });
    }

    let cls = values[5];
    if cls < 0. {
        return Err(ParseError::NegativeClass { row, value: cls });
    }

    let bbox = match layout {
        BoxLayout::Xyxy => BBox::new(values[0], values[1], values[2], values[3]),
        BoxLayout::Xywh => BBox::from_xywh(values[0], values[1], values[2], values[3]),
    };

    Ok(Detection::new(bbox, cls as u32, values[4].clamp(0., 1.)))
}

/// N×6 预测矩阵 → DetectionSet (保持行顺序)
pub fn parse_predictions(
    preds: ArrayView2<f32>,
    layout: BoxLayout,
) -> Result<DetectionSet, ParseError> {
    if preds.nrows() > 0 && preds.ncols() != ROW_WIDTH {
        return Err(ParseError::RowWidth {
            row: 0,
            width: preds.ncols(),
        });
    }
    preds
        .outer_iter()
        .enumerate()
        .map(|(i, row)| parse_row(i, &row.to_vec(), layout))
        .collect()
}

/// 逐行数值 → N×6 预测矩阵; 行宽不一致时报告首个错误行
pub fn rows_to_array(rows: &[Vec<f32>]) -> Result<Array2<f32>, ParseError> {
    if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != ROW_WIDTH) {
        return Err(ParseError::RowWidth {
            row,
            width: bad.len(),
        });
    }
    Ok(Array2::from_shape_fn((rows.len(), ROW_WIDTH), |(i, j)| {
        rows[i][j]
    }))
}

/// 逐行格式 (如JSON回放文件) → DetectionSet, 经由预测矩阵解析
pub fn parse_rows(rows: &[Vec<f32>], layout: BoxLayout) -> Result<DetectionSet, ParseError> {
    let preds = rows_to_array(rows)?;
    parse_predictions(preds.view(), layout)
}
