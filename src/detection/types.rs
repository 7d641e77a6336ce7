// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 检测结果数据结构定义
/// Data structures for per-frame detection results
use image::Rgb;
use serde::{Deserialize, Serialize};

// ========== 公共常量 ==========

/// 危险标记类别 (合成类别, 检测器不会输出)
pub const HAZARD_CLASS_ID: u32 = 2;

/// 默认类别标签
pub const DEFAULT_LABELS: [&str; 3] = ["crane", "worker", "hazard"];

/// 默认颜色 (RGB): 吊车蓝, 工人绿, 危险红
pub const DEFAULT_COLORS: [(u8, u8, u8); 3] = [(0, 0, 255), (0, 255, 0), (255, 0, 0)];

// ========== 数据结构 ==========

/// 检测框 (x1, y1, x2, y2), 像素坐标
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 中心点格式 (cx, cy, w, h) → 角点格式
    pub fn from_xywh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - w / 2.,
            y1: cy - h / 2.,
            x2: cx + w / 2.,
            y2: cy + h / 2.,
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// 面积 (退化框为0)
    pub fn area(&self) -> f32 {
        self.width().max(0.) * self.height().max(0.)
    }

    /// 交集面积, 任一轴不重叠时为0
    pub fn intersection_area(&self, another: &BBox) -> f32 {
        let l = self.x1.max(another.x1);
        let r = self.x2.min(another.x2);
        let t = self.y1.max(another.y1);
        let b = self.y2.min(another.y2);
        (r - l).max(0.) * (b - t).max(0.)
    }

    pub fn union(&self, another: &BBox) -> f32 {
        self.area() + another.area() - self.intersection_area(another)
    }

    /// 交并比 (Jaccard index), 取值 [0, 1]
    pub fn iou(&self, another: &BBox) -> f32 {
        let union = self.union(another);
        if union <= 0. {
            return 0.;
        }
        self.intersection_area(another) / union
    }
}

/// 单个检测结果
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BBox,
    pub class_id: u32,
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BBox, class_id: u32, confidence: f32) -> Self {
        Self {
            bbox,
            class_id,
            confidence,
        }
    }
}

/// 一帧的检测结果, 保持检测器输出顺序
pub type DetectionSet = Vec<Detection>;

/// 类别标签表, 按 `class_id % len` 查找
#[derive(Clone, Debug, PartialEq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 类别ID是否落在表内 (未取模)
    pub fn contains(&self, class_id: u32) -> bool {
        (class_id as usize) < self.labels.len()
    }

    pub fn label(&self, class_id: u32) -> &str {
        if self.labels.is_empty() {
            return "?";
        }
        &self.labels[class_id as usize % self.labels.len()]
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().map(|s| s.to_string()).collect())
    }
}

/// 类别颜色表, 按 `class_id % len` 查找
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTable {
    colors: Vec<Rgb<u8>>,
}

impl ColorTable {
    pub fn new(colors: Vec<(u8, u8, u8)>) -> Self {
        Self {
            colors: colors.into_iter().map(|(r, g, b)| Rgb([r, g, b])).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, class_id: u32) -> Rgb<u8> {
        if self.colors.is_empty() {
            return Rgb([255, 255, 255]);
        }
        self.colors[class_id as usize % self.colors.len()]
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new(DEFAULT_COLORS.to_vec())
    }
}
