// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 画面标注 (Frame Annotator)
//! 职责: 在帧的副本上绘制检测框与类别标签, 颜色按 (可能已改标的) 类别选取

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{info, warn};

use crate::detection::types::{ColorTable, Detection, LabelTable};
use crate::input::Frame;

/// 线宽系数: round(0.002 * (w + h) / 2) + 1
pub const DEFAULT_THICKNESS_FACTOR: f32 = 0.002;

/// 标签背景相对文字的留白 (像素)
pub const LABEL_PADDING: u32 = 3;

/// 标签文字颜色
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// 内置标签字体 (DejaVu Sans), `font_path` 未配置时使用
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/font/DejaVuSans.ttf");

fn bundled_font() -> Option<FontVec> {
    match FontVec::try_from_vec(BUNDLED_FONT.to_vec()) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("⚠️ 内置标签字体解析失败: {}", e);
            None
        }
    }
}

pub struct FrameAnnotator {
    colors: ColorTable,
    labels: LabelTable,
    thickness_factor: f32,
    font: Option<FontVec>,
}

impl FrameAnnotator {
    pub fn new(colors: ColorTable, labels: LabelTable) -> Self {
        Self {
            colors,
            labels,
            thickness_factor: DEFAULT_THICKNESS_FACTOR,
            font: bundled_font(),
        }
    }

    pub fn with_thickness_factor(mut self, factor: f32) -> Self {
        self.thickness_factor = factor;
        self
    }

    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    /// 从字体文件加载标签字体, 失败时保留当前字体
    pub fn with_font_file(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let font = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| FontVec::try_from_vec(bytes).map_err(|e| e.to_string()));
        match font {
            Ok(font) => {
                info!("✅ 标签字体加载成功: {}", path.display());
                self.with_font(font)
            }
            Err(e) => {
                warn!("⚠️ 标签字体加载失败 {}: {}", path.display(), e);
                self
            }
        }
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// 线宽, 随画面尺寸缩放, 最小为1
    pub fn line_thickness(&self, width: u32, height: u32) -> u32 {
        let scaled = (self.thickness_factor * (width + height) as f32 / 2.).round();
        (scaled.max(0.) as u32 + 1).max(1)
    }

    fn label_scale(thickness: u32) -> PxScale {
        PxScale::from(4. + 7. * thickness as f32)
    }

    /// 文字渲染尺寸; 无字体时按等宽字形估算
    pub fn text_extent(&self, text: &str, scale: PxScale) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(scale, font, text),
            None => {
                let glyph_w = (scale.x * 3. / 5.).ceil() as u32;
                (glyph_w * text.chars().count() as u32, scale.y.ceil() as u32)
            }
        }
    }

    /// 在副本上绘制, 不修改输入帧
    pub fn render(&self, frame: &Frame, detections: &[Detection]) -> Frame {
        let mut out = frame.clone();
        if detections.is_empty() {
            return out;
        }

        let tl = self.line_thickness(frame.width(), frame.height());
        let scale = Self::label_scale(tl);
        let img = &mut out.image;

        for det in detections {
            let color = self.colors.color(det.class_id);
            let label = self.labels.label(det.class_id);

            // 先裁剪到画面外扩一个线宽的范围, 再转整数
            let margin = tl as f32;
            let clip_x = |v: f32| v.clamp(-margin, frame.width() as f32 + margin) as i32;
            let clip_y = |v: f32| v.clamp(-margin, frame.height() as f32 + margin) as i32;
            let (x1, y1) = (clip_x(det.bbox.x1), clip_y(det.bbox.y1));
            let (x2, y2) = (clip_x(det.bbox.x2), clip_y(det.bbox.y2));

            // 边框: 向内逐层绘制, 包含 (x2, y2)
            for t in 0..tl as i32 {
                let w = x2 - x1 + 1 - 2 * t;
                let h = y2 - y1 + 1 - 2 * t;
                if w <= 0 || h <= 0 {
                    break;
                }
                draw_hollow_rect_mut(
                    img,
                    Rect::at(x1 + t, y1 + t).of_size(w as u32, h as u32),
                    color,
                );
            }

            // 标签背景: 以左上角为锚点, 向右上方延伸
            let (tw, th) = self.text_extent(label, scale);
            let bg_h = th + LABEL_PADDING;
            let bg_y = y1.saturating_sub(bg_h as i32);
            if tw > 0 {
                draw_filled_rect_mut(img, Rect::at(x1, bg_y).of_size(tw, bg_h), color);
            }

            if let Some(font) = &self.font {
                draw_text_mut(img, TEXT_COLOR, x1, bg_y + 1, scale, font, label);
            }
        }

        out
    }
}

impl Default for FrameAnnotator {
    fn default() -> Self {
        Self::new(ColorTable::default(), LabelTable::default())
    }
}
