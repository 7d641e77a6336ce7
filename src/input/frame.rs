// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 视频帧 (RGB8, 通道顺序 R,G,B)
use image::RgbImage;

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub image: RgbImage,
    pub frame_id: u64, // 帧序号
}

impl Frame {
    pub fn new(image: RgbImage, frame_id: u64) -> Self {
        Self { image, frame_id }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
