// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//! 帧源 (Frame Source)
//!
//! `read()` 返回 `None` 表示本次tick无帧, 不是错误

use std::path::{Path, PathBuf};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use tracing::{debug, info, warn};

use super::frame::Frame;
use crate::error::SourceError;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

pub trait FrameSource {
    /// 拉取一帧, 无帧时返回 None
    fn read(&mut self) -> Option<Frame>;

    /// 帧源是否已经不会再产生新帧
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// 图片目录帧源, 按文件名排序逐帧回放
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    next_id: u64,
}

impl ImageSequenceSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        if paths.is_empty() {
            return Err(SourceError::Empty(dir.to_path_buf()));
        }
        paths.sort();

        info!("📂 图片帧源: {} ({} 帧)", dir.display(), paths.len());
        Ok(Self::from_paths(paths))
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            cursor: 0,
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn read(&mut self) -> Option<Frame> {
        let path = self.paths.get(self.cursor)?;
        self.cursor += 1;

        match image::open(path) {
            Ok(img) => {
                let frame = Frame::new(img.to_rgb8(), self.next_id);
                self.next_id += 1;
                Some(frame)
            }
            Err(e) => {
                warn!("⚠️ 图片读取失败 {}: {}", path.display(), e);
                None
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.paths.len()
    }
}

/// 解码线程一侧的推帧句柄, 队列满时丢帧
pub struct FrameFeed {
    tx: Sender<Frame>,
    next_id: u64,
    pub dropped_frames: u64,
}

impl FrameFeed {
    /// 推送一帧, 返回是否入队
    pub fn push(&mut self, image: image::RgbImage) -> bool {
        let frame = Frame::new(image, self.next_id);
        self.next_id += 1;
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped_frames += 1;
                debug!("队列已满, 丢弃帧 #{}", self.next_id - 1);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// 从channel非阻塞拉帧的帧源
pub struct ChannelSource {
    rx: Receiver<Frame>,
    disconnected: bool,
}

impl ChannelSource {
    pub fn new(rx: Receiver<Frame>) -> Self {
        Self {
            rx,
            disconnected: false,
        }
    }
}

impl FrameSource for ChannelSource {
    fn read(&mut self) -> Option<Frame> {
        match self.rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.disconnected
    }
}

/// 创建有界帧队列: (解码端, 帧源端)
pub fn frame_channel(capacity: usize) -> (FrameFeed, ChannelSource) {
    let (tx, rx) = bounded(capacity);
    (
        FrameFeed {
            tx,
            next_id: 0,
            dropped_frames: 0,
        },
        ChannelSource::new(rx),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_channel_source_empty_is_miss() {
        let (mut feed, mut source) = frame_channel(2);
        assert!(source.read().is_none());
        assert!(!source.is_exhausted());

        assert!(feed.push(RgbImage::new(4, 4)));
        assert!(feed.push(RgbImage::new(4, 4)));
        assert!(!feed.push(RgbImage::new(4, 4)));
        assert_eq!(feed.dropped_frames, 1);

        assert_eq!(source.read().map(|f| f.frame_id), Some(0));
        assert_eq!(source.read().map(|f| f.frame_id), Some(1));
        assert!(source.read().is_none());
    }

    #[test]
    fn test_channel_source_disconnect() {
        let (feed, mut source) = frame_channel(1);
        drop(feed);
        assert!(source.read().is_none());
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_image_sequence_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "notes.txt"] {
            let path = dir.path().join(name);
            if name.ends_with(".png") {
                RgbImage::from_pixel(3, 2, image::Rgb([9, 9, 9]))
                    .save(&path)
                    .unwrap();
            } else {
                std::fs::write(&path, "x").unwrap();
            }
        }

        let mut source = ImageSequenceSource::open(dir.path()).unwrap();
        assert_eq!(source.len(), 2);
        let first = source.read().unwrap();
        assert_eq!((first.width(), first.height(), first.frame_id), (3, 2, 0));
        assert_eq!(source.read().unwrap().frame_id, 1);
        assert!(source.is_exhausted());
        assert!(source.read().is_none());
    }

    #[test]
    fn test_image_sequence_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequenceSource::open(dir.path()),
            Err(SourceError::Empty(_))
        ));
        assert!(matches!(
            ImageSequenceSource::open(dir.path().join("nope")),
            Err(SourceError::Io { .. })
        ));
    }
}
