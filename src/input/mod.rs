// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
/// 视频输入系统 (Video Input System)
///
/// 每路摄像头独占一个帧源, 每次tick拉取至多一帧
/// - ImageSequenceSource: 图片目录按文件名顺序回放
/// - ChannelSource:       外部解码线程通过channel推帧
pub mod frame;
pub mod source;

pub use frame::Frame;
pub use source::{frame_channel, ChannelSource, FrameFeed, FrameSource, ImageSequenceSource};
