//! 流程层
//!
//! 定义"一个视频"从目录记录到发布结果的完整处理流程，
//! 以及向前端汇报进度的观察者接口。
//!
//! 本层不做批次调度（那是编排层的职责），也不持有浏览器资源。

pub mod progress;
pub mod publish_flow;

pub use progress::{ItemFailure, ItemProgress, LogSink, NullSink, ProgressSink};
pub use publish_flow::{ItemOutcome, PublishCtx, PublishFlow};
