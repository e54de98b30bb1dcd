//! 编排层
//!
//! ## 职责
//!
//! 批量发布的调度中心：
//!
//! - `batch_publisher` - 批量发布器（顺序执行、单飞保护、限速、取消）
//!
//! ## 层次关系
//!
//! ```text
//! batch_publisher (处理 Vec<id>)
//!     ↓
//! workflow::PublishFlow (处理单个视频)
//!     ↓
//! services (能力层：request_builder / ai)
//!     ↓
//! store / uploader (外部协作者：目录存储 / 发布后端)
//! ```
//!
//! ## 设计原则
//!
//! 1. 严格按给定顺序逐个发布，绝不并行（平台限速的刻意取舍）
//! 2. 单条失败就地计数上报，不中止批次
//! 3. 只做调度和统计，不做具体发布动作

pub mod batch_publisher;

pub use batch_publisher::{BatchPublisher, CancelHandle};
