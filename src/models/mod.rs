pub mod publish;
pub mod video;

pub use publish::{PublishRequest, RunSummary};
pub use video::{NewVideo, VideoRecord, VideoStatus};
