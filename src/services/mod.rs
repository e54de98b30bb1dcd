pub mod ai_service;
pub mod catalogue;
pub mod request_builder;

pub use ai_service::AiService;
pub use catalogue::CatalogueService;
pub use request_builder::RequestBuilder;
