pub mod error;
pub mod http_client;
pub mod models;

pub use error::CmsClientError;
pub use http_client::CmsClient;
