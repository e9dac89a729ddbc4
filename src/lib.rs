pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{MySqlStore, NoopUpstreamSource, S3ObjectStore};
pub use crate::config::credentials::{AwsCredentials, MysqlCredentials, PixelCredentials};
pub use crate::config::RouterConfig;
pub use crate::core::delivery::PixelClient;
pub use crate::core::router::Router;
pub use crate::domain::model::{Mode, Record, Report};
pub use crate::utils::error::{Result, RouterError};
