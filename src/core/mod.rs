pub mod csv;
pub mod delivery;
pub mod group;
pub mod mode;
pub mod router;

pub use crate::domain::model::{DeliveryOutcome, Mode, Record, Report};
pub use crate::domain::ports::{BrandStore, ObjectStore, TokenStore, UpstreamSource};
pub use crate::utils::error::Result;
