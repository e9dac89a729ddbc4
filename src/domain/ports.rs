use crate::domain::model::{BrandInfo, Record};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Dedup and upsert side of the relational store (`scraper_tokens`).
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Which of the given trx_ids already exist, fetched in one batched
    /// round trip.
    async fn find_existing(&self, trx_ids: &[String]) -> Result<HashSet<String>>;

    /// Idempotent upsert of delivered records; returns affected rows.
    async fn insert_tokens(&self, records: &[Record]) -> Result<u64>;
}

/// Brand-grouping lookup side of the relational store (`out_brands` joined
/// to `brands_groups`).
#[async_trait]
pub trait BrandStore: Send + Sync {
    /// Brand info for every io_id that has a match, in one multi-key query.
    /// Absent keys are simply missing from the map; callers apply the
    /// `{0, "Unknown"}` fallback.
    async fn brand_groups(&self, io_ids: &[String]) -> Result<HashMap<String, BrandInfo>>;
}

/// Object storage destination for the monthly CSV files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<()>;
}

/// Source of the externally translated dataset for the monthly path.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    async fn fetch_dataset(&self, node_name: &str) -> Result<Vec<Record>>;
}
