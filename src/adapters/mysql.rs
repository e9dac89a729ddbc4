use crate::config::credentials::MysqlCredentials;
use crate::domain::model::{BrandInfo, Record};
use crate::domain::ports::{BrandStore, TokenStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Row;
use std::collections::{HashMap, HashSet};

/// Pooled store over one MySQL database. The tokens database (`cms`) and
/// the brands database (`bo`) each get their own instance; the pool scopes
/// connection acquisition per query and releases on every exit path.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Lazily-connecting pool; nothing is dialed until the first query.
    pub fn connect_lazy(credentials: &MysqlCredentials, database: &str) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&credentials.host)
            .port(credentials.port)
            .username(&credentials.user)
            .password(&credentials.password)
            .database(database);

        let pool = MySqlPoolOptions::new().connect_lazy_with(options);
        Self { pool }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

fn find_existing_sql(count: usize) -> String {
    format!(
        "SELECT trx_id FROM scraper_tokens WHERE trx_id IN ({})",
        placeholders(count)
    )
}

fn insert_tokens_sql(count: usize) -> String {
    // no-op update on conflict keeps re-runs of the same trx_id idempotent
    let values = vec!["(?, ?, ?, 'scraper', NOW())"; count].join(",");
    format!(
        "INSERT INTO scraper_tokens (trx_id, amount, commission_amount, stream, created_at) \
         VALUES {} \
         ON DUPLICATE KEY UPDATE trx_id = trx_id",
        values
    )
}

fn brand_groups_sql(count: usize) -> String {
    format!(
        "SELECT b.mongodb_id AS io_id, bg.id AS brand_group_id, bg.name AS brand_group_name \
         FROM out_brands AS b \
         LEFT JOIN brands_groups AS bg ON b.brands_group_id = bg.id \
         WHERE b.mongodb_id IN ({})",
        placeholders(count)
    )
}

#[async_trait]
impl TokenStore for MySqlStore {
    async fn find_existing(&self, trx_ids: &[String]) -> Result<HashSet<String>> {
        if trx_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let sql = find_existing_sql(trx_ids.len());
        let mut query = sqlx::query(&sql);
        for trx_id in trx_ids {
            query = query.bind(trx_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut existing = HashSet::with_capacity(rows.len());
        for row in &rows {
            existing.insert(row.try_get("trx_id")?);
        }
        Ok(existing)
    }

    async fn insert_tokens(&self, records: &[Record]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let sql = insert_tokens_sql(records.len());
        let mut query = sqlx::query(&sql);
        for record in records {
            query = query
                .bind(record.trx_id().unwrap_or_default().to_string())
                .bind(record.text_field("amount"))
                .bind(record.text_field("commission_amount"));
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BrandStore for MySqlStore {
    async fn brand_groups(&self, io_ids: &[String]) -> Result<HashMap<String, BrandInfo>> {
        if io_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = brand_groups_sql(io_ids.len());
        let mut query = sqlx::query(&sql);
        for io_id in io_ids {
            query = query.bind(io_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut brands = HashMap::with_capacity(rows.len());
        for row in &rows {
            let io_id: String = row.try_get("io_id")?;
            let brand_group_id: Option<i64> = row.try_get("brand_group_id")?;
            let brand_group_name: Option<String> = row.try_get("brand_group_name")?;

            // first match per key wins, mirroring the old LIMIT 1 lookup
            brands.entry(io_id).or_insert(BrandInfo {
                brand_group_id: brand_group_id.unwrap_or(0),
                brand_group_name: brand_group_name.unwrap_or_else(|| "Unknown".to_string()),
            });
        }
        Ok(brands)
    }
}
