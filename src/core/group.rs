use crate::domain::model::Record;
use crate::utils::error::{Result, RouterError};
use indexmap::IndexMap;

/// Partition records by `io_id`, preserving first-seen key order and
/// within-group input order. A record without a string `io_id` is a hard
/// validation error rather than a silent placeholder bucket.
pub fn group_by_io_id(records: &[Record]) -> Result<IndexMap<String, Vec<Record>>> {
    let mut grouped: IndexMap<String, Vec<Record>> = IndexMap::new();

    for (index, record) in records.iter().enumerate() {
        let io_id = record
            .io_id()
            .ok_or(RouterError::MissingGroupingKey { index })?;
        grouped
            .entry(io_id.to_string())
            .or_default()
            .push(record.clone());
    }

    Ok(grouped)
}
