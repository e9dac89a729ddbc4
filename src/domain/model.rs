use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const DRY_RUN_SKIPPED: &str = "DRY_RUN_SKIPPED";

/// One tracked event, as a flat ordered map of named fields. Records are
/// immutable inputs; annotated copies are produced instead of mutating.
///
/// Field order is preserved (serde_json `preserve_order`), so CSV headers
/// and payloads are deterministic for a given input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    pub fn trx_id(&self) -> Option<&str> {
        self.str_field("trx_id")
    }

    pub fn io_id(&self) -> Option<&str> {
        self.str_field("io_id")
    }

    /// Field rendered as plain text: strings verbatim, other values via their
    /// JSON representation, absent fields as the empty string.
    pub fn text_field(&self, name: &str) -> String {
        match self.data.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(v) => v.to_string(),
        }
    }

    /// Copy of this record with a `status` annotation appended.
    pub fn with_status(&self, status: &str) -> Record {
        let mut data = self.data.clone();
        data.insert("status".to_string(), Value::String(status.to_string()));
        Record { data }
    }
}

/// Reduced view of a record whose delivery was rejected or errored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedDelivery {
    pub trx_id: String,
    pub io_id: Value,
    pub error: String,
    pub amount: Value,
    pub commission_amount: Value,
}

impl FailedDelivery {
    pub fn from_record(record: &Record, error: String) -> Self {
        Self {
            trx_id: record.trx_id().unwrap_or_default().to_string(),
            io_id: record.field("io_id").cloned().unwrap_or(Value::Null),
            error,
            amount: record.field("amount").cloned().unwrap_or(Value::Null),
            commission_amount: record
                .field("commission_amount")
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

/// Partition of a delivery run. Every input record lands in exactly one of
/// the two lists, in input order.
#[derive(Debug, Clone, Default)]
pub struct DeliveryOutcome {
    pub success: Vec<Record>,
    pub failed: Vec<FailedDelivery>,
}

/// Resolved brand grouping for one io_id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandInfo {
    pub brand_group_id: i64,
    pub brand_group_name: String,
}

impl BrandInfo {
    pub fn unknown() -> Self {
        Self {
            brand_group_id: 0,
            brand_group_name: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadKind {
    Translated,
    Processed,
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadKind::Translated => write!(f, "Translated"),
            UploadKind::Processed => write!(f, "Processed"),
        }
    }
}

/// Descriptor of one file placement. Live uploads carry the destination and
/// measured size; dry runs carry the would-be path and an estimate instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    #[serde(rename = "type")]
    pub kind: UploadKind,
    pub io_id: String,
    pub brand_group_id: i64,
    pub brand_group_name: String,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_kb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_upload_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_size_kb: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// The resolved execution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Regular,
    Monthly,
}

/// The requested execution mode, before resolution against the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "forceRegular")]
    ForceRegular,
    #[serde(rename = "forceMonthly")]
    ForceMonthly,
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ExecutionMode::Auto),
            "forceRegular" => Ok(ExecutionMode::ForceRegular),
            "forceMonthly" => Ok(ExecutionMode::ForceMonthly),
            other => Err(format!(
                "unknown execution mode '{}' (expected auto, forceRegular or forceMonthly)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub mode: Mode,
    pub dry_run: bool,
    pub timestamp: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegularSummary {
    pub total_input: usize,
    pub duplicates_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_send_to_pixel: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_to_pixel: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_success: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted_to_db: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub translated_rows: usize,
    pub processed_rows: usize,
    pub brands_processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_create_files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_created: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Regular(RegularSummary),
    Monthly(MonthlySummary),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegularDetails {
    pub duplicate_trx_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_events_preview: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_events_total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_sends: Option<Vec<FailedDelivery>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql_check_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_send_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql_insert_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql_queries_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_generation_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_upload_total_ms: Option<u64>,
}

/// The sole output artifact of one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub execution: Execution,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<RegularDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploads: Option<Vec<UploadRecord>>,
    pub metrics: Metrics,
}
