use crate::config::RouterConfig;
use crate::core::csv::to_csv;
use crate::core::delivery::PixelClient;
use crate::core::group::group_by_io_id;
use crate::core::mode::{previous_month, resolve_mode};
use crate::domain::model::{
    BrandInfo, DeliveryOutcome, Execution, Metrics, Mode, MonthlySummary, Record, RegularDetails,
    RegularSummary, Report, Summary, UploadKind, UploadRecord, DRY_RUN_SKIPPED,
};
use crate::domain::ports::{BrandStore, ObjectStore, TokenStore, UpstreamSource};
use crate::utils::error::{Result, RouterError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashSet;
use std::time::Instant;

const UPLOAD_PREFIX: &str = "AutomationDiscrepancy";
const PREVIEW_LIMIT: usize = 10;

/// Dual-mode delivery orchestrator.
///
/// One invocation takes a record batch and produces exactly one [`Report`].
/// The regular path dedups against the token store and delivers to the
/// pixel endpoint; the monthly path groups by io_id and materializes CSV
/// files in object storage. Dry runs keep the read-only lookups but replace
/// every mutating step with a `DRY_RUN_SKIPPED` marker.
pub struct Router<T, B, O, U> {
    tokens: T,
    brands: B,
    objects: O,
    upstream: U,
    pixel: PixelClient,
    config: RouterConfig,
}

#[derive(Default)]
struct UploadTimings {
    csv_generation_ms: u64,
    s3_upload_total_ms: u64,
}

impl<T, B, O, U> Router<T, B, O, U>
where
    T: TokenStore,
    B: BrandStore,
    O: ObjectStore,
    U: UpstreamSource,
{
    pub fn new(
        tokens: T,
        brands: B,
        objects: O,
        upstream: U,
        pixel: PixelClient,
        config: RouterConfig,
    ) -> Self {
        Self {
            tokens,
            brands,
            objects,
            upstream,
            pixel,
            config,
        }
    }

    /// Run one invocation to completion. Any failure past the per-record
    /// delivery boundary aborts the whole run and is wrapped once into a
    /// user-facing error; no partial report is emitted.
    pub async fn execute(&self, batch: Vec<Record>) -> Result<Report> {
        let started = Instant::now();
        let now = Utc::now();

        self.run(batch, now, started)
            .await
            .map_err(|e| RouterError::ExecutionError {
                message: format!("Ryze Automation Router failed: {}", e),
                description: "An error occurred during execution".to_string(),
                item_index: 0,
            })
    }

    async fn run(
        &self,
        batch: Vec<Record>,
        now: DateTime<Utc>,
        started: Instant,
    ) -> Result<Report> {
        let mode = resolve_mode(now, self.config.execution_mode);
        tracing::info!(
            total_input = batch.len(),
            ?mode,
            dry_run = self.config.dry_run,
            "starting invocation"
        );

        match mode {
            Mode::Regular => self.run_regular(batch, now, started).await,
            Mode::Monthly => self.run_monthly(batch, now, started).await,
        }
    }

    async fn run_regular(
        &self,
        batch: Vec<Record>,
        now: DateTime<Utc>,
        started: Instant,
    ) -> Result<Report> {
        let dry_run = self.config.dry_run;

        // dedup, payload and upsert are all keyed on trx_id
        let trx_ids = collect_trx_ids(&batch)?;

        let check_start = Instant::now();
        let mut duplicates: Vec<String> = Vec::new();
        let mut to_send = batch.clone();
        if !self.config.skip_dedup {
            let existing = self.tokens.find_existing(&trx_ids).await?;
            let mut seen = HashSet::new();
            for id in &trx_ids {
                if existing.contains(id) && seen.insert(id.clone()) {
                    duplicates.push(id.clone());
                }
            }
            to_send = batch
                .iter()
                .filter(|r| !existing.contains(r.trx_id().unwrap_or_default()))
                .cloned()
                .collect();
        }
        let mysql_check_ms = elapsed_ms(check_start);
        tracing::debug!(
            duplicates = duplicates.len(),
            to_send = to_send.len(),
            "dedup gate done"
        );

        let mut outcome = DeliveryOutcome::default();
        let mut pixel_send_ms = 0;
        if !dry_run && !to_send.is_empty() {
            let pixel_start = Instant::now();
            outcome = self.pixel.deliver(&to_send).await;
            pixel_send_ms = elapsed_ms(pixel_start);
            tracing::info!(
                success = outcome.success.len(),
                failed = outcome.failed.len(),
                "pixel delivery done"
            );
        }

        let mut inserted = 0;
        let mut mysql_insert_ms = 0;
        if !dry_run && !outcome.success.is_empty() {
            let insert_start = Instant::now();
            inserted = self.tokens.insert_tokens(&outcome.success).await?;
            mysql_insert_ms = elapsed_ms(insert_start);
        }

        let mut summary = RegularSummary {
            total_input: batch.len(),
            duplicates_found: duplicates.len(),
            ..Default::default()
        };
        let mut details = RegularDetails {
            duplicate_trx_ids: duplicates,
            ..Default::default()
        };
        let mut metrics = Metrics {
            mysql_check_ms: Some(mysql_check_ms),
            ..Default::default()
        };

        if dry_run {
            summary.would_send_to_pixel = Some(to_send.len());
            summary.status = Some(DRY_RUN_SKIPPED.to_string());
            details.new_events_preview =
                Some(to_send.iter().take(PREVIEW_LIMIT).cloned().collect());
            details.new_events_total = Some(to_send.len());
        } else {
            summary.sent_to_pixel = Some(to_send.len());
            summary.pixel_success = Some(outcome.success.len());
            summary.pixel_failed = Some(outcome.failed.len());
            summary.inserted_to_db = Some(inserted);
            details.failed_sends = Some(outcome.failed);
            metrics.pixel_send_ms = Some(pixel_send_ms);
            metrics.mysql_insert_ms = Some(mysql_insert_ms);
        }

        Ok(Report {
            execution: execution(Mode::Regular, dry_run, now, started),
            summary: Summary::Regular(summary),
            details: Some(details),
            uploads: None,
            metrics,
        })
    }

    async fn run_monthly(
        &self,
        batch: Vec<Record>,
        now: DateTime<Utc>,
        started: Instant,
    ) -> Result<Report> {
        let dry_run = self.config.dry_run;

        let mysql_start = Instant::now();
        let translated = self
            .upstream
            .fetch_dataset(&self.config.translator_node_name)
            .await?;
        let grouped = group_by_io_id(&batch)?;

        // one multi-key lookup covering the main io_id and every group key
        let mut keys: Vec<String> = Vec::new();
        if !translated.is_empty() {
            keys.push(self.config.main_io_id.clone());
        }
        for key in grouped.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        let brands = self.brands.brand_groups(&keys).await?;
        let mysql_queries_ms = elapsed_ms(mysql_start);

        let (year, month) = previous_month(now);
        tracing::debug!(
            translated = translated.len(),
            groups = grouped.len(),
            partition = %format!("{}/{}", year, month),
            "monthly run prepared"
        );

        let mut uploads = Vec::new();
        let mut timings = UploadTimings::default();

        if !translated.is_empty() {
            let brand = brands
                .get(&self.config.main_io_id)
                .cloned()
                .unwrap_or_else(BrandInfo::unknown);
            uploads.push(
                self.publish_csv(
                    UploadKind::Translated,
                    &self.config.main_io_id,
                    &translated,
                    brand,
                    year,
                    &month,
                    &mut timings,
                )
                .await?,
            );
        }

        for (io_id, records) in &grouped {
            let brand = brands.get(io_id).cloned().unwrap_or_else(BrandInfo::unknown);
            uploads.push(
                self.publish_csv(
                    UploadKind::Processed,
                    io_id,
                    records,
                    brand,
                    year,
                    &month,
                    &mut timings,
                )
                .await?,
            );
        }

        let mut summary = MonthlySummary {
            translated_rows: translated.len(),
            processed_rows: batch.len(),
            brands_processed: grouped.len(),
            ..Default::default()
        };
        let mut metrics = Metrics {
            mysql_queries_ms: Some(mysql_queries_ms),
            csv_generation_ms: Some(timings.csv_generation_ms),
            ..Default::default()
        };

        if dry_run {
            summary.would_create_files = Some(uploads.len());
            summary.status = Some(DRY_RUN_SKIPPED.to_string());
        } else {
            summary.files_created = Some(uploads.len());
            metrics.s3_upload_total_ms = Some(timings.s3_upload_total_ms);
        }

        Ok(Report {
            execution: execution(Mode::Monthly, dry_run, now, started),
            summary: Summary::Monthly(summary),
            details: None,
            uploads: Some(uploads),
            metrics,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn publish_csv(
        &self,
        kind: UploadKind,
        io_id: &str,
        records: &[Record],
        brand: BrandInfo,
        year: i32,
        month: &str,
        timings: &mut UploadTimings,
    ) -> Result<UploadRecord> {
        let csv_start = Instant::now();
        let csv = to_csv(records);
        timings.csv_generation_ms += elapsed_ms(csv_start);

        let path = format!(
            "{}/{}/{}/{}/{}_{}_{}.csv",
            UPLOAD_PREFIX, year, month, brand.brand_group_id, io_id, self.config.script_id, kind
        );
        let size_bytes = csv.len() as u64;
        let size_kb = (size_bytes as f64 / 1024.0).round() as u64;

        let mut upload = UploadRecord {
            kind,
            io_id: io_id.to_string(),
            brand_group_id: brand.brand_group_id,
            brand_group_name: brand.brand_group_name,
            rows: records.len(),
            path: None,
            s3_url: None,
            size_bytes: None,
            size_kb: None,
            upload_duration_ms: None,
            would_upload_to: None,
            estimated_size_kb: None,
            status: None,
        };

        if self.config.dry_run {
            upload.would_upload_to = Some(path);
            upload.estimated_size_kb = Some(size_kb);
            upload.status = Some(DRY_RUN_SKIPPED.to_string());
        } else {
            let upload_start = Instant::now();
            self.objects.put(&path, csv.as_bytes(), "text/csv").await?;
            let upload_ms = elapsed_ms(upload_start);
            timings.s3_upload_total_ms += upload_ms;

            tracing::info!(%path, rows = records.len(), "uploaded csv");
            upload.s3_url = Some(format!("s3://{}/{}", self.config.s3_bucket, path));
            upload.path = Some(path);
            upload.size_bytes = Some(size_bytes);
            upload.size_kb = Some(size_kb);
            upload.upload_duration_ms = Some(upload_ms);
        }

        Ok(upload)
    }
}

fn collect_trx_ids(batch: &[Record]) -> Result<Vec<String>> {
    batch
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .trx_id()
                .map(str::to_string)
                .ok_or(RouterError::MissingTrxId { index })
        })
        .collect()
}

fn execution(mode: Mode, dry_run: bool, now: DateTime<Utc>, started: Instant) -> Execution {
    Execution {
        mode,
        dry_run,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        duration_ms: elapsed_ms(started),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
