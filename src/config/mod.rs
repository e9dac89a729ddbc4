pub mod credentials;

use crate::domain::model::ExecutionMode;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_s3_bucket_name, Validate};
use clap::Parser;

/// Invocation parameters. Defaults mirror the host node's option bag.
#[derive(Debug, Clone, Parser)]
#[command(name = "ryze-router")]
#[command(about = "Routes tracking records to the TrafficPoint pixel or to S3")]
pub struct RouterConfig {
    /// Scraper script ID, used in upload file names.
    #[arg(long)]
    pub script_id: String,

    /// Primary brand IO ID, used for the translated dataset.
    #[arg(long)]
    pub main_io_id: String,

    /// auto, forceRegular or forceMonthly.
    #[arg(long, default_value = "auto")]
    pub execution_mode: ExecutionMode,

    /// Test without sending or uploading anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Name of the upstream node holding translated data.
    #[arg(long, default_value = "Translator")]
    pub translator_node_name: String,

    /// Skip the MySQL deduplication check and send all records.
    #[arg(long)]
    pub skip_dedup: bool,

    #[arg(long, default_value = "ryze-data-brand-performance")]
    pub s3_bucket: String,

    #[arg(long)]
    pub verbose: bool,

    /// Emit logs as JSON lines instead of the compact console format.
    #[arg(long)]
    pub log_json: bool,

    /// Database holding the scraper_tokens table.
    #[arg(long, default_value = "cms")]
    pub mysql_database: String,

    /// Database holding the brands lookup tables.
    #[arg(long, default_value = "bo")]
    pub bo_database: String,

    /// JSON file with the record batch, or '-' for stdin.
    #[arg(long, default_value = "-")]
    pub input: String,
}

impl Validate for RouterConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("script_id", &self.script_id)?;
        validate_non_empty_string("main_io_id", &self.main_io_id)?;
        validate_non_empty_string("translator_node_name", &self.translator_node_name)?;
        validate_s3_bucket_name("s3_bucket", &self.s3_bucket)?;
        validate_non_empty_string("mysql_database", &self.mysql_database)?;
        validate_non_empty_string("bo_database", &self.bo_database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RouterConfig {
        RouterConfig::parse_from([
            "ryze-router",
            "--script-id",
            "2000",
            "--main-io-id",
            "545f8472fe0af42e7bbb6903",
        ])
    }

    #[test]
    fn test_defaults_match_the_option_bag() {
        let config = base_config();
        assert_eq!(config.execution_mode, ExecutionMode::Auto);
        assert!(!config.dry_run);
        assert!(!config.skip_dedup);
        assert!(!config.log_json);
        assert_eq!(config.translator_node_name, "Translator");
        assert_eq!(config.s3_bucket, "ryze-data-brand-performance");
        assert_eq!(config.mysql_database, "cms");
        assert_eq!(config.bo_database, "bo");
    }

    #[test]
    fn test_execution_mode_parses_host_values() {
        let config = RouterConfig::parse_from([
            "ryze-router",
            "--script-id",
            "2000",
            "--main-io-id",
            "io",
            "--execution-mode",
            "forceMonthly",
        ]);
        assert_eq!(config.execution_mode, ExecutionMode::ForceMonthly);
    }

    #[test]
    fn test_log_json_flag_parses() {
        let config = RouterConfig::parse_from([
            "ryze-router",
            "--script-id",
            "2000",
            "--main-io-id",
            "io",
            "--log-json",
        ]);
        assert!(config.log_json);
    }

    #[test]
    fn test_validate_rejects_blank_ids() {
        let mut config = base_config();
        config.script_id = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bucket() {
        let mut config = base_config();
        config.s3_bucket = "Bad_Bucket".to_string();
        assert!(config.validate().is_err());
    }
}
