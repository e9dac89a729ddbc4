use chrono::Utc;
use clap::Parser;
use ryze_router::core::mode::resolve_mode;
use ryze_router::utils::{logger, validation::Validate};
use ryze_router::{
    AwsCredentials, Mode, MysqlCredentials, MySqlStore, NoopUpstreamSource, PixelClient,
    PixelCredentials, Record, RouterConfig, Router, S3ObjectStore,
};
use std::io::Read;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RouterConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting ryze-router");
    if config.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let batch = match read_batch(&config.input) {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!("❌ Failed to read input batch: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    // credentials follow the resolved path: the pixel cookie is only needed
    // for regular runs, the AWS keys only for monthly runs
    let mode = resolve_mode(Utc::now(), config.execution_mode);
    let (mysql, pixel, aws) = match load_credentials(mode) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!("❌ Credential resolution failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    let tokens = MySqlStore::connect_lazy(&mysql, &config.mysql_database);
    let brands = MySqlStore::connect_lazy(&mysql, &config.bo_database);
    let objects = S3ObjectStore::new(&aws, config.s3_bucket.clone()).await;
    let pixel_client = PixelClient::new(pixel.pixel_url, pixel.cookie_header);

    let router = Router::new(
        tokens,
        brands,
        objects,
        NoopUpstreamSource,
        pixel_client,
        config,
    );

    match router.execute(batch).await {
        Ok(report) => {
            tracing::info!("✅ Invocation completed");
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Invocation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn load_credentials(
    mode: Mode,
) -> ryze_router::Result<(MysqlCredentials, PixelCredentials, AwsCredentials)> {
    let mysql = MysqlCredentials::from_env()?;
    let (pixel, aws) = match mode {
        Mode::Regular => (PixelCredentials::from_env()?, AwsCredentials::default()),
        Mode::Monthly => (PixelCredentials::default(), AwsCredentials::from_env()?),
    };
    Ok((mysql, pixel, aws))
}

fn read_batch(input: &str) -> ryze_router::Result<Vec<Record>> {
    let text = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(input)?
    };

    Ok(serde_json::from_str(&text)?)
}
