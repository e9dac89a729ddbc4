use crate::utils::error::{Result, RouterError};
use crate::utils::validation::validate_url;
use std::env;

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| RouterError::MissingConfigError {
        field: name.to_string(),
    })
}

/// Relational store credentials; the database name comes from the config.
#[derive(Debug, Clone)]
pub struct MysqlCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl MysqlCredentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: required("MYSQL_HOST")?,
            port: env::var("MYSQL_PORT")
                .unwrap_or_else(|_| "3306".to_string())
                .parse()
                .map_err(|_| RouterError::ConfigError {
                    message: "MYSQL_PORT must be a port number".to_string(),
                })?,
            user: required("MYSQL_USER")?,
            password: required("MYSQL_PASSWORD")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl AwsCredentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            access_key_id: required("AWS_ACCESS_KEY_ID")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        })
    }
}

impl Default for AwsCredentials {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            region: "us-east-1".to_string(),
        }
    }
}

/// TrafficPoint pixel endpoint credentials: a raw cookie header and the
/// pixel URL.
#[derive(Debug, Clone)]
pub struct PixelCredentials {
    pub cookie_header: String,
    pub pixel_url: String,
}

impl PixelCredentials {
    pub fn from_env() -> Result<Self> {
        let pixel_url = env::var("TRAFFICPOINT_PIXEL_URL")
            .unwrap_or_else(|_| "https://pixel.trafficpointltd.com/scraper".to_string());
        validate_url("TRAFFICPOINT_PIXEL_URL", &pixel_url)?;

        Ok(Self {
            cookie_header: required("TRAFFICPOINT_COOKIE")?,
            pixel_url,
        })
    }
}

impl Default for PixelCredentials {
    fn default() -> Self {
        Self {
            cookie_header: String::new(),
            pixel_url: "https://pixel.trafficpointltd.com/scraper".to_string(),
        }
    }
}
