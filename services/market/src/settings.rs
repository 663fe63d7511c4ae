//! Service settings loaded from `MARKET_*` environment variables

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Default cap on upload request bodies (10 MiB)
pub const DEFAULT_UPLOAD_LIMIT_BYTES: i64 = 10 << 20;

/// Market service settings
///
/// # Environment Variables
/// - `MARKET_BIND_ADDRESS`: listen address (default: "0.0.0.0:3002")
/// - `MARKET_PHOTO_BUCKET`: S3 bucket for product photos (default: "product-photos")
/// - `MARKET_PHOTO_KEY_PREFIX`: key prefix for photo objects (default: "products")
/// - `MARKET_PHOTO_PUBLIC_BASE_URL`: base URL used to build photo links (optional)
/// - `MARKET_UPLOAD_LIMIT_BYTES`: maximum request body for uploads (default: 10 MiB)
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: String,
    pub photo_bucket: String,
    pub photo_key_prefix: String,
    pub photo_public_base_url: Option<String>,
    pub upload_limit_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix("MARKET"))
    }

    fn load(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("bind_address", "0.0.0.0:3002")?
            .set_default("photo_bucket", "product-photos")?
            .set_default("photo_key_prefix", "products")?
            .set_default("upload_limit_bytes", DEFAULT_UPLOAD_LIMIT_BYTES)?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        if settings.photo_bucket.trim().is_empty() {
            anyhow::bail!("MARKET_PHOTO_BUCKET must not be empty");
        }

        Ok(settings)
    }
}
