//! Object storage for product photos

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::{Client, primitives::ByteStream};
use tracing::info;
use uuid::Uuid;

use crate::models::{Photo, PhotoUpload};

/// Destination for uploaded product photos
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store one photo for the user `owner` and return its metadata
    async fn store(&self, owner: i64, upload: PhotoUpload) -> Result<Photo>;
}

/// Build the object key for a photo: `<prefix>/<owner>/<uuid>[.<ext>]`
pub fn object_key(prefix: &str, owner: i64, upload: &PhotoUpload) -> String {
    let name = match upload.extension() {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}/{}", owner, name)
    } else {
        format!("{}/{}/{}", prefix, owner, name)
    }
}

/// S3 backed photo store
#[derive(Clone)]
pub struct S3PhotoStore {
    s3_client: Client,
    bucket: String,
    key_prefix: String,
    public_base_url: String,
}

impl S3PhotoStore {
    pub fn new(
        s3_client: Client,
        bucket: String,
        key_prefix: String,
        public_base_url: Option<String>,
    ) -> Self {
        let public_base_url = public_base_url
            .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", bucket))
            .trim_end_matches('/')
            .to_string();

        Self {
            s3_client,
            bucket,
            key_prefix,
            public_base_url,
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl PhotoStore for S3PhotoStore {
    async fn store(&self, owner: i64, upload: PhotoUpload) -> Result<Photo> {
        let key = object_key(&self.key_prefix, owner, &upload);
        let content_type = upload.content_type().to_string();
        let size = upload.size();

        info!("Uploading photo to S3: {}/{}", self.bucket, key);

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(upload.data))
            .content_type(&content_type)
            .send()
            .await?;

        Ok(Photo {
            bucket: self.bucket.clone(),
            url: self.public_url(&key),
            object: key,
            content_type,
            size,
        })
    }
}
