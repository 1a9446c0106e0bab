//! S3-compatible buckets (AWS S3 and MinIO) built with the object_store crate

use object_store::{aws::AmazonS3Builder, ObjectStore as ObjectStoreBackend};
use std::sync::Arc;

/// Configuration for an S3-compatible bucket
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Custom endpoint, e.g. a MinIO server; `None` means AWS
    pub endpoint: Option<String>,
    /// Permit plain-HTTP endpoints
    pub allow_http: bool,
}

impl S3Config {
    /// Where objects of this bucket can be fetched from publicly
    pub fn default_public_base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

/// Create an S3 store from configuration
pub fn create_s3_store(
    config: &S3Config,
) -> Result<Arc<dyn ObjectStoreBackend>, object_store::Error> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_allow_http(config.allow_http);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false);
    }

    let store = builder.build()?;

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: Option<&str>) -> S3Config {
        S3Config {
            bucket: "car-photos".to_string(),
            region: "eu-north-1".to_string(),
            access_key: Some("key".to_string()),
            secret_key: Some("secret".to_string()),
            endpoint: endpoint.map(str::to_string),
            allow_http: true,
        }
    }

    #[test]
    fn test_public_base_url() {
        assert_eq!(
            config(None).default_public_base_url(),
            "https://car-photos.s3.eu-north-1.amazonaws.com"
        );
        assert_eq!(
            config(Some("http://localhost:9000/")).default_public_base_url(),
            "http://localhost:9000/car-photos"
        );
    }

    #[test]
    fn test_create_minio_store() {
        assert!(create_s3_store(&config(Some("http://localhost:9000"))).is_ok());
    }
}
