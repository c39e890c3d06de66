//! Object Storage Module
//!
//! S3-compatible object storage client used to mint pre-signed upload
//! URLs. The server never proxies file bytes: clients PUT directly to
//! the bucket and then reference the resulting object URL.

use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use uuid::Uuid;

use crate::config::StorageSettings;
use crate::shared::error::AppError;

/// File extensions accepted for uploads.
pub const ALLOWED_FILETYPES: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// MIME type for an accepted extension, or None when unsupported.
pub fn content_type_for(filetype: &str) -> Option<&'static str> {
    match filetype {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Generate a unique object key under the given prefix.
pub fn generate_object_key(prefix: &str, filetype: &str) -> String {
    format!("{}/{}.{}", prefix, Uuid::new_v4().simple(), filetype)
}

/// A pre-signed upload grant.
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    /// Signed PUT URL the client uploads the file to
    pub presigned_url: String,
    /// Public URL the object will be reachable at after upload
    pub file_url: String,
    /// Object key within the bucket
    pub key: String,
}

/// S3-compatible object storage client.
pub struct ObjectStorage {
    client: Client,
    settings: StorageSettings,
}

impl ObjectStorage {
    /// Build a client from storage settings. A configured endpoint
    /// switches to path-style addressing for MinIO-style deployments.
    pub fn new(settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "chirp-server",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            settings: settings.clone(),
        }
    }

    /// Mint a pre-signed PUT URL for a fresh object key.
    ///
    /// The extension is validated against [`ALLOWED_FILETYPES`]; anything
    /// else is rejected before touching the signer.
    pub async fn presigned_upload_url(
        &self,
        prefix: &str,
        filetype: &str,
    ) -> Result<PresignedUpload, AppError> {
        let extension = filetype.trim_start_matches('.').to_lowercase();
        let content_type = content_type_for(&extension).ok_or_else(|| {
            AppError::Validation(format!(
                "Unsupported filetype '{}', expected one of: {}",
                filetype,
                ALLOWED_FILETYPES.join(", ")
            ))
        })?;

        let key = generate_object_key(prefix, &extension);

        let presign_config =
            PresigningConfig::expires_in(Duration::from_secs(self.settings.presign_expiry_secs))
                .map_err(|e| AppError::Internal(format!("Invalid presign expiry: {}", e)))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.settings.bucket)
            .key(&key)
            .content_type(content_type)
            .presigned(presign_config)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to presign upload: {}", e)))?;

        Ok(PresignedUpload {
            presigned_url: presigned.uri().to_string(),
            file_url: self.settings.object_url(&key),
            key,
        })
    }
}
