use crate::api::error::AppError;
use crate::services::storage::StorageService;
use crate::utils::keyed_mutex::KeyedMutex;
use crate::utils::validation::{detect_media_type, storage_key, validate_file_size};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadedMedia {
    pub key: String,
    /// Public URL; paste it into any image or audio field.
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

pub struct MediaService {
    storage: Arc<dyn StorageService>,
    max_upload_size: usize,
    in_flight: KeyedMutex,
}

impl MediaService {
    pub fn new(storage: Arc<dyn StorageService>, max_upload_size: usize) -> Self {
        Self {
            storage,
            max_upload_size,
            in_flight: KeyedMutex::new(),
        }
    }

    /// Stores one image or audio file and returns its public URL.
    ///
    /// Each admin may have a single upload in flight.
    pub async fn upload(
        &self,
        admin_id: &str,
        file_name: &str,
        declared_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<UploadedMedia, AppError> {
        let guard = self
            .in_flight
            .try_lock(admin_id)
            .ok_or_else(|| AppError::Conflict("Upload already in progress".to_string()))?;

        let result = self.store(file_name, declared_type, data).await;
        drop(guard);
        self.in_flight.cleanup();
        result
    }

    async fn store(
        &self,
        file_name: &str,
        declared_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<UploadedMedia, AppError> {
        let size = data.len();
        validate_file_size(size, self.max_upload_size).map_err(|e| {
            if size == 0 {
                AppError::BadRequest(e.to_string())
            } else {
                AppError::PayloadTooLarge(e.to_string())
            }
        })?;

        let content_type = detect_media_type(&data[..size.min(512)], declared_type)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let key = storage_key(file_name, Utc::now());
        info!("📤 Uploading '{}' as {} ({} bytes)", file_name, key, size);

        self.storage
            .upload_file(&key, data, &content_type)
            .await
            .map_err(|e| {
                error!("❌ Media upload failed for {}: {}", key, e);
                AppError::Backend(format!("Upload failed: {}", e))
            })?;

        let url = self.storage.public_url(&key);
        Ok(UploadedMedia {
            key,
            url,
            content_type,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;
    use tokio::sync::Notify;

    const PNG: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    #[derive(Default)]
    struct MemoryStorage {
        objects: DashMap<String, (Vec<u8>, String)>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl StorageService for MemoryStorage {
        async fn upload_file(&self, key: &str, data: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.objects
                .insert(key.to_string(), (data, content_type.to_string()));
            Ok(())
        }

        async fn file_exists(&self, key: &str) -> anyhow::Result<bool> {
            Ok(self.objects.contains_key(key))
        }

        fn public_url(&self, key: &str) -> String {
            format!("http://cdn.test/media/{}", key)
        }
    }

    #[tokio::test]
    async fn upload_stores_object_and_returns_public_url() {
        let storage = Arc::new(MemoryStorage::default());
        let service = MediaService::new(storage.clone(), 1024);

        let uploaded = service
            .upload("admin-1", "bayon face.png", Some("image/png"), PNG.to_vec())
            .await
            .unwrap();

        assert!(uploaded.key.ends_with("_bayon_face_png.png"));
        assert_eq!(uploaded.url, format!("http://cdn.test/media/{}", uploaded.key));
        assert_eq!(uploaded.content_type, "image/png");
        assert!(storage.file_exists(&uploaded.key).await.unwrap());
        assert!(service.in_flight.is_empty());
    }

    #[tokio::test]
    async fn rejects_oversized_and_non_media_files() {
        let service = MediaService::new(Arc::new(MemoryStorage::default()), 8);

        let err = service
            .upload("admin-1", "big.png", None, PNG.to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));

        let err = service
            .upload("admin-1", "notes.txt", Some("text/plain"), b"hello".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(service.in_flight.is_empty());
    }

    #[tokio::test]
    async fn second_upload_from_same_admin_conflicts() {
        let gate = Arc::new(Notify::new());
        let storage = Arc::new(MemoryStorage {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let service = Arc::new(MediaService::new(storage, 1024));

        let first = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .upload("admin-1", "a.png", None, PNG.to_vec())
                    .await
            })
        };
        // Let the first upload take the lock and park on the gate.
        while service.in_flight.try_lock("admin-1").is_some() {
            tokio::task::yield_now().await;
        }

        let err = service
            .upload("admin-1", "b.png", None, PNG.to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert!(service.in_flight.is_empty());
    }
}
