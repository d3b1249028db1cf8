use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates upload size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<()> {
    if size > max_size {
        return Err(anyhow!(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                max_size,
                max_size / 1024 / 1024
            ),
        }));
    }
    if size == 0 {
        return Err(anyhow!(ValidationError {
            code: "EMPTY_FILE",
            message: "File appears to be empty".to_string(),
        }));
    }
    Ok(())
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Builds the object key for an uploaded file:
/// `<unix millis>_<sanitized original name>.<sanitized extension>`.
///
/// The sanitized name keeps the original extension folded in (`photo.jpg`
/// becomes `photo_jpg`), so two files differing only by extension never
/// share a key. Names without a `.` get no suffix.
pub fn storage_key(file_name: &str, now: DateTime<Utc>) -> String {
    let clean_name = sanitize_component(file_name);
    let millis = now.timestamp_millis();

    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            format!("{}_{}.{}", millis, clean_name, sanitize_component(ext))
        }
        _ => format!("{}_{}", millis, clean_name),
    }
}

/// Determines the media type of an upload.
///
/// Magic bytes win; the declared multipart type is used only when sniffing
/// finds nothing. Anything that is not an image or audio is rejected.
pub fn detect_media_type(header: &[u8], declared: Option<&str>) -> Result<String> {
    let sniffed = infer::get(header).map(|kind| kind.mime_type().to_string());
    let declared = declared
        .map(|d| d.split(';').next().unwrap_or("").trim().to_lowercase())
        .filter(|d| !d.is_empty());

    let mime = sniffed.or(declared).unwrap_or_default();

    if mime.starts_with("image/") || mime.starts_with("audio/") {
        Ok(mime)
    } else {
        Err(anyhow!(ValidationError {
            code: "INVALID_MEDIA_TYPE",
            message: format!(
                "Media type '{}' is not allowed. Only images and audio are accepted.",
                if mime.is_empty() { "unknown" } else { &mime }
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_millis(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn storage_key_prefixes_timestamp_and_keeps_extension() {
        let key = storage_key("Angkor Wat (sunrise).jpg", at_millis(1_700_000_000_123));
        assert_eq!(key, "1700000000123_Angkor_Wat__sunrise__jpg.jpg");
    }

    #[test]
    fn storage_key_without_extension_has_no_suffix() {
        let key = storage_key("README", at_millis(42));
        assert_eq!(key, "42_README");
    }

    #[test]
    fn storage_key_sanitizes_extension() {
        let key = storage_key("clip.m p3", at_millis(7));
        assert_eq!(key, "7_clip_m_p3.m_p3");
    }

    #[test]
    fn storage_key_replaces_non_ascii() {
        let key = storage_key("ប្រាសាទ.png", at_millis(1));
        assert!(key.starts_with("1_"));
        assert!(key.ends_with(".png"));
        assert!(key.trim_end_matches(".png")[2..].chars().all(|c| c == '_' || c.is_ascii_alphanumeric()));
    }

    #[test]
    fn detects_png_from_magic_bytes() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(detect_media_type(&png, Some("text/plain")).unwrap(), "image/png");
    }

    #[test]
    fn falls_back_to_declared_audio_type() {
        let mime = detect_media_type(b"not really sniffable", Some("audio/mpeg; charset=binary")).unwrap();
        assert_eq!(mime, "audio/mpeg");
    }

    #[test]
    fn rejects_non_media() {
        let pdf = b"%PDF-1.7\n";
        assert!(detect_media_type(pdf, Some("image/png")).is_err());
        assert!(detect_media_type(b"plain", None).is_err());
    }

    #[test]
    fn rejects_oversized_and_empty_files() {
        assert!(validate_file_size(11, 10).is_err());
        assert!(validate_file_size(0, 10).is_err());
        assert!(validate_file_size(10, 10).is_ok());
    }
}
