use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::validation::ValidationError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A profile image embedded inline as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    data_url: String,
}

impl ImageUpload {
    /// Validate an uploaded file. An empty upload (no file chosen) is `None`.
    ///
    /// The declared content type wins; when it is missing or generic the file
    /// name extension is used instead.
    pub fn from_parts(
        content_type: Option<&str>,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<Option<Self>, ValidationError> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let mime = resolve_mime(content_type, file_name).ok_or(ValidationError::NotAnImage)?;
        if !mime.starts_with("image/") {
            return Err(ValidationError::NotAnImage);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(too_large());
        }

        Ok(Some(Self {
            data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        }))
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn into_data_url(self) -> String {
        self.data_url
    }
}

/// The rejection for a file over `MAX_IMAGE_BYTES`.
pub fn too_large() -> ValidationError {
    ValidationError::ImageTooLarge {
        max_mb: MAX_IMAGE_BYTES / (1024 * 1024),
    }
}

fn resolve_mime(content_type: Option<&str>, file_name: Option<&str>) -> Option<String> {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    declared.or_else(|| {
        file_name
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|m| m.essence_str().to_string())
    })
}
