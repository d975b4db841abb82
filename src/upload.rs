use std::path::Path;

use crate::error::{LeaseLensError, Result};

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 10;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A file that passed client-side validation and may be sent for analysis.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl ValidatedUpload {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Client-side checks applied before anything is uploaded.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::with_max_mb(DEFAULT_MAX_UPLOAD_MB)
    }
}

impl UploadPolicy {
    pub fn with_max_mb(max_mb: u64) -> Self {
        Self {
            max_bytes: max_mb.saturating_mul(1024 * 1024),
        }
    }

    /// Accept a PDF within the size limit; reject everything else early.
    pub fn validate(&self, file_name: &str, bytes: Vec<u8>) -> Result<ValidatedUpload> {
        if bytes.is_empty() {
            return Err(LeaseLensError::InvalidUpload {
                reason: format!("{file_name} is empty"),
            });
        }
        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(LeaseLensError::InvalidUpload {
                reason: format!(
                    "{} is {} bytes; the limit is {} bytes",
                    file_name, size, self.max_bytes
                ),
            });
        }
        let has_pdf_extension = Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !has_pdf_extension || !bytes.starts_with(PDF_MAGIC) {
            return Err(LeaseLensError::InvalidUpload {
                reason: format!("{file_name} is not a PDF document"),
            });
        }

        Ok(ValidatedUpload {
            file_name: file_name.to_string(),
            bytes,
        })
    }

    /// Read a file from disk and validate it.
    pub fn from_path(&self, path: &Path) -> Result<ValidatedUpload> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| LeaseLensError::InvalidUpload {
                reason: format!("{} is not a file", path.display()),
            })?;

        // Check the size before reading the whole file into memory.
        let metadata = std::fs::metadata(path).map_err(|e| LeaseLensError::InvalidUpload {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        if !metadata.is_file() {
            return Err(LeaseLensError::InvalidUpload {
                reason: format!("{} is not a file", path.display()),
            });
        }
        if metadata.len() > self.max_bytes {
            return Err(LeaseLensError::InvalidUpload {
                reason: format!(
                    "{} is {} bytes; the limit is {} bytes",
                    file_name,
                    metadata.len(),
                    self.max_bytes
                ),
            });
        }

        let bytes = std::fs::read(path)?;
        self.validate(&file_name, bytes)
    }
}
