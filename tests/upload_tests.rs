//! Client-side upload validation.

use lease_lens::error::LeaseLensError;
use lease_lens::upload::UploadPolicy;
use tempfile::TempDir;

fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.resize(len.max(bytes.len()), b'0');
    bytes
}

#[test]
fn accepts_small_pdf() {
    let upload = UploadPolicy::default()
        .validate("Lease.PDF", pdf_bytes(2048))
        .unwrap();
    assert_eq!(upload.file_name(), "Lease.PDF");
    assert_eq!(upload.size(), 2048);
}

#[test]
fn rejects_empty_file() {
    assert!(matches!(
        UploadPolicy::default().validate("lease.pdf", Vec::new()),
        Err(LeaseLensError::InvalidUpload { .. })
    ));
}

#[test]
fn rejects_wrong_extension() {
    assert!(matches!(
        UploadPolicy::default().validate("lease.docx", pdf_bytes(100)),
        Err(LeaseLensError::InvalidUpload { .. })
    ));
}

#[test]
fn rejects_renamed_non_pdf() {
    assert!(matches!(
        UploadPolicy::default().validate("lease.pdf", b"PK\x03\x04 zip data".to_vec()),
        Err(LeaseLensError::InvalidUpload { .. })
    ));
}

#[test]
fn rejects_oversized_file() {
    let policy = UploadPolicy::with_max_mb(1);
    assert!(policy.validate("lease.pdf", pdf_bytes(1024 * 1024)).is_ok());
    assert!(matches!(
        policy.validate("lease.pdf", pdf_bytes(1024 * 1024 + 1)),
        Err(LeaseLensError::InvalidUpload { .. })
    ));
}

#[test]
fn from_path_reads_and_validates() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("lease.pdf");
    std::fs::write(&path, pdf_bytes(512)).unwrap();

    let upload = UploadPolicy::default().from_path(&path).unwrap();
    assert_eq!(upload.file_name(), "lease.pdf");
    assert_eq!(upload.bytes().len(), 512);
}

#[test]
fn from_path_missing_file() {
    let tmp = TempDir::new().unwrap();
    assert!(matches!(
        UploadPolicy::default().from_path(&tmp.path().join("missing.pdf")),
        Err(LeaseLensError::InvalidUpload { .. })
    ));
}

#[test]
fn from_path_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("folder.pdf");
    std::fs::create_dir(&dir).unwrap();
    assert!(UploadPolicy::default().from_path(&dir).is_err());
}
