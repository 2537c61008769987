use crate::analysis::AnalysisError;
use crate::workflow::SelectedFile;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;

/// MIME fallback when the extension gives no hint; scanned tax notices are
/// almost always images.
const FALLBACK_MIME: &str = "image/png";

/// Base64 document content plus MIME type, ready for an inlineData part.
/// Built once per run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub data: String,
    pub mime_type: String,
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => FALLBACK_MIME,
    }
}

/// Reads the complete file content and encodes it for transport. The read is
/// all-or-nothing; a failure carries the display name so the whole batch can
/// be rejected with a useful operator log line.
pub async fn encode_file(file: &SelectedFile) -> Result<EncodedPayload, AnalysisError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|source| AnalysisError::FileRead {
            name: file.name.clone(),
            source,
        })?;

    Ok(EncodedPayload {
        data: STANDARD.encode(&bytes),
        mime_type: mime_for_path(&file.path).to_string(),
    })
}
