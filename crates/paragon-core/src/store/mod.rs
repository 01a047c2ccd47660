//! Source-folder and archive boundary.

mod local;

pub use local::LocalFolderStore;

use crate::error::StoreError;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A receipt file pending in the source folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage identifier; for the local store this is the file name. Also
    /// used as the receipt identifier on every spreadsheet row.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Declared content type, derived from the extension.
    pub kind: FileKind,
}

/// Recognized receipt file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Jpeg,
    Png,
    Heic,
    WebP,
}

impl FileKind {
    /// Map a lowercase file extension to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(FileKind::Pdf),
            "jpg" | "jpeg" => Some(FileKind::Jpeg),
            "png" => Some(FileKind::Png),
            "heic" => Some(FileKind::Heic),
            "webp" => Some(FileKind::WebP),
            _ => None,
        }
    }

    /// MIME type sent to the OCR service.
    pub fn mime(self) -> &'static str {
        match self {
            FileKind::Pdf => "application/pdf",
            FileKind::Jpeg => "image/jpeg",
            FileKind::Png => "image/png",
            FileKind::Heic => "image/heic",
            FileKind::WebP => "image/webp",
        }
    }

    /// Whether this is a PDF (eligible for the embedded-text shortcut).
    pub fn is_pdf(self) -> bool {
        matches!(self, FileKind::Pdf)
    }
}

/// Boundary to wherever receipt files live.
///
/// Archived and quarantined files must never reappear in `list_pending`;
/// that is the only reprocessing guard the pipeline has.
pub trait ReceiptStore {
    /// Files waiting to be processed, in a stable order.
    fn list_pending(&self) -> Result<Vec<StoredFile>>;

    /// Read a pending file's bytes.
    fn read(&self, file: &StoredFile) -> Result<Vec<u8>>;

    /// Move a fully processed file out of the pending set.
    fn archive(&self, file: &StoredFile) -> Result<()>;

    /// Move an unprocessable file out of the pending set.
    fn quarantine(&self, file: &StoredFile) -> Result<()>;
}
