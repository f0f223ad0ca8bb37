use bridgex_api::FileTransfer;

/// Result of a send-file intent: one entry per uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferHandle {
    pub device_id: String,
    pub files: Vec<FileTransfer>,
}

impl TransferHandle {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.file_size).sum()
    }
}
