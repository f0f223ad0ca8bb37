// File transfer endpoints
//
// A transfer is three steps per file: `transfer/init` announces name, size
// and SHA-256; `transfer/upload` receives 1 MiB multipart chunks tagged with
// their byte offset; `transfer/finalize` asks the backend to assemble them.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{FileTransfer, FinalizeRequest, TransferInitRequest, TransferInitResponse};

/// Upload chunk size in bytes.
pub const CHUNK_SIZE: usize = 1024 * 1024;

impl BackendClient {
    /// Send one local file to a paired device.
    pub async fn send_file(&self, device_id: &str, path: &Path) -> Result<FileTransfer, Error> {
        let file_error = |source: std::io::Error| Error::File {
            path: path.to_path_buf(),
            source,
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                file_error(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no usable file name",
                ))
            })?
            .to_owned();

        let data = tokio::fs::read(path).await.map_err(file_error)?;
        let file_size = u64::try_from(data.len()).map_err(|_| {
            file_error(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "file too large to describe",
            ))
        })?;
        let file_hash = hex::encode(Sha256::digest(&data));

        let init: TransferInitResponse = self
            .post(
                self.api_url("transfer/init")?,
                &TransferInitRequest {
                    device_id,
                    file_name: &file_name,
                    file_size,
                    file_hash: file_hash.clone(),
                },
            )
            .await?;
        debug!(transfer_id = %init.transfer_id, file_name = %file_name, file_size, "transfer initialized");

        let upload_url = self.api_url("transfer/upload")?;
        for (index, chunk) in data.chunks(CHUNK_SIZE).enumerate() {
            let offset = index * CHUNK_SIZE;
            let form = Form::new()
                .text("transfer_id", init.transfer_id.clone())
                .text("offset", offset.to_string())
                .part("chunk", Part::bytes(chunk.to_vec()).file_name(file_name.clone()));

            let resp = self
                .http()
                .post(upload_url.clone())
                .multipart(form)
                .send()
                .await?;
            Self::check_status(resp).await?;
            debug!(transfer_id = %init.transfer_id, offset, len = chunk.len(), "chunk uploaded");
        }

        self.post_unit(
            self.api_url("transfer/finalize")?,
            &FinalizeRequest {
                transfer_id: &init.transfer_id,
            },
        )
        .await?;

        info!(transfer_id = %init.transfer_id, file_name = %file_name, device_id, "transfer complete");
        Ok(FileTransfer {
            transfer_id: init.transfer_id,
            file_name,
            file_size,
            file_hash,
        })
    }
}
