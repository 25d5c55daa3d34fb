use crate::error::GatewayError;
use crate::transform::SubmissionPayload;
use crate::value::{PendingFile, UploadedFile};

/// The external collaborator that stores uploaded files and receives submissions.
///
/// Implementations own the transport (HTTP client, retries, authentication). The
/// engine awaits every call in sequence and never runs two at once.
#[allow(async_fn_in_trait)]
pub trait SubmissionGateway {
    /// Uploads the pending files of one field and returns one reference per file,
    /// in the same order.
    async fn upload_files(
        &self,
        field_key: &str,
        files: &[PendingFile],
    ) -> Result<Vec<UploadedFile>, GatewayError>;

    /// Submits a flattened payload and returns the backend's response.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<serde_json::Value, GatewayError>;
}
