use super::{FormPhase, FormStore};
use crate::error::{GatewayError, SubmitError};
use crate::gateway::SubmissionGateway;
use crate::transform::to_payload;
use crate::validation::validate_form;
use crate::value::{FieldValue, FileRef, FormValues, PendingFile};
use tracing::{error, info, warn};

impl FormStore {
    /// Uploads pending files, validates the whole form, and submits the payload.
    ///
    /// The order is fixed: upload, then validate, then transform and submit. All of
    /// it runs on a copy of the values, so a failure at any point leaves the stored
    /// values exactly as they were. On success the store is cleared; on failure it
    /// returns to `Ready` and, for upload and gateway failures, records the message
    /// in `submit_error`. Validation failures become the displayed errors and move
    /// the current step to the first step with an error.
    pub async fn submit<G: SubmissionGateway>(
        &mut self,
        gateway: &G,
    ) -> Result<serde_json::Value, SubmitError> {
        match self.phase {
            FormPhase::Ready => {}
            FormPhase::Submitting => return Err(SubmitError::AlreadySubmitting),
            FormPhase::Uninitialized | FormPhase::Cleared => return Err(SubmitError::NotReady),
        }

        self.phase = FormPhase::Submitting;
        self.submit_error = None;
        info!("Submitting form with {} field(s)", self.values.len());

        let outcome = self.run_submission(gateway).await;
        match outcome {
            Ok(response) => {
                info!("Form submitted");
                self.reset();
                Ok(response)
            }
            Err(failure) => {
                self.phase = FormPhase::Ready;
                match &failure {
                    SubmitError::Invalid {
                        errors,
                        first_error_step,
                    } => {
                        warn!("Submission blocked by {} validation error(s)", errors.len());
                        self.displayed_errors = errors.clone();
                        if let Some(step) = first_error_step {
                            self.current_step = *step;
                        }
                    }
                    other => {
                        error!("Form submission error: {}", other);
                        self.submit_error = Some(other.to_string());
                    }
                }
                Err(failure)
            }
        }
    }

    async fn run_submission<G: SubmissionGateway>(
        &self,
        gateway: &G,
    ) -> Result<serde_json::Value, SubmitError> {
        let mut values = self.values.clone();
        upload_pending_files(&mut values, gateway).await?;

        let report = validate_form(&self.steps, &values, &self.triage_answers);
        if !report.is_valid() {
            return Err(SubmitError::Invalid {
                errors: report.errors,
                first_error_step: report.first_error_step,
            });
        }

        let payload = to_payload(&values);
        gateway
            .submit(&payload)
            .await
            .map_err(SubmitError::Rejected)
    }
}

/// Replaces every pending file with the reference the gateway returns for it.
async fn upload_pending_files<G: SubmissionGateway>(
    values: &mut FormValues,
    gateway: &G,
) -> Result<(), SubmitError> {
    for (key, value) in values.iter_mut() {
        let FieldValue::Files(files) = value else {
            continue;
        };
        let pending: Vec<PendingFile> = files
            .iter()
            .filter_map(|file| match file {
                FileRef::Pending(pending) => Some(pending.clone()),
                FileRef::Uploaded(_) => None,
            })
            .collect();
        if pending.is_empty() {
            continue;
        }

        let uploaded = gateway
            .upload_files(key, &pending)
            .await
            .map_err(|source| SubmitError::Upload {
                field: key.clone(),
                source,
            })?;
        if uploaded.len() != pending.len() {
            return Err(SubmitError::Upload {
                field: key.clone(),
                source: GatewayError::UploadCountMismatch {
                    sent: pending.len(),
                    returned: uploaded.len(),
                },
            });
        }

        let mut uploaded = uploaded.into_iter();
        for file in files.iter_mut().filter(|file| file.is_pending()) {
            if let Some(reference) = uploaded.next() {
                *file = FileRef::Uploaded(reference);
            }
        }
    }
    Ok(())
}
