//! Preview-then-delete workflow for price records

use tracing::{debug, info, warn};

use crate::api::{ApiClient, DeletePreview, DeleteResult};
use crate::error::{Error, ErrorKind, Result};

/// Records of one item selected for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeleteTarget {
    pub(crate) store: String,
    pub(crate) item_id: String,
    pub(crate) record_ids: Vec<i64>,
}

pub(crate) trait DeleteBackend {
    async fn delete_preview(&self, target: &DeleteTarget) -> Result<DeletePreview>;
    async fn delete_records(&self, target: &DeleteTarget, password: Option<&str>) -> Result<DeleteResult>;
}

impl DeleteBackend for ApiClient {
    async fn delete_preview(&self, target: &DeleteTarget) -> Result<DeletePreview> {
        ApiClient::delete_preview(self, &target.store, &target.item_id, &target.record_ids).await
    }

    async fn delete_records(&self, target: &DeleteTarget, password: Option<&str>) -> Result<DeleteResult> {
        ApiClient::delete_records(
            self,
            &target.store,
            &target.item_id,
            &target.record_ids,
            password,
        )
        .await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DeleteStep {
    Idle,
    Previewing,
    AwaitingConfirmation(DeletePreview),
    Deleting,
    Done(DeleteResult),
    Failed(String),
}

pub(crate) struct DeleteFlow {
    target: DeleteTarget,
    password_required: bool,
    step: DeleteStep,
}

impl DeleteFlow {
    pub(crate) fn new(target: DeleteTarget, password_required: bool) -> Result<Self> {
        if target.record_ids.is_empty() {
            return Err(Error::Validation("Select at least one record to delete".to_string()));
        }
        Ok(Self {
            target,
            password_required,
            step: DeleteStep::Idle,
        })
    }

    pub(crate) fn target(&self) -> &DeleteTarget {
        &self.target
    }

    pub(crate) fn step(&self) -> &DeleteStep {
        &self.step
    }

    /// Local check, no request involved
    pub(crate) fn validate_password(&self, password: Option<&str>) -> Result<()> {
        let missing = password.is_none_or(|p| p.trim().is_empty());
        if self.password_required && missing {
            return Err(Error::Validation("A password is required to delete records".to_string()));
        }
        Ok(())
    }

    /// Fetch what would be deleted and wait for confirmation
    pub(crate) async fn preview<B: DeleteBackend>(&mut self, backend: &B) -> Result<DeletePreview> {
        self.step = DeleteStep::Previewing;
        debug!(store = %self.target.store, item = %self.target.item_id, records = self.target.record_ids.len(), "delete preview");
        match backend.delete_preview(&self.target).await {
            Ok(preview) => {
                self.step = DeleteStep::AwaitingConfirmation(preview.clone());
                Ok(preview)
            }
            Err(e) => {
                warn!(error = %e, "delete preview failed");
                self.step = DeleteStep::Failed(e.user_message());
                Err(e)
            }
        }
    }

    /// Delete the previewed records. Validation and authentication failures
    /// leave the confirmation open so another password can be tried.
    pub(crate) async fn confirm<B: DeleteBackend>(
        &mut self,
        backend: &B,
        password: Option<&str>,
    ) -> Result<DeleteResult> {
        let preview = match &self.step {
            DeleteStep::AwaitingConfirmation(preview) => preview.clone(),
            _ => return Err(Error::Validation("Nothing to confirm; preview the deletion first".to_string())),
        };
        self.validate_password(password)?;

        self.step = DeleteStep::Deleting;
        match backend.delete_records(&self.target, password).await {
            Ok(result) => {
                info!(
                    store = %self.target.store,
                    item = %self.target.item_id,
                    records = result.deleted_records,
                    events = result.deleted_events,
                    "records deleted"
                );
                self.step = DeleteStep::Done(result.clone());
                Ok(result)
            }
            Err(e) if e.kind() == ErrorKind::Authentication => {
                warn!(error = %e, "delete rejected");
                self.step = DeleteStep::AwaitingConfirmation(preview);
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "delete failed");
                self.step = DeleteStep::Failed(e.user_message());
                Err(e)
            }
        }
    }

    pub(crate) fn cancel(&mut self) {
        self.step = DeleteStep::Idle;
    }
}
