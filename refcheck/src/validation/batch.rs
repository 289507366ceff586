//! Batch validation coordinator
//!
//! Runs a list of existence checks strictly in input order. In fail-fast
//! mode the first failing check ends the batch and no later check is
//! dispatched. There is no distributed transaction behind this: an entity
//! confirmed here can still be deleted by its owner before the caller's
//! dependent write lands.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::entity::ReferenceLookup;
use super::types::{BatchOptions, BatchResults, ValidationRequest};
use crate::error::{BatchFailureCause, BatchValidationError};

/// Sequential, all-or-nothing reference validation
#[derive(Clone)]
pub struct BatchCoordinator {
    lookup: Arc<dyn ReferenceLookup>,
}

impl BatchCoordinator {
    pub fn new(lookup: Arc<dyn ReferenceLookup>) -> Self {
        Self { lookup }
    }

    /// Validate every request, in order.
    ///
    /// Returns one result per distinct key, or the error for the first
    /// failing request. An unknown kind is always an error, whatever the
    /// options say.
    #[instrument(
        skip(self, requests),
        fields(
            batch_id = %Uuid::new_v4(),
            size = requests.len(),
            fail_fast = options.fail_fast,
            validate_references = options.validate_references
        )
    )]
    pub async fn validate_batch(
        &self,
        requests: &[ValidationRequest],
        options: BatchOptions,
    ) -> Result<BatchResults, BatchValidationError> {
        let mut results = BatchResults::new();
        if requests.is_empty() {
            debug!("empty batch, nothing to validate");
            return Ok(results);
        }

        for (index, request) in requests.iter().enumerate() {
            let kind = request.entity_kind().map_err(|unknown| {
                let err = BatchValidationError::new(
                    request.key.clone(),
                    request.kind.clone(),
                    BatchFailureCause::UnknownKind(unknown.0),
                );
                error!(key = %request.key, position = index + 1, "{}", err);
                err
            })?;

            // one call at a time; request i+1 waits for request i
            let result = self
                .lookup
                .validate(kind, &request.id, &request.tenant_id)
                .await;

            if options.validate_references && result.is_failure() {
                if options.fail_fast {
                    let cause = match &result.error {
                        Some(reason) => BatchFailureCause::Unconfirmable(reason.clone()),
                        None => BatchFailureCause::NotFound,
                    };
                    let err = BatchValidationError::new(
                        request.key.clone(),
                        request.kind.clone(),
                        cause,
                    );
                    warn!(
                        key = %request.key,
                        position = index + 1,
                        skipped = requests.len() - index - 1,
                        "batch aborted: {}", err
                    );
                    return Err(err);
                }
                debug!(key = %request.key, kind = %kind, "reference failed, continuing");
            }

            results.insert(request.key.clone(), result);
        }

        info!(validated = results.len(), all_exist = results.all_exist(), "batch complete");
        Ok(results)
    }
}
