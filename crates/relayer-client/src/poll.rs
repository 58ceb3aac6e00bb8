//! Polling a submitted transaction until it settles.

use std::time::Duration;

use relayer_types::{RelayError, RelayerTransaction, RelayerTransactionState, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::RelayClient;

pub const DEFAULT_MAX_POLLS: u32 = 10;
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

impl RelayClient {
    /// Poll `GET /transaction` until the record reaches one of `success_states`.
    ///
    /// `max_polls == 0` means 10; intervals under a second become 2s. Reaching
    /// `fail_state` is an `OnchainFailure`; running out of polls is a `Timeout`.
    #[instrument(skip(self, success_states, cancel))]
    pub async fn poll_until_state(
        &self,
        transaction_id: &str,
        success_states: &[RelayerTransactionState],
        fail_state: Option<RelayerTransactionState>,
        max_polls: u32,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<RelayerTransaction> {
        let max_polls = if max_polls == 0 { DEFAULT_MAX_POLLS } else { max_polls };
        let interval = if interval < MIN_POLL_INTERVAL {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };

        for attempt in 0..max_polls {
            if cancel.is_cancelled() {
                return Err(RelayError::Cancelled);
            }

            let records = self.get_transaction(transaction_id, cancel).await?;
            if let Some(txn) = records.into_iter().next() {
                if success_states.contains(&txn.state) {
                    return Ok(txn);
                }
                if fail_state == Some(txn.state) {
                    return Err(RelayError::OnchainFailure {
                        transaction_hash: txn.transaction_hash,
                    });
                }
                debug!(attempt, state = ?txn.state, "transaction not settled yet");
            } else {
                debug!(attempt, "transaction not visible yet");
            }

            if attempt + 1 < max_polls {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RelayError::Cancelled),
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }

        Err(RelayError::Timeout {
            transaction_id: transaction_id.to_string(),
            attempts: max_polls,
        })
    }
}
