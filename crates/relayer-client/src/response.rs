//! Handle for a transaction accepted by the relayer.

use std::time::Duration;

use relayer_types::{
    RelayerTransaction, RelayerTransactionResponse, RelayerTransactionState, Result,
};
use tokio_util::sync::CancellationToken;

use crate::RelayClient;

/// Polls `wait` makes before giving up.
pub const WAIT_MAX_POLLS: u32 = 100;

/// What `POST /submit` returned, bound to the client that submitted it.
#[derive(Debug, Clone)]
pub struct SubmittedTransaction {
    pub transaction_id: String,
    pub state: String,
    pub transaction_hash: String,
    client: RelayClient,
}

impl SubmittedTransaction {
    pub(crate) fn new(client: RelayClient, resp: RelayerTransactionResponse) -> Self {
        let transaction_hash = if resp.transaction_hash.is_empty() {
            resp.hash
        } else {
            resp.transaction_hash
        };
        Self {
            transaction_id: resp.transaction_id,
            state: resp.state,
            transaction_hash,
            client,
        }
    }

    /// Current relayer records for this transaction.
    pub async fn transaction(&self, cancel: &CancellationToken) -> Result<Vec<RelayerTransaction>> {
        self.client.get_transaction(&self.transaction_id, cancel).await
    }

    /// Wait until mined or confirmed; `FAILED` is an `OnchainFailure`.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<RelayerTransaction> {
        self.client
            .poll_until_state(
                &self.transaction_id,
                &[RelayerTransactionState::Mined, RelayerTransactionState::Confirmed],
                Some(RelayerTransactionState::Failed),
                WAIT_MAX_POLLS,
                Duration::ZERO,
                cancel,
            )
            .await
    }
}
