use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_response::RpcConfirmedTransactionStatusWithSignature;
use solana_sdk::{commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey};
use url::Url;

use crate::{config::Config, error::Result};

/// A confirmed transaction that carries a given reference key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSignature {
    pub signature: String,
    /// `false` when the transaction landed but its execution failed.
    pub succeeded: bool,
    pub block_time: Option<DateTime<Utc>>,
}

/// Read-only access to ledger state needed to assemble check-in transactions.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Raw account data, or `None` when the account does not exist.
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// Most recent transaction that lists `reference` among its account keys.
    async fn find_reference(&self, reference: &Pubkey) -> Result<Option<ReferenceSignature>>;
}

/// Solana JSON-RPC client
pub struct SolanaLedger {
    client: RpcClient,
}

impl SolanaLedger {
    pub fn from_config(config: &Config) -> Result<Self> {
        let rpc_url = Url::parse(&config.solana_rpc_url)
            .map_err(|e| crate::error::AppError::Internal(format!("Invalid RPC URL: {}", e)))?;
        Ok(Self {
            client: RpcClient::new_with_commitment(
                rpc_url.to_string(),
                CommitmentConfig::confirmed(),
            ),
        })
    }
}

#[async_trait]
impl LedgerClient for SolanaLedger {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| crate::error::AppError::BlockchainRPC(e.to_string()))
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map_err(|e| crate::error::AppError::BlockchainRPC(e.to_string()))?;
        Ok(response.value.map(|account| account.data))
    }

    async fn find_reference(&self, reference: &Pubkey) -> Result<Option<ReferenceSignature>> {
        let signatures = self
            .client
            .get_signatures_for_address(reference)
            .await
            .map_err(|e| crate::error::AppError::BlockchainRPC(e.to_string()))?;
        Ok(signatures.into_iter().next().map(reference_signature))
    }
}

fn reference_signature(status: RpcConfirmedTransactionStatusWithSignature) -> ReferenceSignature {
    ReferenceSignature {
        signature: status.signature,
        succeeded: status.err.is_none(),
        block_time: status
            .block_time
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
    }
}
