// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::{Address, Bytes, TxHash};
use crate::retry::{retry, BROADCAST_TRANSACTION_TIMEOUT_MS};
use crate::transaction_params::TransactionParameters;
use crate::TX_TIMEOUT;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::providers::{PendingTransactionBuilder, Provider};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::decode_revert_reason;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    #[error("Execution reverted: {message}")]
    Reverted {
        message: String,
        data: Option<Bytes>,
    },
    #[error(transparent)]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),
    #[error("Transaction {tx_hash} was mined but did not succeed")]
    DeploymentFailed { tx_hash: TxHash },
    #[error("Receipt of transaction {tx_hash} has no contract address")]
    MissingContractAddress { tx_hash: TxHash },
    #[error("Failed to sign transaction: {0}")]
    Signing(String),
    #[error("Timeout: {0:?}")]
    Timeout(#[from] tokio::time::error::Elapsed),
}

/// Outcome of a contract deployment.
#[derive(Clone, Debug, PartialEq)]
pub struct DeploymentResult {
    pub tx_hash: TxHash,
    /// The transaction as it was submitted.
    pub tx: TransactionRequest,
    pub contract_address: Address,
}

/// The chain operations needed to deploy and verify proxies.
///
/// Retry and timeout policies live behind this trait; callers pass failures through unchanged.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Deployed bytecode at `address`, empty if there is none.
    async fn get_code(&self, address: Address) -> Result<Bytes, ClientError>;

    /// Execute `tx` without submitting it. Reverts are reported as [`ClientError::Reverted`].
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ClientError>;

    /// Resolve unset gas price and nonce from the chain state of `from`.
    async fn build_tx_params(
        &self,
        from: Address,
        gas: Option<u64>,
        gas_price: Option<u128>,
        nonce: Option<u64>,
    ) -> Result<TransactionParameters, ClientError>;

    /// Sign `tx` with `signer` and submit it.
    async fn send_transaction(
        &self,
        tx: TransactionRequest,
        signer: &PrivateKeySigner,
    ) -> Result<TxHash, ClientError>;

    /// Submit a contract creation with `constructor_data` and wait for the created address.
    async fn deploy_and_initialize_contract(
        &self,
        deployer: &PrivateKeySigner,
        constructor_data: Bytes,
    ) -> Result<DeploymentResult, ClientError>;

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ClientError>;
}

/// [`ChainClient`] backed by an alloy provider.
#[derive(Clone, Debug)]
pub struct EthereumClient<P> {
    provider: P,
}

impl<P: Provider> EthereumClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider> ChainClient for EthereumClient<P> {
    async fn get_code(&self, address: Address) -> Result<Bytes, ClientError> {
        debug!("Getting code at {address}");
        let code = retry(
            || async { self.provider.get_code_at(address).await },
            "get_code_at",
            None,
        )
        .await?;
        Ok(code)
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ClientError> {
        self.provider.call(tx).await.map_err(classify_call_error)
    }

    async fn build_tx_params(
        &self,
        from: Address,
        gas: Option<u64>,
        gas_price: Option<u128>,
        nonce: Option<u64>,
    ) -> Result<TransactionParameters, ClientError> {
        let gas_price = match gas_price {
            Some(gas_price) => gas_price,
            None => {
                retry(
                    || async { self.provider.get_gas_price().await },
                    "get_gas_price",
                    None,
                )
                .await?
            }
        };

        let nonce = match nonce {
            Some(nonce) => nonce,
            None => {
                retry(
                    || async { self.provider.get_transaction_count(from).pending().await },
                    "get_transaction_count",
                    None,
                )
                .await?
            }
        };

        debug!("Resolved tx params for {from}: gas {gas:?}, gas price {gas_price}, nonce {nonce}");

        Ok(TransactionParameters {
            from,
            gas,
            gas_price: Some(gas_price),
            nonce: Some(nonce),
        })
    }

    async fn send_transaction(
        &self,
        mut tx: TransactionRequest,
        signer: &PrivateKeySigner,
    ) -> Result<TxHash, ClientError> {
        if tx.gas.is_none() {
            let gas = self
                .provider
                .estimate_gas(tx.clone())
                .await
                .map_err(classify_call_error)?;
            tx.set_gas_limit(gas);
        }

        if tx.chain_id.is_none() {
            let chain_id = retry(
                || async { self.provider.get_chain_id().await },
                "get_chain_id",
                None,
            )
            .await?;
            tx.set_chain_id(chain_id);
        }

        let wallet = EthereumWallet::from(signer.clone());
        let envelope = tx
            .build(&wallet)
            .await
            .map_err(|err| ClientError::Signing(err.to_string()))?;

        let tx_hash = *envelope.tx_hash();

        // A broadcast that timed out may still have reached the node, so a resend can find the
        // transaction already in its pool.
        retry(
            || async {
                let sent = tokio::time::timeout(
                    Duration::from_millis(BROADCAST_TRANSACTION_TIMEOUT_MS),
                    self.provider.send_tx_envelope(envelope.clone()),
                )
                .await?;

                match sent {
                    Ok(_) => Ok::<(), ClientError>(()),
                    Err(err) if is_already_known(&err) => {
                        debug!("Transaction {tx_hash:?} is already known to the node");
                        Ok(())
                    }
                    Err(err) => Err(ClientError::from(err)),
                }
            },
            "send_tx_envelope",
            None,
        )
        .await?;

        debug!("Transaction from {} is pending with tx_hash: {tx_hash:?}", signer.address());
        Ok(tx_hash)
    }

    async fn deploy_and_initialize_contract(
        &self,
        deployer: &PrivateKeySigner,
        constructor_data: Bytes,
    ) -> Result<DeploymentResult, ClientError> {
        let params = self
            .build_tx_params(deployer.address(), None, None, None)
            .await?;
        let tx = params.to_deployment(constructor_data);

        let tx_hash = self.send_transaction(tx.clone(), deployer).await?;
        let receipt = self.wait_for_receipt(tx_hash).await?;

        if !receipt.status() {
            error!("Contract creation {tx_hash:?} failed");
            return Err(ClientError::DeploymentFailed { tx_hash });
        }

        let contract_address = receipt
            .contract_address
            .ok_or(ClientError::MissingContractAddress { tx_hash })?;

        debug!("Contract deployed at {contract_address} with tx_hash: {tx_hash:?}");

        Ok(DeploymentResult {
            tx_hash,
            tx,
            contract_address,
        })
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ClientError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_timeout(Some(TX_TIMEOUT))
            .get_receipt()
            .await
            .inspect_err(|err| error!("Error waiting for receipt of {tx_hash:?}: {err:?}"))?;
        Ok(receipt)
    }
}

/// Whether the node rejected a transaction because it already has it.
fn is_already_known(err: &RpcError<TransportErrorKind>) -> bool {
    err.as_error_resp().is_some_and(|payload| {
        let message = payload.message.to_lowercase();
        message.contains("already known") || message.contains("known transaction")
    })
}

/// Keep reverts apart from transport failures, decoding the revert reason when possible.
fn classify_call_error(err: RpcError<TransportErrorKind>) -> ClientError {
    if let Some(payload) = err.as_error_resp() {
        if let Some(data) = payload.as_revert_data() {
            let message =
                decode_revert_reason(&data).unwrap_or_else(|| payload.message.to_string());
            return ClientError::Reverted {
                message,
                data: Some(data),
            };
        }

        if payload.message.contains("revert") {
            return ClientError::Reverted {
                message: payload.message.to_string(),
                data: None,
            };
        }
    }

    ClientError::Rpc(err)
}
