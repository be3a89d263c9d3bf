// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Deployment of Safe proxies through the versioned Safe proxy factories, and verification of
//! deployed proxy bytecode against the known reference proxies.

#[macro_use]
extern crate tracing;

pub mod artifacts;
pub mod client;
pub mod common;
pub mod contract;
mod retry;
pub mod testnet;
pub mod transaction_params;
pub mod utils;

pub use artifacts::{Artifact, ContractArtifacts, ReferenceProxy};
pub use client::{ChainClient, ClientError, DeploymentResult, EthereumClient};
pub use contract::proxy_factory::{
    calculate_proxy_address, select, Error, FactoryBinding, ProtocolVersion, ProxyFactory,
};
pub use transaction_params::TransactionParameters;

/// Timeout for transactions
const TX_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(24); // Should differ per chain
