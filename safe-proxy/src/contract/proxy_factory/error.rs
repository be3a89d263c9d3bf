// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::client::ClientError;
use crate::common::{Bytes, TxHash};
use crate::contract::proxy_factory::ProtocolVersion;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown proxy factory version: {0}")]
    UnknownVersion(String),
    #[error("Proxy factory {version} does not support this operation: {reason}")]
    UnsupportedOperation {
        version: ProtocolVersion,
        reason: &'static str,
    },
    #[error("Proxy factory call reverted: {message}")]
    ChainCallFailed {
        message: String,
        data: Option<Bytes>,
    },
    #[error("Deployment transaction {tx_hash} failed")]
    DeploymentFailed { tx_hash: TxHash },
    #[error("Contract artifact not found: {0}")]
    ArtifactNotFound(String),
    #[error("Failed to decode proxy factory output: {0}")]
    Decode(#[from] alloy::sol_types::Error),
    #[error(transparent)]
    Client(ClientError),
    #[error(transparent)]
    Artifacts(#[from] crate::artifacts::Error),
    #[error(transparent)]
    Config(#[from] crate::utils::Error),
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Reverted { message, data } => Error::ChainCallFailed { message, data },
            ClientError::DeploymentFailed { tx_hash } => Error::DeploymentFailed { tx_hash },
            other => Error::Client(other),
        }
    }
}
