// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

pub mod error;
pub mod handler;
pub mod interface;

pub use error::Error;
pub use handler::ProxyFactory;

use crate::artifacts::{ContractArtifacts, ReferenceProxy};
use crate::client::{ChainClient, EthereumClient};
use crate::common::{Address, Bytes, SaltNonce};
use crate::utils;
use alloy::json_abi::JsonAbi;
use alloy::primitives::keccak256;
use alloy::providers::Provider;
use interface::{ProxyFactoryV100, ProxyFactoryV111, ProxyFactoryV130, ProxyFactoryV141};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Released versions of the Safe proxy factory.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ProtocolVersion {
    #[serde(rename = "1.0.0")]
    V1_0_0,
    #[serde(rename = "1.1.1")]
    V1_1_1,
    #[serde(rename = "1.3.0")]
    V1_3_0,
    #[default]
    #[serde(rename = "1.4.1")]
    V1_4_1,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 4] = [
        ProtocolVersion::V1_0_0,
        ProtocolVersion::V1_1_1,
        ProtocolVersion::V1_3_0,
        ProtocolVersion::V1_4_1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::V1_0_0 => "1.0.0",
            ProtocolVersion::V1_1_1 => "1.1.1",
            ProtocolVersion::V1_3_0 => "1.3.0",
            ProtocolVersion::V1_4_1 => "1.4.1",
        }
    }

    pub fn binding(&self) -> &'static FactoryBinding {
        match self {
            ProtocolVersion::V1_0_0 => &BINDINGS[0],
            ProtocolVersion::V1_1_1 => &BINDINGS[1],
            ProtocolVersion::V1_3_0 => &BINDINGS[2],
            ProtocolVersion::V1_4_1 => &BINDINGS[3],
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0.0" => Ok(ProtocolVersion::V1_0_0),
            "1.1.1" => Ok(ProtocolVersion::V1_1_1),
            "1.3.0" => Ok(ProtocolVersion::V1_3_0),
            "1.4.1" => Ok(ProtocolVersion::V1_4_1),
            _ => Err(Error::UnknownVersion(s.to_string())),
        }
    }
}

/// What a factory version is made of: its declared interface, the artifact its creation code
/// comes from and the proxy it deploys.
#[derive(Debug)]
pub struct FactoryBinding {
    pub version: ProtocolVersion,
    pub factory_artifact: &'static str,
    pub reference_proxy: ReferenceProxy,
    interface: fn() -> JsonAbi,
}

static BINDINGS: [FactoryBinding; 4] = [
    FactoryBinding {
        version: ProtocolVersion::V1_0_0,
        factory_artifact: "proxy_factory_v1_0_0",
        reference_proxy: ReferenceProxy::V1_0_0,
        interface: ProxyFactoryV100::abi::contract,
    },
    FactoryBinding {
        version: ProtocolVersion::V1_1_1,
        factory_artifact: "proxy_factory_v1_1_1",
        reference_proxy: ReferenceProxy::V1_1_1,
        interface: ProxyFactoryV111::abi::contract,
    },
    FactoryBinding {
        version: ProtocolVersion::V1_3_0,
        factory_artifact: "proxy_factory_v1_3_0",
        reference_proxy: ReferenceProxy::V1_3_0,
        interface: ProxyFactoryV130::abi::contract,
    },
    FactoryBinding {
        version: ProtocolVersion::V1_4_1,
        factory_artifact: "proxy_factory_v1_4_1",
        reference_proxy: ReferenceProxy::V1_4_1,
        interface: ProxyFactoryV141::abi::contract,
    },
];

impl FactoryBinding {
    /// The factory's declared interface.
    pub fn interface(&self) -> JsonAbi {
        (self.interface)()
    }

    /// Whether the factory's interface declares a function called `name`.
    #[cfg(test)]
    pub(crate) fn declares(&self, name: &str) -> bool {
        self.interface().function(name).is_some()
    }

    /// Constructor data of the factory. No version takes constructor arguments.
    pub fn constructor_data<'a>(&self, artifacts: &'a ContractArtifacts) -> Option<&'a Bytes> {
        artifacts.creation_code(self.factory_artifact)
    }

    /// Runtime code of the proxies this factory deploys.
    pub fn reference_proxy_code<'a>(&self, artifacts: &'a ContractArtifacts) -> Option<&'a Bytes> {
        artifacts.reference_proxy_code(self.reference_proxy)
    }
}

/// Bind a proxy factory at `factory_address` to the interface of `version`.
pub fn select<C: ChainClient>(
    version: &str,
    factory_address: Address,
    client: C,
    artifacts: Arc<ContractArtifacts>,
) -> Result<ProxyFactory<C>, Error> {
    let version: ProtocolVersion = version.parse().inspect_err(|err| {
        error!("Failed to select proxy factory: {err}");
    })?;
    Ok(ProxyFactory::new(factory_address, version, client, artifacts))
}

/// Proxy factory at `factory_address` on the network configured in the environment.
///
/// The version comes from `PROXY_FACTORY_VERSION`, the RPC endpoint from `RPC_URL` and the
/// contract artifacts from `SAFE_CONTRACTS_ARTIFACTS_DIR`.
pub fn from_env(
    factory_address: Address,
) -> Result<ProxyFactory<EthereumClient<impl Provider + Clone>>, Error> {
    let version = utils::get_proxy_factory_version()?;
    let rpc_url = utils::get_rpc_url()?;
    let artifacts = ContractArtifacts::from_env()?;

    info!("Using proxy factory {version} at {factory_address} on {rpc_url}");

    let client = EthereumClient::new(utils::http_provider(rpc_url));
    Ok(ProxyFactory::new(
        factory_address,
        version,
        client,
        Arc::new(artifacts),
    ))
}

/// Address of the proxy `createProxyWithNonce` deploys, computed off chain.
///
/// The factory salts CREATE2 with `keccak256(keccak256(initializer) ++ salt_nonce)` and
/// deploys `proxy_creation_code ++ uint256(master_copy)`.
pub fn calculate_proxy_address(
    factory_address: Address,
    proxy_creation_code: &[u8],
    master_copy: Address,
    initializer: &[u8],
    salt_nonce: SaltNonce,
) -> Address {
    let mut salt_preimage = Vec::with_capacity(64);
    salt_preimage.extend_from_slice(keccak256(initializer).as_slice());
    salt_preimage.extend_from_slice(&salt_nonce.to_be_bytes::<32>());
    let salt = keccak256(&salt_preimage);

    let mut deployment_data = Vec::with_capacity(proxy_creation_code.len() + 32);
    deployment_data.extend_from_slice(proxy_creation_code);
    deployment_data.extend_from_slice(master_copy.into_word().as_slice());

    factory_address.create2_from_code(salt, deployment_data)
}
