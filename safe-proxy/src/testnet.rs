// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::artifacts::ContractArtifacts;
use crate::client::{ChainClient, DeploymentResult, EthereumClient};
use crate::common::{Address, Bytes};
use crate::contract::proxy_factory::{ProtocolVersion, ProxyFactory};
use crate::utils::http_provider;
use alloy::node_bindings::{Anvil, AnvilInstance};
use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use std::sync::Arc;

/// Creation code of a contract whose runtime code is a single `STOP`.
const MASTER_COPY_CREATION_CODE: [u8; 13] = [
    0x60, 0x01, 0x60, 0x0c, 0x60, 0x00, 0x39, 0x60, 0x01, 0x60, 0x00, 0xf3, 0x00,
];

pub struct Testnet {
    anvil: AnvilInstance,
    rpc_url: Url,
    version: ProtocolVersion,
    proxy_factory_address: Address,
    master_copy_address: Address,
    artifacts: Arc<ContractArtifacts>,
}

impl Testnet {
    /// Starts an Anvil node and deploys a proxy factory of `version` from the given artifacts,
    /// along with a logic contract to use as master copy.
    pub async fn new(version: ProtocolVersion, artifacts: Arc<ContractArtifacts>) -> Self {
        let (node, rpc_url) = start_node();

        let deployment = deploy_proxy_factory_contract(&rpc_url, &node, version, &artifacts).await;
        let master_copy = deploy_master_copy_contract(&rpc_url, &node).await;

        Testnet {
            anvil: node,
            rpc_url,
            version,
            proxy_factory_address: deployment.contract_address,
            master_copy_address: master_copy.contract_address,
            artifacts,
        }
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn proxy_factory_address(&self) -> Address {
        self.proxy_factory_address
    }

    /// A deployed contract proxies can point at.
    pub fn master_copy_address(&self) -> Address {
        self.master_copy_address
    }

    /// The first default Anvil account (Alice), which deployed the factory.
    pub fn default_signer(&self) -> PrivateKeySigner {
        default_signer(&self.anvil, 0)
    }

    pub fn client(&self) -> EthereumClient<impl Provider + Clone> {
        EthereumClient::new(http_provider(self.rpc_url.clone()))
    }

    /// A handle on the deployed factory.
    pub fn proxy_factory(&self) -> ProxyFactory<EthereumClient<impl Provider + Clone>> {
        ProxyFactory::new(
            self.proxy_factory_address,
            self.version,
            self.client(),
            Arc::clone(&self.artifacts),
        )
    }
}

/// Runs a local Anvil node bound to a specified IP address.
///
/// The `AnvilInstance` `endpoint` function is hardcoded to return "localhost", so we must also
/// return the RPC URL if we want to listen on a different address.
///
/// The `anvil` binary respects the `ANVIL_IP_ADDR` environment variable, but defaults to "localhost".
pub fn start_node() -> (AnvilInstance, Url) {
    let host = std::env::var("ANVIL_IP_ADDR").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("ANVIL_PORT")
        .unwrap_or(0.to_string())
        .parse::<u16>()
        .expect("Invalid port number");

    let anvil = Anvil::new()
        .port(port)
        .try_spawn()
        .expect("Could not spawn Anvil node");

    let url = Url::parse(&format!("http://{host}:{}", anvil.port())).expect("Failed to parse URL");

    (anvil, url)
}

/// One of the prefunded Anvil accounts.
pub fn default_signer(anvil: &AnvilInstance, index: usize) -> PrivateKeySigner {
    anvil.keys()[index].clone().into()
}

pub async fn deploy_proxy_factory_contract(
    rpc_url: &Url,
    anvil: &AnvilInstance,
    version: ProtocolVersion,
    artifacts: &ContractArtifacts,
) -> DeploymentResult {
    let signer = default_signer(anvil, 0);
    let client = EthereumClient::new(http_provider(rpc_url.clone()));

    ProxyFactory::deploy_contract(&client, &signer, version, artifacts)
        .await
        .expect("Could not deploy proxy factory")
}

/// Deploys a minimal logic contract. Factories from 1.4.1 onwards refuse master copies without code.
pub async fn deploy_master_copy_contract(rpc_url: &Url, anvil: &AnvilInstance) -> DeploymentResult {
    let signer = default_signer(anvil, 0);
    let client = EthereumClient::new(http_provider(rpc_url.clone()));

    client
        .deploy_and_initialize_contract(&signer, Bytes::from_static(&MASTER_COPY_CREATION_CODE))
        .await
        .expect("Could not deploy master copy")
}
