// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::artifacts::{ContractArtifacts, ReferenceProxy};
use crate::client::{ChainClient, DeploymentResult};
use crate::common::{Address, Bytes, Calldata, SaltNonce};
use crate::contract::proxy_factory::error::Error;
use crate::contract::proxy_factory::interface::{
    ProxyFactoryV100, ProxyFactoryV111, ProxyFactoryV130, ProxyFactoryV141,
};
use crate::contract::proxy_factory::{calculate_proxy_address, FactoryBinding, ProtocolVersion};
use crate::utils::random_salt_nonce;
use alloy::network::TransactionBuilder;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{sol_data, SolCall, SolEvent, SolType};
use std::sync::Arc;
use tokio::sync::OnceCell;

const PROXY_RUNTIME_CODE: &str = "proxyRuntimeCode";
const PROXY_CREATION_CODE: &str = "proxyCreationCode";

/// A deployed Safe proxy factory of a known version.
pub struct ProxyFactory<C> {
    address: Address,
    version: ProtocolVersion,
    client: C,
    artifacts: Arc<ContractArtifacts>,
    proxy_runtime_code: OnceCell<Option<Bytes>>,
    proxy_creation_code: OnceCell<Bytes>,
}

impl<C: ChainClient> ProxyFactory<C> {
    pub fn new(
        address: Address,
        version: ProtocolVersion,
        client: C,
        artifacts: Arc<ContractArtifacts>,
    ) -> Self {
        Self {
            address,
            version,
            client,
            artifacts,
            proxy_runtime_code: OnceCell::new(),
            proxy_creation_code: OnceCell::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn binding(&self) -> &'static FactoryBinding {
        self.version.binding()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Deploys a proxy factory of `version`, with `deployer` paying for it.
    pub async fn deploy_contract(
        client: &C,
        deployer: &PrivateKeySigner,
        version: ProtocolVersion,
        artifacts: &ContractArtifacts,
    ) -> Result<DeploymentResult, Error> {
        let binding = version.binding();
        let constructor_data = binding
            .constructor_data(artifacts)
            .cloned()
            .ok_or_else(|| Error::ArtifactNotFound(binding.factory_artifact.to_string()))?;

        if binding.reference_proxy_code(artifacts).is_none() {
            warn!(
                "Missing {} artifact, proxies of factory {version} are only recognised through its runtime code",
                binding.reference_proxy.artifact_name()
            );
        }

        info!(
            "Deploying proxy factory {version} from {}",
            deployer.address()
        );

        let result = client
            .deploy_and_initialize_contract(deployer, constructor_data)
            .await
            .inspect_err(|err| error!("Error deploying proxy factory {version}: {err:?}"))?;

        info!(
            "Proxy factory {version} deployed at {} with tx_hash: {:?}",
            result.contract_address, result.tx_hash
        );
        Ok(result)
    }

    /// Deploys a proxy to `master_copy` with `createProxy` (CREATE opcode).
    ///
    /// Not available from 1.4.1 onwards, use [`ProxyFactory::deploy_proxy_contract_with_nonce`].
    pub async fn deploy_proxy_contract(
        &self,
        deployer: &PrivateKeySigner,
        master_copy: Address,
        initializer: Bytes,
        gas: Option<u64>,
        gas_price: Option<u128>,
        nonce: Option<u64>,
    ) -> Result<DeploymentResult, Error> {
        let calldata = match self.version {
            ProtocolVersion::V1_0_0 => ProxyFactoryV100::createProxyCall {
                masterCopy: master_copy,
                data: initializer,
            }
            .abi_encode(),
            ProtocolVersion::V1_1_1 => ProxyFactoryV111::createProxyCall {
                masterCopy: master_copy,
                data: initializer,
            }
            .abi_encode(),
            ProtocolVersion::V1_3_0 => ProxyFactoryV130::createProxyCall {
                singleton: master_copy,
                data: initializer,
            }
            .abi_encode(),
            ProtocolVersion::V1_4_1 => {
                return Err(Error::UnsupportedOperation {
                    version: self.version,
                    reason: "createProxy is deprecated, use deploy_proxy_contract_with_nonce",
                })
            }
        };

        self.deploy_proxy(deployer, calldata.into(), "createProxy", gas, gas_price, nonce)
            .await
    }

    /// Deploys a proxy to `master_copy` with `createProxyWithNonce` (CREATE2 opcode).
    ///
    /// A random `salt_nonce` is used when none is given.
    #[allow(clippy::too_many_arguments)]
    pub async fn deploy_proxy_contract_with_nonce(
        &self,
        deployer: &PrivateKeySigner,
        master_copy: Address,
        initializer: Bytes,
        salt_nonce: Option<SaltNonce>,
        gas: Option<u64>,
        gas_price: Option<u128>,
        nonce: Option<u64>,
    ) -> Result<DeploymentResult, Error> {
        let salt_nonce = salt_nonce.unwrap_or_else(random_salt_nonce);

        let calldata = match self.version {
            ProtocolVersion::V1_0_0 => ProxyFactoryV100::createProxyWithNonceCall {
                _mastercopy: master_copy,
                initializer,
                saltNonce: salt_nonce,
            }
            .abi_encode(),
            ProtocolVersion::V1_1_1 => ProxyFactoryV111::createProxyWithNonceCall {
                _mastercopy: master_copy,
                initializer,
                saltNonce: salt_nonce,
            }
            .abi_encode(),
            ProtocolVersion::V1_3_0 => ProxyFactoryV130::createProxyWithNonceCall {
                _singleton: master_copy,
                initializer,
                saltNonce: salt_nonce,
            }
            .abi_encode(),
            ProtocolVersion::V1_4_1 => ProxyFactoryV141::createProxyWithNonceCall {
                _singleton: master_copy,
                initializer,
                saltNonce: salt_nonce,
            }
            .abi_encode(),
        };

        self.deploy_proxy(
            deployer,
            calldata.into(),
            "createProxyWithNonce",
            gas,
            gas_price,
            nonce,
        )
        .await
    }

    /// Simulates the factory call to learn the proxy address, then submits it.
    async fn deploy_proxy(
        &self,
        deployer: &PrivateKeySigner,
        calldata: Calldata,
        tx_identifier: &str,
        gas: Option<u64>,
        gas_price: Option<u128>,
        nonce: Option<u64>,
    ) -> Result<DeploymentResult, Error> {
        let tx_params = self
            .client
            .build_tx_params(deployer.address(), gas, gas_price, nonce)
            .await?;
        let tx = tx_params.to_call(self.address, calldata);

        let output = self
            .client
            .call(tx.clone())
            .await
            .inspect_err(|err| error!("Simulation of {tx_identifier} failed: {err:?}"))?;
        let contract_address = <sol_data::Address as SolType>::abi_decode(&output)?;
        debug!("{tx_identifier} on factory {} will deploy proxy {contract_address}", self.address);

        let tx_hash = self
            .client
            .send_transaction(tx.clone(), deployer)
            .await
            .inspect_err(|err| error!("Error sending {tx_identifier} transaction: {err:?}"))?;
        debug!("{tx_identifier} transaction is pending with tx_hash: {tx_hash:?}");

        Ok(DeploymentResult {
            tx_hash,
            tx,
            contract_address,
        })
    }

    /// Runtime code of the proxies deployed by this factory, as reported by the factory.
    ///
    /// Factories from 1.4.1 onwards do not expose it and yield `None`. The value is fetched once
    /// per instance.
    pub async fn get_proxy_runtime_code(&self) -> Result<Option<Bytes>, Error> {
        self.proxy_runtime_code
            .get_or_try_init(|| async {
                let Some(calldata) = self.view_calldata(PROXY_RUNTIME_CODE) else {
                    debug!("Proxy factory {} has no {PROXY_RUNTIME_CODE}", self.version);
                    return Ok(None);
                };

                let code = self.call_bytes_view(calldata).await?;
                Ok::<_, Error>(Some(code))
            })
            .await
            .cloned()
    }

    /// Creation code of the proxies deployed by this factory. Fetched once per instance.
    pub async fn get_proxy_creation_code(&self) -> Result<Bytes, Error> {
        self.proxy_creation_code
            .get_or_try_init(|| async {
                let calldata = self.view_calldata(PROXY_CREATION_CODE).ok_or(
                    Error::UnsupportedOperation {
                        version: self.version,
                        reason: "proxyCreationCode is not available",
                    },
                )?;
                self.call_bytes_view(calldata).await
            })
            .await
            .cloned()
    }

    /// Address `createProxyWithNonce` would deploy the proxy at, without sending anything.
    pub async fn calculate_proxy_address_with_nonce(
        &self,
        master_copy: Address,
        initializer: &[u8],
        salt_nonce: SaltNonce,
    ) -> Result<Address, Error> {
        let proxy_creation_code = self.get_proxy_creation_code().await?;
        Ok(calculate_proxy_address(
            self.address,
            &proxy_creation_code,
            master_copy,
            initializer,
            salt_nonce,
        ))
    }

    /// Checks if the code at `address` is a proxy deployed by any supported factory.
    pub async fn check_proxy_code(&self, address: Address) -> Result<bool, Error> {
        let deployed_code = self.client.get_code(address).await?;
        if deployed_code.is_empty() {
            debug!("No code deployed at {address}");
            return Ok(false);
        }

        for proxy in ReferenceProxy::CHECK_ORDER {
            if self.artifacts.reference_proxy_code(proxy) == Some(&deployed_code) {
                debug!("Code at {address} matches the {proxy:?} proxy");
                return Ok(true);
            }
        }

        if let Some(runtime_code) = self.get_proxy_runtime_code().await? {
            if runtime_code == deployed_code {
                debug!("Code at {address} matches the runtime code of factory {}", self.address);
                return Ok(true);
            }
        }

        debug!("Code at {address} is not a known proxy");
        Ok(false)
    }

    /// Proxy address announced by this factory's `ProxyCreation` event in `receipt`.
    pub fn proxy_address_from_receipt(&self, receipt: &TransactionReceipt) -> Option<Address> {
        receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.address)
            .find_map(|log| self.decode_proxy_creation(&log.inner))
    }

    fn decode_proxy_creation(&self, log: &alloy::primitives::Log) -> Option<Address> {
        match self.version {
            ProtocolVersion::V1_0_0 => ProxyFactoryV100::ProxyCreation::decode_log(log)
                .ok()
                .map(|event| event.data.proxy),
            ProtocolVersion::V1_1_1 => ProxyFactoryV111::ProxyCreation::decode_log(log)
                .ok()
                .map(|event| event.data.proxy),
            ProtocolVersion::V1_3_0 => ProxyFactoryV130::ProxyCreation::decode_log(log)
                .ok()
                .map(|event| event.data.proxy),
            ProtocolVersion::V1_4_1 => ProxyFactoryV141::ProxyCreation::decode_log(log)
                .ok()
                .map(|event| event.data.proxy),
        }
    }

    /// Calldata of the argumentless view `name`, if this version's interface declares it.
    fn view_calldata(&self, name: &str) -> Option<Calldata> {
        let interface = self.binding().interface();
        let function = interface.function(name)?.first()?;
        Some(Calldata::copy_from_slice(function.selector().as_slice()))
    }

    async fn call_bytes_view(&self, calldata: Calldata) -> Result<Bytes, Error> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(calldata);
        let output = self.client.call(tx).await?;
        Ok(<sol_data::Bytes as SolType>::abi_decode(&output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Artifact;
    use crate::client::mock::MockChain;
    use crate::client::ClientError;
    use crate::transaction_params::TransactionParameters;
    use alloy::primitives::{address, bytes, TxHash, U256};
    use mockall::Sequence;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const FACTORY: Address = address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2");
    const MASTER_COPY: Address = address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552");
    const PROXY: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn deployer() -> PrivateKeySigner {
        PrivateKeySigner::random()
    }

    fn reference_code(proxy: ReferenceProxy) -> Bytes {
        let marker = ReferenceProxy::CHECK_ORDER
            .iter()
            .position(|p| *p == proxy)
            .unwrap_or_default() as u8;
        Bytes::from(vec![0x60, 0x80, 0x60, 0x40, marker + 1])
    }

    fn artifacts() -> Arc<ContractArtifacts> {
        let mut artifacts = ContractArtifacts::default();
        for version in ProtocolVersion::ALL {
            artifacts.insert(
                version.binding().factory_artifact,
                Artifact {
                    bytecode: Bytes::from(vec![0x60, 0x80, version as u8]),
                    deployed_bytecode: Bytes::new(),
                },
            );
        }
        for proxy in ReferenceProxy::CHECK_ORDER {
            artifacts.insert(
                proxy.artifact_name(),
                Artifact {
                    bytecode: Bytes::new(),
                    deployed_bytecode: reference_code(proxy),
                },
            );
        }
        Arc::new(artifacts)
    }

    fn factory(version: ProtocolVersion, chain: MockChain) -> ProxyFactory<MockChain> {
        ProxyFactory::new(FACTORY, version, chain, artifacts())
    }

    fn encoded_address(address: Address) -> Bytes {
        <sol_data::Address as SolType>::abi_encode(&address).into()
    }

    fn encoded_bytes(code: &Bytes) -> Bytes {
        <sol_data::Bytes as SolType>::abi_encode(code).into()
    }

    fn resolve_params(
        from: Address,
        gas: Option<u64>,
        gas_price: Option<u128>,
        nonce: Option<u64>,
    ) -> Result<TransactionParameters, ClientError> {
        Ok(TransactionParameters {
            from,
            gas,
            gas_price: Some(gas_price.unwrap_or(1_000_000_000)),
            nonce: Some(nonce.unwrap_or(0)),
        })
    }

    #[tokio::test]
    async fn deploy_contract_sends_the_version_creation_code() {
        init_logging();
        let artifacts = artifacts();

        for version in ProtocolVersion::ALL {
            let expected_code = Bytes::from(vec![0x60, 0x80, version as u8]);
            let mut chain = MockChain::new();
            chain
                .expect_deploy_and_initialize_contract()
                .withf(move |_, code| *code == expected_code)
                .times(1)
                .returning(|_, code| {
                    Ok(DeploymentResult {
                        tx_hash: TxHash::repeat_byte(0x11),
                        tx: TransactionRequest::default().with_deploy_code(code),
                        contract_address: FACTORY,
                    })
                });

            let result =
                ProxyFactory::deploy_contract(&chain, &deployer(), version, &artifacts)
                    .await
                    .expect("deployment succeeds");

            assert_eq!(result.contract_address, FACTORY);
            assert_eq!(result.tx_hash, TxHash::repeat_byte(0x11));
        }
    }

    #[tokio::test]
    async fn deploy_contract_does_not_need_the_reference_proxy() {
        let artifacts = ContractArtifacts::default().with(
            "proxy_factory_v1_4_1",
            Artifact {
                bytecode: bytes!("6080"),
                deployed_bytecode: Bytes::new(),
            },
        );
        let mut chain = MockChain::new();
        chain
            .expect_deploy_and_initialize_contract()
            .times(1)
            .returning(|_, code| {
                Ok(DeploymentResult {
                    tx_hash: TxHash::repeat_byte(0x12),
                    tx: TransactionRequest::default().with_deploy_code(code),
                    contract_address: FACTORY,
                })
            });

        let result =
            ProxyFactory::deploy_contract(&chain, &deployer(), ProtocolVersion::V1_4_1, &artifacts)
                .await
                .expect("deployment succeeds");
        assert_eq!(result.contract_address, FACTORY);
    }

    #[tokio::test]
    async fn deploy_contract_without_artifact_touches_nothing() {
        let chain = MockChain::new();

        let result = ProxyFactory::deploy_contract(
            &chain,
            &deployer(),
            ProtocolVersion::V1_3_0,
            &ContractArtifacts::default(),
        )
        .await;

        assert!(matches!(result, Err(Error::ArtifactNotFound(name)) if name == "proxy_factory_v1_3_0"));
    }

    #[tokio::test]
    async fn deploy_contract_surfaces_failed_receipts() {
        let tx_hash = TxHash::repeat_byte(0x22);
        let mut chain = MockChain::new();
        chain
            .expect_deploy_and_initialize_contract()
            .times(1)
            .returning(move |_, _| Err(ClientError::DeploymentFailed { tx_hash }));

        let result = ProxyFactory::deploy_contract(
            &chain,
            &deployer(),
            ProtocolVersion::V1_1_1,
            &artifacts(),
        )
        .await;

        assert!(matches!(result, Err(Error::DeploymentFailed { tx_hash: hash }) if hash == tx_hash));
    }

    #[tokio::test]
    async fn deploy_proxy_simulates_then_sends() {
        init_logging();
        let signer = deployer();
        let from = signer.address();
        let tx_hash = TxHash::repeat_byte(0x33);
        let expected_calldata: Bytes = ProxyFactoryV130::createProxyCall {
            singleton: MASTER_COPY,
            data: bytes!("b63e800d"),
        }
        .abi_encode()
        .into();

        let mut seq = Sequence::new();
        let mut chain = MockChain::new();
        chain
            .expect_build_tx_params()
            .withf(move |f, gas, gas_price, nonce| {
                *f == from && gas.is_none() && *gas_price == Some(5) && nonce.is_none()
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(resolve_params);
        let call_data = expected_calldata.clone();
        chain
            .expect_call()
            .withf(move |tx| tx.input.input() == Some(&call_data))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(encoded_address(PROXY)));
        let send_data = expected_calldata.clone();
        chain
            .expect_send_transaction()
            .withf(move |tx, _| {
                tx.input.input() == Some(&send_data) && tx.nonce == Some(0) && tx.gas_price == Some(5)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(tx_hash));

        let factory = factory(ProtocolVersion::V1_3_0, chain);
        let result = factory
            .deploy_proxy_contract(&signer, MASTER_COPY, bytes!("b63e800d"), None, Some(5), None)
            .await
            .expect("proxy deployment succeeds");

        assert_eq!(result.contract_address, PROXY);
        assert_eq!(result.tx_hash, tx_hash);
        assert_eq!(result.tx.from, Some(from));
    }

    #[tokio::test]
    async fn deploy_proxy_is_unsupported_on_1_4_1() {
        // No expectations: any chain access fails the test.
        let factory = factory(ProtocolVersion::V1_4_1, MockChain::new());

        let result = factory
            .deploy_proxy_contract(&deployer(), MASTER_COPY, Bytes::new(), None, None, None)
            .await;

        assert!(matches!(
            result,
            Err(Error::UnsupportedOperation {
                version: ProtocolVersion::V1_4_1,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn deploy_proxy_with_nonce_uses_the_given_salt() {
        for version in ProtocolVersion::ALL {
            let expected_calldata: Bytes = ProxyFactoryV141::createProxyWithNonceCall {
                _singleton: MASTER_COPY,
                initializer: Bytes::new(),
                saltNonce: U256::from(42),
            }
            .abi_encode()
            .into();

            let mut chain = MockChain::new();
            chain
                .expect_build_tx_params()
                .times(1)
                .returning(resolve_params);
            let call_data = expected_calldata.clone();
            chain
                .expect_call()
                .withf(move |tx| tx.input.input() == Some(&call_data) && tx.to == Some(FACTORY.into()))
                .times(1)
                .returning(|_| Ok(encoded_address(PROXY)));
            chain
                .expect_send_transaction()
                .times(1)
                .returning(|_, _| Ok(TxHash::repeat_byte(0x44)));

            let factory = factory(version, chain);
            let result = factory
                .deploy_proxy_contract_with_nonce(
                    &deployer(),
                    MASTER_COPY,
                    Bytes::new(),
                    Some(U256::from(42)),
                    Some(300_000),
                    None,
                    Some(9),
                )
                .await
                .expect("proxy deployment succeeds");

            assert_eq!(result.contract_address, PROXY, "version {version}");
            assert_eq!(result.tx.gas, Some(300_000));
            assert_eq!(result.tx.nonce, Some(9));
        }
    }

    #[tokio::test]
    async fn deploy_proxy_with_nonce_generates_fresh_salts() {
        const DEPLOYMENTS: usize = 50;
        let sent = Arc::new(Mutex::new(Vec::new()));

        let mut chain = MockChain::new();
        chain
            .expect_build_tx_params()
            .times(DEPLOYMENTS)
            .returning(resolve_params);
        chain
            .expect_call()
            .times(DEPLOYMENTS)
            .returning(|_| Ok(encoded_address(PROXY)));
        let sent_txs = Arc::clone(&sent);
        chain
            .expect_send_transaction()
            .times(DEPLOYMENTS)
            .returning(move |tx, _| {
                if let Ok(mut sent) = sent_txs.lock() {
                    sent.push(tx.input.input().cloned().unwrap_or_default());
                }
                Ok(TxHash::ZERO)
            });

        let factory = factory(ProtocolVersion::V1_3_0, chain);
        let signer = deployer();
        for _ in 0..DEPLOYMENTS {
            factory
                .deploy_proxy_contract_with_nonce(
                    &signer,
                    MASTER_COPY,
                    Bytes::new(),
                    None,
                    None,
                    None,
                    None,
                )
                .await
                .expect("proxy deployment succeeds");
        }

        let sent = sent.lock().expect("lock");
        let salts: HashSet<U256> = sent
            .iter()
            .map(|calldata| {
                ProxyFactoryV130::createProxyWithNonceCall::abi_decode(calldata)
                    .expect("createProxyWithNonce calldata")
                    .saltNonce
            })
            .collect();
        assert_eq!(salts.len(), DEPLOYMENTS);
    }

    #[tokio::test]
    async fn reverted_simulation_is_not_sent() {
        let mut chain = MockChain::new();
        chain
            .expect_build_tx_params()
            .times(1)
            .returning(resolve_params);
        chain.expect_call().times(1).returning(|_| {
            Err(ClientError::Reverted {
                message: "revert: Create2 call failed".to_string(),
                data: None,
            })
        });
        chain.expect_send_transaction().never();

        let factory = factory(ProtocolVersion::V1_3_0, chain);
        let result = factory
            .deploy_proxy_contract_with_nonce(
                &deployer(),
                MASTER_COPY,
                Bytes::new(),
                Some(U256::from(1)),
                None,
                None,
                None,
            )
            .await;

        assert!(matches!(
            result,
            Err(Error::ChainCallFailed { message, .. }) if message == "revert: Create2 call failed"
        ));
    }

    #[tokio::test]
    async fn proxy_runtime_code_is_fetched_once() {
        let runtime_code = bytes!("363d3d373d3d3d363d73");
        let encoded = encoded_bytes(&runtime_code);

        let mut chain = MockChain::new();
        chain
            .expect_call()
            .withf(|tx| {
                tx.input
                    .input()
                    .is_some_and(|input| input[..] == ProxyFactoryV130::proxyRuntimeCodeCall::SELECTOR)
            })
            .times(1)
            .returning(move |_| Ok(encoded.clone()));

        let factory = factory(ProtocolVersion::V1_3_0, chain);

        let first = factory.get_proxy_runtime_code().await.expect("runtime code");
        let second = factory.get_proxy_runtime_code().await.expect("runtime code");

        assert_eq!(first, Some(runtime_code.clone()));
        assert_eq!(second, Some(runtime_code));
    }

    #[tokio::test]
    async fn proxy_runtime_code_is_none_on_1_4_1() {
        let factory = factory(ProtocolVersion::V1_4_1, MockChain::new());
        assert_eq!(factory.get_proxy_runtime_code().await.ok(), Some(None));
    }

    #[tokio::test]
    async fn proxy_runtime_code_is_available_before_1_4_1() {
        for version in [
            ProtocolVersion::V1_0_0,
            ProtocolVersion::V1_1_1,
            ProtocolVersion::V1_3_0,
        ] {
            let mut chain = MockChain::new();
            chain
                .expect_call()
                .times(1)
                .returning(|_| Ok(encoded_bytes(&bytes!("6080"))));

            let code = factory(version, chain)
                .get_proxy_runtime_code()
                .await
                .expect("runtime code");
            assert_eq!(code, Some(bytes!("6080")), "version {version}");
        }
    }

    #[tokio::test]
    async fn check_proxy_code_matches_every_reference_proxy() {
        init_logging();
        for proxy in ReferenceProxy::CHECK_ORDER {
            let code = reference_code(proxy);
            let mut chain = MockChain::new();
            chain
                .expect_get_code()
                .times(1)
                .returning(move |_| Ok(code.clone()));
            chain.expect_call().never();

            let is_proxy = factory(ProtocolVersion::V1_3_0, chain)
                .check_proxy_code(PROXY)
                .await
                .expect("check proxy code");
            assert!(is_proxy, "{proxy:?}");
        }
    }

    #[tokio::test]
    async fn check_proxy_code_matches_the_factory_runtime_code() {
        let runtime_code = bytes!("608060405273ffffffffffffffffffffffffffffffffffffffff600054");
        let deployed = runtime_code.clone();
        let encoded = encoded_bytes(&runtime_code);

        let mut chain = MockChain::new();
        chain
            .expect_get_code()
            .times(1)
            .returning(move |_| Ok(deployed.clone()));
        chain
            .expect_call()
            .times(1)
            .returning(move |_| Ok(encoded.clone()));

        let is_proxy = factory(ProtocolVersion::V1_1_1, chain)
            .check_proxy_code(PROXY)
            .await
            .expect("check proxy code");
        assert!(is_proxy);
    }

    #[tokio::test]
    async fn check_proxy_code_rejects_unrelated_code() {
        for version in [ProtocolVersion::V1_3_0, ProtocolVersion::V1_4_1] {
            let zeroes = Bytes::from(vec![0u8; reference_code(ReferenceProxy::V1_3_0).len()]);
            let mut chain = MockChain::new();
            chain
                .expect_get_code()
                .times(1)
                .returning(move |_| Ok(zeroes.clone()));
            chain
                .expect_call()
                .times(usize::from(version != ProtocolVersion::V1_4_1))
                .returning(|_| Ok(encoded_bytes(&bytes!("deadbeef"))));

            let is_proxy = factory(version, chain)
                .check_proxy_code(PROXY)
                .await
                .expect("check proxy code");
            assert!(!is_proxy, "version {version}");
        }
    }

    #[tokio::test]
    async fn check_proxy_code_is_false_without_code() {
        let mut chain = MockChain::new();
        chain
            .expect_get_code()
            .times(1)
            .returning(|_| Ok(Bytes::new()));
        chain.expect_call().never();

        let is_proxy = factory(ProtocolVersion::V1_3_0, chain)
            .check_proxy_code(PROXY)
            .await
            .expect("check proxy code");
        assert!(!is_proxy);
    }

    #[tokio::test]
    async fn proxy_address_is_calculated_from_the_creation_code() {
        let creation_code = bytes!("608060405234801561001057600080fd5b50");
        let encoded = encoded_bytes(&creation_code);

        let mut chain = MockChain::new();
        chain
            .expect_call()
            .withf(|tx| {
                tx.input
                    .input()
                    .is_some_and(|input| input[..] == ProxyFactoryV141::proxyCreationCodeCall::SELECTOR)
            })
            .times(1)
            .returning(move |_| Ok(encoded.clone()));

        let factory = factory(ProtocolVersion::V1_4_1, chain);
        let salt_nonce = U256::from(42);

        let first = factory
            .calculate_proxy_address_with_nonce(MASTER_COPY, &[], salt_nonce)
            .await
            .expect("proxy address");
        let second = factory
            .calculate_proxy_address_with_nonce(MASTER_COPY, &[], salt_nonce)
            .await
            .expect("proxy address");

        assert_eq!(first, second);
        assert_eq!(
            first,
            calculate_proxy_address(FACTORY, &creation_code, MASTER_COPY, &[], salt_nonce)
        );
    }
}
