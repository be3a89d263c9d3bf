// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Bytecode of the Safe contracts, loaded from compiled JSON artifacts.
//!
//! An artifact directory holds one `<name>.json` file per contract, each with at least a
//! `bytecode` (creation code) and/or `deployedBytecode` (runtime code) hex string, as emitted by
//! hardhat. Factory artifacts are named after [`FactoryBinding::factory_artifact`] and reference
//! proxies after [`ReferenceProxy::artifact_name`].
//!
//! [`FactoryBinding::factory_artifact`]: crate::contract::proxy_factory::FactoryBinding

use crate::common::Bytes;
use crate::utils;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ARTIFACT_EXTENSION: &str = "json";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to read artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse artifact {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] utils::Error),
}

/// Proxy contracts whose runtime code is recognised as a valid Safe proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceProxy {
    V1_4_1,
    V1_3_0,
    V1_1_1,
    /// Build of the 1.1.1 proxy that was deployed on mainnet.
    V1_1_1Mainnet,
    V1_0_0,
    /// Legacy proxy paying its deployer on creation.
    PayingProxy,
}

impl ReferenceProxy {
    /// Order in which deployed code is compared, newest first.
    pub const CHECK_ORDER: [ReferenceProxy; 6] = [
        ReferenceProxy::V1_4_1,
        ReferenceProxy::V1_3_0,
        ReferenceProxy::V1_1_1,
        ReferenceProxy::V1_1_1Mainnet,
        ReferenceProxy::V1_0_0,
        ReferenceProxy::PayingProxy,
    ];

    pub fn artifact_name(&self) -> &'static str {
        match self {
            ReferenceProxy::V1_4_1 => "proxy_v1_4_1",
            ReferenceProxy::V1_3_0 => "proxy_v1_3_0",
            ReferenceProxy::V1_1_1 => "proxy_v1_1_1",
            ReferenceProxy::V1_1_1Mainnet => "proxy_v1_1_1_mainnet",
            ReferenceProxy::V1_0_0 => "proxy_v1_0_0",
            ReferenceProxy::PayingProxy => "paying_proxy",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Creation code.
    #[serde(default)]
    pub bytecode: Bytes,
    /// Runtime code.
    #[serde(default)]
    pub deployed_bytecode: Bytes,
}

/// Lookup table of contract artifacts by name.
#[derive(Clone, Debug, Default)]
pub struct ContractArtifacts {
    artifacts: HashMap<String, Artifact>,
}

impl ContractArtifacts {
    /// Load every `*.json` artifact in `dir`.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let entries = std::fs::read_dir(dir).map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut artifacts = HashMap::new();
        for entry in entries {
            let path = entry
                .map_err(|source| Error::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();

            if path.extension().and_then(|ext| ext.to_str()) != Some(ARTIFACT_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let artifact = read_artifact(&path)?;
            trace!("Loaded contract artifact {name} from {path:?}");
            artifacts.insert(name.to_string(), artifact);
        }

        debug!("Loaded {} contract artifacts from {dir:?}", artifacts.len());
        Ok(Self { artifacts })
    }

    /// Load the artifacts from the configured artifact directory.
    pub fn from_env() -> Result<Self, Error> {
        let dir = utils::get_artifacts_dir()?;
        Self::load(&dir)
    }

    pub fn insert(&mut self, name: impl Into<String>, artifact: Artifact) {
        self.artifacts.insert(name.into(), artifact);
    }

    /// Builder style [`ContractArtifacts::insert`].
    pub fn with(mut self, name: impl Into<String>, artifact: Artifact) -> Self {
        self.insert(name, artifact);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.get(name)
    }

    /// Creation code of the named contract, if known and non empty.
    pub fn creation_code(&self, name: &str) -> Option<&Bytes> {
        self.get(name)
            .map(|artifact| &artifact.bytecode)
            .filter(|code| !code.is_empty())
    }

    /// Runtime code of a reference proxy, if known and non empty.
    pub fn reference_proxy_code(&self, proxy: ReferenceProxy) -> Option<&Bytes> {
        self.get(proxy.artifact_name())
            .map(|artifact| &artifact.deployed_bytecode)
            .filter(|code| !code.is_empty())
    }
}

fn read_artifact(path: &Path) -> Result<Artifact, Error> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}
