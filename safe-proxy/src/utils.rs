// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::SaltNonce;
use crate::contract::proxy_factory::ProtocolVersion;
use alloy::network::Ethereum;
use alloy::providers::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
};
use alloy::providers::{Identity, ProviderBuilder, RootProvider};
use alloy::transports::http::reqwest;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// environment variable pointing at the directory holding the Safe contract artifacts
pub const SAFE_CONTRACTS_ARTIFACTS_DIR: &str = "SAFE_CONTRACTS_ARTIFACTS_DIR";
const SAFE_CONTRACTS_ARTIFACTS_DIR_BUILD_TIME_VAL: Option<&str> =
    option_env!("SAFE_CONTRACTS_ARTIFACTS_DIR");
/// environment variable selecting the proxy factory version
pub const PROXY_FACTORY_VERSION: &str = "PROXY_FACTORY_VERSION";
const PROXY_FACTORY_VERSION_BUILD_TIME_VAL: Option<&str> = option_env!("PROXY_FACTORY_VERSION");
/// environment variable to connect to a custom EVM network
pub const RPC_URL: &str = "RPC_URL";
const RPC_URL_BUILD_TIME_VAL: Option<&str> = option_env!("RPC_URL");

const ARTIFACTS_DIR_NAME: &str = "safe-proxy";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to get the contract artifacts directory: {0}")]
    FailedToGetArtifactsDir(String),
    #[error("Invalid proxy factory version in {PROXY_FACTORY_VERSION}: {0}")]
    InvalidVersion(String),
    #[error("Failed to get the RPC URL: {0}")]
    FailedToGetRpcUrl(String),
}

/// Generate a salt nonce for `createProxyWithNonce` using the OS CSPRNG.
///
/// A predictable salt lets anyone claim the deterministic proxy address first.
pub fn random_salt_nonce() -> SaltNonce {
    use rand::Rng;
    SaltNonce::from_be_bytes(rand::rngs::OsRng.r#gen::<[u8; 32]>())
}

fn env_or_build_time(var: &str, build_time_val: Option<&str>) -> Option<String> {
    env::var(var)
        .ok()
        .or_else(|| build_time_val.map(|s| s.to_string()))
}

/// Get the directory holding the Safe contract artifacts.
///
/// Taken from `SAFE_CONTRACTS_ARTIFACTS_DIR` (runtime first, then build time), falling back to
/// `safe-proxy/artifacts` under the user's data directory.
pub fn get_artifacts_dir() -> Result<PathBuf, Error> {
    if let Some(dir) = env_or_build_time(
        SAFE_CONTRACTS_ARTIFACTS_DIR,
        SAFE_CONTRACTS_ARTIFACTS_DIR_BUILD_TIME_VAL,
    ) {
        debug!("Using contract artifacts from {SAFE_CONTRACTS_ARTIFACTS_DIR}: {dir}");
        return Ok(PathBuf::from(dir));
    }

    let data_dir = dirs_next::data_dir().ok_or_else(|| {
        Error::FailedToGetArtifactsDir(format!(
            "{SAFE_CONTRACTS_ARTIFACTS_DIR} is not set and no data directory could be found"
        ))
    })?;

    Ok(data_dir.join(ARTIFACTS_DIR_NAME).join("artifacts"))
}

/// Get the proxy factory version from `PROXY_FACTORY_VERSION`, defaulting to the latest one.
pub fn get_proxy_factory_version() -> Result<ProtocolVersion, Error> {
    match env_or_build_time(PROXY_FACTORY_VERSION, PROXY_FACTORY_VERSION_BUILD_TIME_VAL) {
        Some(version) => ProtocolVersion::from_str(&version).map_err(|_| {
            error!("Unsupported proxy factory version configured: {version}");
            Error::InvalidVersion(version)
        }),
        None => {
            info!(
                "{PROXY_FACTORY_VERSION} is not set, using version {}",
                ProtocolVersion::default()
            );
            Ok(ProtocolVersion::default())
        }
    }
}

/// Get the RPC URL of the EVM network from `RPC_URL`.
pub fn get_rpc_url() -> Result<reqwest::Url, Error> {
    let url = env_or_build_time(RPC_URL, RPC_URL_BUILD_TIME_VAL)
        .ok_or_else(|| Error::FailedToGetRpcUrl(format!("missing env var {RPC_URL}")))?;

    reqwest::Url::parse(&url).map_err(|err| Error::FailedToGetRpcUrl(format!("{url}: {err}")))
}

#[allow(clippy::type_complexity)]
pub fn http_provider(
    rpc_url: reqwest::Url,
) -> FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
> {
    ProviderBuilder::new().connect_http(rpc_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_salt_nonces_do_not_repeat() {
        let salts: HashSet<SaltNonce> = (0..1000).map(|_| random_salt_nonce()).collect();
        assert_eq!(salts.len(), 1000);
    }

    #[test]
    fn random_salt_nonces_use_the_full_width() {
        // With 1000 uniform samples, at least one has its top byte set.
        let has_high_bits = (0..1000).any(|_| random_salt_nonce().byte(31) != 0);
        assert!(has_high_bits);
    }
}
