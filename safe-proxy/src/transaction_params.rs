// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::common::{Address, Calldata};
use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;

/// Parameters of a transaction sent by a deployer account.
///
/// Fields left as `None` are resolved by the chain client, never defaulted locally. The gas
/// limit may still be `None` after resolution, in which case it is estimated when sending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionParameters {
    pub from: Address,
    pub gas: Option<u64>,
    /// Gas price in WEI.
    pub gas_price: Option<u128>,
    pub nonce: Option<u64>,
}

impl TransactionParameters {
    /// Builds a call to `to` with these parameters.
    pub fn to_call(&self, to: Address, calldata: Calldata) -> TransactionRequest {
        self.apply(TransactionRequest::default().with_to(to).with_input(calldata))
    }

    /// Builds a contract creation with these parameters.
    pub fn to_deployment(&self, code: Calldata) -> TransactionRequest {
        self.apply(TransactionRequest::default().with_deploy_code(code))
    }

    fn apply(&self, mut request: TransactionRequest) -> TransactionRequest {
        request.set_from(self.from);

        if let Some(gas) = self.gas {
            request.set_gas_limit(gas);
        }
        if let Some(gas_price) = self.gas_price {
            request.set_gas_price(gas_price);
        }
        if let Some(nonce) = self.nonce {
            request.set_nonce(nonce);
        }

        request
    }
}
