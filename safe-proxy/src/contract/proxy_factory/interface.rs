// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::sol;

// Interfaces of the released Safe proxy factories. `#[sol(abi)]` also generates the JSON ABI,
// which is what tells the versions' capabilities apart at runtime.
sol! {
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(abi)]
    interface ProxyFactoryV100 {
        event ProxyCreation(address proxy);

        function createProxy(address masterCopy, bytes memory data) external returns (address proxy);
        function createProxyWithNonce(address _mastercopy, bytes memory initializer, uint256 saltNonce) external returns (address proxy);
        function proxyRuntimeCode() external pure returns (bytes memory);
        function proxyCreationCode() external pure returns (bytes memory);
    }

    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(abi)]
    interface ProxyFactoryV111 {
        event ProxyCreation(address proxy);

        function createProxy(address masterCopy, bytes memory data) external returns (address proxy);
        function createProxyWithNonce(address _mastercopy, bytes memory initializer, uint256 saltNonce) external returns (address proxy);
        function createProxyWithCallback(address _mastercopy, bytes memory initializer, uint256 saltNonce, address callback) external returns (address proxy);
        function calculateCreateProxyWithNonceAddress(address _mastercopy, bytes calldata initializer, uint256 saltNonce) external returns (address proxy);
        function proxyRuntimeCode() external pure returns (bytes memory);
        function proxyCreationCode() external pure returns (bytes memory);
    }

    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(abi)]
    interface ProxyFactoryV130 {
        event ProxyCreation(address proxy, address singleton);

        function createProxy(address singleton, bytes memory data) external returns (address proxy);
        function createProxyWithNonce(address _singleton, bytes memory initializer, uint256 saltNonce) external returns (address proxy);
        function createProxyWithCallback(address _singleton, bytes memory initializer, uint256 saltNonce, address callback) external returns (address proxy);
        function calculateCreateProxyWithNonceAddress(address _singleton, bytes calldata initializer, uint256 saltNonce) external returns (address proxy);
        function proxyRuntimeCode() external pure returns (bytes memory);
        function proxyCreationCode() external pure returns (bytes memory);
    }

    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(abi)]
    interface ProxyFactoryV141 {
        event ProxyCreation(address indexed proxy, address singleton);

        function createProxyWithNonce(address _singleton, bytes memory initializer, uint256 saltNonce) external returns (address proxy);
        function createChainSpecificProxyWithNonce(address _singleton, bytes memory initializer, uint256 saltNonce) external returns (address proxy);
        function createProxyWithCallback(address _singleton, bytes memory initializer, uint256 saltNonce, address callback) external returns (address proxy);
        function proxyCreationCode() external pure returns (bytes memory);
        function getChainId() external view returns (uint256);
    }
}
