// Copyright (c) 2022-2023 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// A command failure carrying the stable numeric code the transport layer
/// puts on the wire. Messages are surfaced to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidParameter(String),
    #[error("{0}")]
    InvalidAddressOrKey(String),
    #[error("{0}")]
    Deserialization(String),
    #[error("{0}")]
    Transaction(String),
    #[error("{0}")]
    TransactionRejected(String),
    #[error("transaction already in block chain")]
    TransactionAlreadyInChain,
    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidParameter(_) => -8,
            Error::InvalidAddressOrKey(_) => -5,
            Error::Deserialization(_) => -22,
            Error::Transaction(_) => -25,
            Error::TransactionRejected(_) => -26,
            Error::TransactionAlreadyInChain => -27,
            Error::Internal(_) => -32603,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(Error::InvalidParameter(String::new()).code(), -8);
        assert_eq!(Error::InvalidAddressOrKey(String::new()).code(), -5);
        assert_eq!(Error::Deserialization(String::new()).code(), -22);
        assert_eq!(Error::Transaction(String::new()).code(), -25);
        assert_eq!(Error::TransactionRejected(String::new()).code(), -26);
        assert_eq!(Error::TransactionAlreadyInChain.code(), -27);
        assert_eq!(Error::Internal(String::new()).code(), -32603);
    }
}
