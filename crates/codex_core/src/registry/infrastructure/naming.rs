//! Identifier and naming conventions for registry entities.
//!
//! Chain-side identities reach the registry as strings: token ids are decimal
//! representations of on-chain `uint256` values, provider ids and provider
//! metadata ids are opaque strings chosen by the metadata provider, and
//! addresses are hex-encoded account addresses.
//!
//! ## Addresses
//!
//! Addresses are compared and persisted case-insensitively. The [`Address`]
//! newtype lowercases its input on construction so that every comparison and
//! every stored value is already normalized, regardless of whether the event
//! source emitted checksummed (mixed-case) addresses.
//!
//! The zero address is a sentinel meaning "no owner": it is the old owner of
//! a freshly minted Record and the new owner of a destroyed one.

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

/// On-chain token identifier of a Record.
pub type TokenId = String;

/// Identifier of the metadata provider that backs a Record.
pub type ProviderId = String;

/// Hex string of the zero address.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Lowercase-normalized account address.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_lowercase())
    }

    /// The "no owner" sentinel.
    pub fn zero() -> Self {
        Self(ZERO_ADDRESS.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_ADDRESS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Address {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

/// Content-addressed identity of a Record: the triple asserted by mint and
/// modify events.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct HashTriple {
    pub name_hash: String,
    pub description_hash: String,
    pub file_hashes: Vec<String>,
}

impl HashTriple {
    pub fn new(name_hash: String, description_hash: String, file_hashes: Vec<String>) -> Self {
        Self { name_hash, description_hash, file_hashes }
    }

    /// File hashes in canonical (sorted) order; file order carries no meaning.
    pub fn sorted_file_hashes(&self) -> Vec<String> {
        let mut file_hashes = self.file_hashes.clone();
        file_hashes.sort();
        file_hashes
    }
}
