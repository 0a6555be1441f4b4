//! Deterministic addresses and the sub-account deriver
//!
//! Every record in the protocol (series, vaults, markets, orders, escrows,
//! holder accounts) lives at an [`Address`] computed by [`derive`] from a
//! purpose tag, a parent address and the parameters that distinguish it.
//! Nothing holds a private key for a derived address: authority over the
//! balances stored there is granted separately by the ledger.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Domain separator mixed into every derivation.
const DERIVE_DOMAIN: &[u8] = b"optx/derive/v1";

/// Purpose tags used by the protocol's derivations.
pub mod tags {
    pub const OPTION_SERIES: &str = "option_series";
    pub const OPTION_MINT: &str = "option_mint";
    pub const REDEMPTION_MINT: &str = "redemption_mint";
    pub const COLLATERAL_VAULT: &str = "collateral_vault";
    pub const CONSIDERATION_VAULT: &str = "consideration_vault";
    pub const CONSIDERATION_CLAIM: &str = "consideration_claim";
    pub const MARKET: &str = "market";
    pub const ORDER: &str = "order";
    pub const ESCROW: &str = "escrow";
    pub const HOLDER_ACCOUNT: &str = "holder_account";
    pub const LABEL: &str = "label";
}

/// 32-byte identifier of an asset class, account or protocol record
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 32]);

impl Address {
    /// The all-zero address, used as the parent of root derivations
    pub const ZERO: Address = Address([0u8; 32]);

    /// Wrap raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Stable address for a human-readable label
    ///
    /// Used wherever a wallet key would normally identify a participant
    /// (scripted sessions, tests).
    pub fn from_label(label: &str) -> Self {
        derive(tags::LABEL, &Address::ZERO, &[label.as_bytes()])
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Abbreviated form for log lines
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

/// Derive the canonical address for `(tag, parent, params)`
///
/// Every component is length-prefixed before hashing, so two different
/// tuples never feed the same byte string to SHA-256. Callers must pass
/// every economically distinguishing parameter; anything left out aliases.
pub fn derive(tag: &str, parent: &Address, params: &[&[u8]]) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(DERIVE_DOMAIN);
    hasher.update((tag.len() as u32).to_le_bytes());
    hasher.update(tag.as_bytes());
    hasher.update(parent.0);
    for param in params {
        hasher.update((param.len() as u32).to_le_bytes());
        hasher.update(param);
    }
    Address(hasher.finalize().into())
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| Error::InvalidAddress {
            input: s.to_string(),
            reason,
        };
        let bytes = hex::decode(s).map_err(|e| invalid(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| invalid(format!("expected 32 bytes, got {}", v.len())))?;
        Ok(Address(bytes))
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AddressVisitor;

        impl<'de> Visitor<'de> for AddressVisitor {
            type Value = Address;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 64-character hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Address, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(AddressVisitor)
    }
}
