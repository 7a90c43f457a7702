//! The signer seam.
//!
//! The protocol needs exactly one thing from key management: a receiving
//! address for the selected network. Transaction signing itself happens in
//! the node's wallet via PSBT finalization, so no key material crosses this
//! boundary.

use std::fmt;

use crate::error::{LedgerError, Result};

/// Network selection for address derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Mainnet,
    Testnet,
    #[default]
    Regtest,
}

impl Network {
    /// Parse from the conventional lowercase name.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            other => Err(LedgerError::Signer(format!("unknown network: {other:?}"))),
        }
    }

    /// Whether `address` carries this network's prefix.
    ///
    /// A prefix check only; full address validation belongs to the node.
    pub fn matches_address(&self, address: &str) -> bool {
        match self {
            Self::Mainnet => {
                address.starts_with("bc1") || address.starts_with('1') || address.starts_with('3')
            }
            Self::Testnet => {
                address.starts_with("tb1")
                    || address.starts_with('m')
                    || address.starts_with('n')
                    || address.starts_with('2')
            }
            Self::Regtest => address.starts_with("bcrt1"),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        };
        f.write_str(name)
    }
}

/// A receiving address on the selected network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque signer capability: produces receiving addresses.
pub trait Signer: Send + Sync {
    /// The network this signer derives addresses for.
    fn network(&self) -> Network;

    /// A receiving address funds can be committed to.
    fn receiving_address(&self) -> Result<Address>;
}

/// A signer backed by a pre-derived address from configuration.
///
/// Key loading and derivation live outside this crate; what arrives here is
/// the already-derived address.
#[derive(Debug, Clone)]
pub struct StaticSigner {
    network: Network,
    address: Address,
}

impl StaticSigner {
    pub fn new(network: Network, address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        if address.is_empty() {
            return Err(LedgerError::Signer("empty receiving address".into()));
        }
        Ok(Self {
            network,
            address: Address::new(address),
        })
    }
}

impl Signer for StaticSigner {
    fn network(&self) -> Network {
        self.network
    }

    fn receiving_address(&self) -> Result<Address> {
        Ok(self.address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parse() {
        assert_eq!(Network::parse("regtest").unwrap(), Network::Regtest);
        assert_eq!(Network::parse("mainnet").unwrap(), Network::Mainnet);
        assert!(Network::parse("simnet").is_err());
    }

    #[test]
    fn test_address_prefix_per_network() {
        assert!(Network::Regtest.matches_address("bcrt1qexample"));
        assert!(!Network::Regtest.matches_address("bc1qexample"));

        assert!(Network::Mainnet.matches_address("bc1qexample"));
        assert!(Network::Mainnet.matches_address("1BoatSLRHtKNngkdXEeobR76b53LETtpyT"));
        assert!(!Network::Mainnet.matches_address("tb1qexample"));

        assert!(Network::Testnet.matches_address("tb1qexample"));
        assert!(!Network::Testnet.matches_address("bcrt1qexample"));
    }

    #[test]
    fn test_static_signer() {
        let signer = StaticSigner::new(Network::Regtest, "bcrt1qexample").unwrap();
        assert_eq!(signer.network(), Network::Regtest);
        assert_eq!(signer.receiving_address().unwrap().as_str(), "bcrt1qexample");
    }

    #[test]
    fn test_empty_address_rejected() {
        assert!(StaticSigner::new(Network::Regtest, "").is_err());
    }
}
