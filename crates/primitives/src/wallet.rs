use crate::{
    address::checksummed,
    error::{CosignError, Result},
    version::SafeVersion,
};
use alloy_primitives::{Address, U256};
use alloy_sol_types::Eip712Domain;
use cosign_contracts::SENTINEL_OWNERS;
use serde::{Deserialize, Serialize};

/// Everything the transaction hash depends on besides the transaction itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SafeDomain {
    pub address: Address,
    pub chain_id: u64,
    pub version: SafeVersion,
}

impl SafeDomain {
    /// EIP-712 domain for this Safe. Safes older than 1.3.0 omit the chain id.
    pub fn eip712_domain(&self) -> Eip712Domain {
        let chain_id = self
            .version
            .domain_has_chain_id()
            .then(|| U256::from(self.chain_id));
        Eip712Domain::new(None, None, chain_id, Some(self.address), None)
    }
}

/// A deployed Safe: its owners in linked-list order, the enforced threshold and the
/// next nonce the contract will accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    address: Address,
    chain_id: u64,
    #[serde(with = "version_string")]
    version: SafeVersion,
    owners: Vec<Address>,
    threshold: u64,
    nonce: u64,
}

impl Wallet {
    /// Validates the owner set (non-empty, unique, no reserved addresses) and the threshold.
    pub fn new(
        address: Address,
        chain_id: u64,
        version: SafeVersion,
        owners: Vec<Address>,
        threshold: u64,
        nonce: u64,
    ) -> Result<Self> {
        if owners.is_empty() {
            return Err(CosignError::TooFewOwners);
        }
        for (i, owner) in owners.iter().enumerate() {
            check_owner_address(address, *owner)?;
            if owners[..i].contains(owner) {
                return Err(CosignError::DuplicateOwner(*owner));
            }
        }
        check_threshold(threshold, owners.len())?;

        Ok(Self {
            address,
            chain_id,
            version,
            owners,
            threshold,
            nonce,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn version(&self) -> SafeVersion {
        self.version
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// Signatures the contract enforces.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Next nonce the contract will execute.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn domain(&self) -> SafeDomain {
        SafeDomain {
            address: self.address,
            chain_id: self.chain_id,
            version: self.version,
        }
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// Owner preceding `owner` in the contract's linked list.
    pub fn prev_owner(&self, owner: &Address) -> Result<Address> {
        match self.owners.iter().position(|o| o == owner) {
            Some(0) => Ok(SENTINEL_OWNERS),
            Some(i) => Ok(self.owners[i - 1]),
            None => Err(CosignError::OwnerNotFound(*owner)),
        }
    }

    /// A nonce below the current one was spent by some execution and can never run again.
    pub fn is_nonce_consumed(&self, nonce: u64) -> bool {
        nonce < self.nonce
    }

    /// Records that the transaction at `nonce` executed, which burns every other
    /// transaction sharing that nonce.
    pub fn apply_execution(&mut self, nonce: u64) -> Result<()> {
        if nonce != self.nonce {
            return Err(CosignError::NonceConsumed {
                nonce,
                current: self.nonce,
            });
        }
        self.nonce += 1;
        Ok(())
    }

    pub(crate) fn set_owners(&mut self, owners: Vec<Address>, threshold: u64) {
        self.owners = owners;
        self.threshold = threshold;
    }
}

pub(crate) fn check_owner_address(safe: Address, owner: Address) -> Result<()> {
    if owner.is_zero() || owner == SENTINEL_OWNERS || owner == safe {
        return Err(CosignError::InvalidAddress(checksummed(&owner)));
    }
    Ok(())
}

pub(crate) fn check_threshold(threshold: u64, owners: usize) -> Result<()> {
    if threshold == 0 || threshold > owners as u64 {
        return Err(CosignError::InvalidThreshold { threshold, owners });
    }
    Ok(())
}

mod version_string {
    use crate::version::SafeVersion;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub(super) fn serialize<S: Serializer>(v: &SafeVersion, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(v)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SafeVersion, D::Error> {
        String::deserialize(d)?.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(n: u8) -> Vec<Address> {
        (1..=n).map(|i| Address::repeat_byte(0x10 + i)).collect()
    }

    fn wallet(n: u8, threshold: u64) -> Result<Wallet> {
        Wallet::new(
            Address::repeat_byte(0xAA),
            1,
            SafeVersion::V1_3_0,
            owners(n),
            threshold,
            0,
        )
    }

    #[test]
    fn validates_threshold_range() {
        assert!(wallet(3, 1).is_ok());
        assert!(wallet(3, 3).is_ok());
        assert_eq!(
            wallet(3, 0),
            Err(CosignError::InvalidThreshold {
                threshold: 0,
                owners: 3
            })
        );
        assert_eq!(
            wallet(3, 4),
            Err(CosignError::InvalidThreshold {
                threshold: 4,
                owners: 3
            })
        );
    }

    #[test]
    fn rejects_bad_owner_sets() {
        assert_eq!(wallet(0, 1), Err(CosignError::TooFewOwners));

        let dup = Address::repeat_byte(0x11);
        let err = Wallet::new(
            Address::repeat_byte(0xAA),
            1,
            SafeVersion::V1_3_0,
            vec![dup, Address::repeat_byte(0x12), dup],
            1,
            0,
        );
        assert_eq!(err, Err(CosignError::DuplicateOwner(dup)));

        let sentinel = Wallet::new(
            Address::repeat_byte(0xAA),
            1,
            SafeVersion::V1_3_0,
            vec![SENTINEL_OWNERS],
            1,
            0,
        );
        assert!(matches!(sentinel, Err(CosignError::InvalidAddress(_))));
    }

    #[test]
    fn prev_owner_follows_linked_list() {
        let wallet = wallet(3, 2).unwrap();
        let owners = owners(3);
        assert_eq!(wallet.prev_owner(&owners[0]).unwrap(), SENTINEL_OWNERS);
        assert_eq!(wallet.prev_owner(&owners[2]).unwrap(), owners[1]);
        assert!(wallet.prev_owner(&Address::repeat_byte(0x99)).is_err());
    }

    #[test]
    fn execution_consumes_nonce() {
        let mut wallet = wallet(3, 2).unwrap();
        assert!(!wallet.is_nonce_consumed(0));
        wallet.apply_execution(0).unwrap();
        assert!(wallet.is_nonce_consumed(0));
        assert_eq!(wallet.nonce(), 1);
        assert_eq!(
            wallet.apply_execution(0),
            Err(CosignError::NonceConsumed {
                nonce: 0,
                current: 1
            })
        );
    }

    #[test]
    fn legacy_domain_omits_chain_id() {
        let mut domain = wallet(1, 1).unwrap().domain();
        assert!(domain.eip712_domain().chain_id.is_some());
        domain.version = "1.2.0".parse().unwrap();
        assert!(domain.eip712_domain().chain_id.is_none());
    }

    #[test]
    fn serde_roundtrip_keeps_version() {
        let wallet = wallet(2, 1).unwrap();
        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["version"], "1.3.0");
        let back: Wallet = serde_json::from_value(json).unwrap();
        assert_eq!(back, wallet);
    }
}
