//! Owner-set changes. A change is itself a Safe transaction: a self call carrying one of
//! the owner manager calls, validated against the current owner set before it is built.

use crate::{
    error::{CosignError, Result},
    wallet::{Wallet, check_owner_address, check_threshold},
};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolInterface};
use cosign_contracts::IOwnerManager::{self, IOwnerManagerCalls};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OwnerAction {
    AddOwner { owner: Address, threshold: u64 },
    RemoveOwner { owner: Address, threshold: u64 },
    SwapOwner { old_owner: Address, new_owner: Address },
    ChangeThreshold { threshold: u64 },
}

impl OwnerAction {
    /// Checks the action against the owner set it would modify.
    pub fn validate(&self, wallet: &Wallet) -> Result<()> {
        let owners = wallet.owners().len();
        match self {
            Self::AddOwner { owner, threshold } => {
                check_owner_address(wallet.address(), *owner)?;
                if wallet.is_owner(owner) {
                    return Err(CosignError::DuplicateOwner(*owner));
                }
                check_threshold(*threshold, owners + 1)
            }
            Self::RemoveOwner { owner, threshold } => {
                if !wallet.is_owner(owner) {
                    return Err(CosignError::OwnerNotFound(*owner));
                }
                if owners <= 1 {
                    return Err(CosignError::TooFewOwners);
                }
                check_threshold(*threshold, owners - 1)
            }
            Self::SwapOwner {
                old_owner,
                new_owner,
            } => {
                if !wallet.is_owner(old_owner) {
                    return Err(CosignError::OwnerNotFound(*old_owner));
                }
                check_owner_address(wallet.address(), *new_owner)?;
                if wallet.is_owner(new_owner) {
                    return Err(CosignError::DuplicateOwner(*new_owner));
                }
                Ok(())
            }
            Self::ChangeThreshold { threshold } => check_threshold(*threshold, owners),
        }
    }

    /// Validates and ABI-encodes the owner manager call.
    pub fn encode(&self, wallet: &Wallet) -> Result<Bytes> {
        self.validate(wallet)?;
        let data = match self {
            Self::AddOwner { owner, threshold } => IOwnerManager::addOwnerWithThresholdCall {
                owner: *owner,
                threshold: U256::from(*threshold),
            }
            .abi_encode(),
            Self::RemoveOwner { owner, threshold } => IOwnerManager::removeOwnerCall {
                prevOwner: wallet.prev_owner(owner)?,
                owner: *owner,
                threshold: U256::from(*threshold),
            }
            .abi_encode(),
            Self::SwapOwner {
                old_owner,
                new_owner,
            } => IOwnerManager::swapOwnerCall {
                prevOwner: wallet.prev_owner(old_owner)?,
                oldOwner: *old_owner,
                newOwner: *new_owner,
            }
            .abi_encode(),
            Self::ChangeThreshold { threshold } => IOwnerManager::changeThresholdCall {
                threshold: U256::from(*threshold),
            }
            .abi_encode(),
        };
        Ok(data.into())
    }

    /// Decodes owner manager call data. Thresholds beyond `u64` are not owner changes
    /// cosign can represent and decode to `None`.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let threshold = |t: U256| u64::try_from(t).ok();
        match IOwnerManagerCalls::abi_decode(data).ok()? {
            IOwnerManagerCalls::addOwnerWithThreshold(call) => Some(Self::AddOwner {
                owner: call.owner,
                threshold: threshold(call.threshold)?,
            }),
            IOwnerManagerCalls::removeOwner(call) => Some(Self::RemoveOwner {
                owner: call.owner,
                threshold: threshold(call.threshold)?,
            }),
            IOwnerManagerCalls::swapOwner(call) => Some(Self::SwapOwner {
                old_owner: call.oldOwner,
                new_owner: call.newOwner,
            }),
            IOwnerManagerCalls::changeThreshold(call) => Some(Self::ChangeThreshold {
                threshold: threshold(call.threshold)?,
            }),
        }
    }

    /// Applies the action to a local wallet model the way the contract would after
    /// execution: added owners go to the head of the list, swaps keep the position.
    pub fn apply(&self, wallet: &mut Wallet) -> Result<()> {
        self.validate(wallet)?;
        let mut owners = wallet.owners().to_vec();
        let threshold = match self {
            Self::AddOwner { owner, threshold } => {
                owners.insert(0, *owner);
                *threshold
            }
            Self::RemoveOwner { owner, threshold } => {
                owners.retain(|o| o != owner);
                *threshold
            }
            Self::SwapOwner {
                old_owner,
                new_owner,
            } => {
                for o in owners.iter_mut().filter(|o| *o == old_owner) {
                    *o = *new_owner;
                }
                wallet.threshold()
            }
            Self::ChangeThreshold { threshold } => *threshold,
        };
        wallet.set_owners(owners, threshold);
        Ok(())
    }
}
