use crate::error::{CosignError, Result};
use std::{fmt, str::FromStr};

/// Version of the Safe singleton a wallet proxies to.
///
/// The version selects the EIP-712 encoding: `1.3.0` added `chainId` to the domain, and
/// `1.0.0` renamed the `dataGas` field of the transaction struct to `baseGas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SafeVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    /// L2 singletons emit extra events but hash identically.
    pub l2: bool,
}

impl SafeVersion {
    pub const V1_0_0: Self = Self::new(1, 0, 0);
    pub const V1_3_0: Self = Self::new(1, 3, 0);
    pub const V1_4_1: Self = Self::new(1, 4, 1);

    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
            l2: false,
        }
    }

    fn triple(&self) -> (u16, u16, u16) {
        (self.major, self.minor, self.patch)
    }

    /// Whether the domain separator includes the chain id.
    pub fn domain_has_chain_id(&self) -> bool {
        self.triple() >= Self::V1_3_0.triple()
    }

    /// Whether the transaction struct names its second gas field `baseGas`.
    pub fn uses_base_gas(&self) -> bool {
        self.triple() >= Self::V1_0_0.triple()
    }
}

impl Default for SafeVersion {
    fn default() -> Self {
        Self::V1_3_0
    }
}

impl FromStr for SafeVersion {
    type Err = CosignError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CosignError::Config(format!("unrecognized Safe version `{s}`"));
        let trimmed = s.trim();
        let (core, l2) = match trimmed.split_once('+') {
            Some((core, suffix)) if suffix.eq_ignore_ascii_case("l2") => (core, true),
            Some(_) => return Err(invalid()),
            None => (trimmed, false),
        };

        let mut parts = core.split('.').map(|part| part.parse::<u16>());
        let (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        Ok(Self {
            major,
            minor,
            patch,
            l2,
        })
    }
}

impl fmt::Display for SafeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.l2 {
            f.write_str("+L2")?;
        }
        Ok(())
    }
}
