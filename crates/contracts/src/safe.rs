use alloy_primitives::{Address, address};

/// Head of the Safe owner linked list. Used as `prevOwner` for the first owner.
pub const SENTINEL_OWNERS: Address = address!("0000000000000000000000000000000000000001");

crate::sol! {
    /// Safe core interface (v1.3.0 and later) used for reads and execution.
    #[derive(Debug, PartialEq, Eq)]
    interface ISafe {
        /// Execute a transaction once enough owner signatures are attached
        ///
        /// @param signatures Packed 65-byte signatures ordered by signer address
        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes memory signatures
        ) external payable returns (bool success);

        /// Next nonce the Safe will accept
        function nonce() external view returns (uint256);

        /// Number of signatures the contract enforces
        function getThreshold() external view returns (uint256);

        /// Owners in linked-list order
        function getOwners() external view returns (address[] memory);

        function isOwner(address owner) external view returns (bool);

        /// Semantic version of the singleton, e.g. "1.4.1"
        function VERSION() external view returns (string memory);

        function getTransactionHash(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            uint256 _nonce
        ) external view returns (bytes32);

        event ExecutionSuccess(bytes32 indexed txHash, uint256 payment);
        event ExecutionFailure(bytes32 indexed txHash, uint256 payment);
    }

    /// Owner management calls. The Safe calls these on itself, so a proposal
    /// targets the Safe address with one of these as call data.
    #[derive(Debug, PartialEq, Eq)]
    interface IOwnerManager {
        function addOwnerWithThreshold(address owner, uint256 threshold) external;

        /// @param prevOwner Owner preceding `owner` in the linked list
        function removeOwner(address prevOwner, address owner, uint256 threshold) external;

        /// @param prevOwner Owner preceding `oldOwner` in the linked list
        function swapOwner(address prevOwner, address oldOwner, address newOwner) external;

        function changeThreshold(uint256 threshold) external;

        event AddedOwner(address indexed owner);
        event RemovedOwner(address indexed owner);
        event ChangedThreshold(uint256 threshold);
    }
}

/// A Safe `GSxxx` revert code with its meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeRevert {
    pub code: &'static str,
    pub reason: &'static str,
}

impl SafeRevert {
    const KNOWN: &'static [(&'static str, &'static str)] = &[
        ("GS000", "could not finish initialization"),
        ("GS001", "threshold needs to be defined"),
        ("GS010", "not enough gas to execute Safe transaction"),
        ("GS011", "could not pay gas costs with ether"),
        ("GS012", "could not pay gas costs with token"),
        ("GS013", "Safe transaction failed when gasPrice and safeTxGas were 0"),
        ("GS020", "signatures data too short, fewer signatures than the on-chain threshold"),
        ("GS021", "invalid contract signature location: inside static part"),
        ("GS022", "invalid contract signature location: length not present"),
        ("GS023", "invalid contract signature location: data not complete"),
        ("GS024", "invalid contract signature provided"),
        ("GS025", "hash has not been approved"),
        ("GS026", "invalid owner provided, signatures are unordered or not from owners"),
        ("GS030", "only owners can approve a hash"),
        ("GS031", "method can only be called from this contract"),
        ("GS200", "owners have already been setup"),
        ("GS201", "threshold cannot exceed owner count"),
        ("GS202", "threshold needs to be greater than 0"),
        ("GS203", "invalid owner address provided"),
        ("GS204", "address is already an owner"),
        ("GS205", "invalid prevOwner, owner pair provided"),
    ];

    /// Looks up a code such as `"GS026"`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::KNOWN
            .iter()
            .find(|(known, _)| *known == code)
            .map(|&(code, reason)| Self { code, reason })
    }

    /// Finds the first `GSxxx` code inside a revert message or error string.
    pub fn find_in(message: &str) -> Option<Self> {
        let bytes = message.as_bytes();
        (0..bytes.len().saturating_sub(4)).find_map(|i| {
            let candidate = &bytes[i..i + 5];
            if candidate.starts_with(b"GS") && candidate[2..].iter().all(u8::is_ascii_digit) {
                std::str::from_utf8(candidate).ok().and_then(Self::from_code)
            } else {
                None
            }
        })
    }

    /// True for reverts caused by too few or badly ordered signatures.
    pub fn is_signature_failure(&self) -> bool {
        matches!(self.code, "GS020" | "GS024" | "GS025" | "GS026")
    }
}

impl std::fmt::Display for SafeRevert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}
