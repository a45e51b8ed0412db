crate::sol! {
    /// Subset of ERC-20 used to build and decode token transfers.
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);

        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use alloy_sol_types::SolCall;

    #[test]
    fn transfer_selector_matches_erc20() {
        assert_eq!(IERC20::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn transfer_roundtrip_keeps_arguments() {
        let to = Address::random();
        let call = IERC20::transferCall {
            to,
            amount: U256::from(500),
        };
        let decoded = IERC20::transferCall::abi_decode(&call.abi_encode()).unwrap();
        assert_eq!(decoded.to, to);
        assert_eq!(decoded.amount, U256::from(500));
    }
}
