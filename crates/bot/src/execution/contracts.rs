//! Compile-time ABI definitions for on-chain contracts via Alloy `sol!`.
//!
//! Encoding errors become compile errors instead of runtime ABI mismatches.

use alloy::sol;

// ---------------------------------------------------------------------------
// Uniswap V3 Pool
// ---------------------------------------------------------------------------

sol! {
    /// Uniswap V3 pool — `slot0` carries the current sqrt price.
    #[sol(rpc)]
    interface IUniswapV3Pool {
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
    }
}

// ---------------------------------------------------------------------------
// ERC-20
// ---------------------------------------------------------------------------

sol! {
    /// Minimal ERC-20 read interface.
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
    }
}
