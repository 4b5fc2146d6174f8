pub mod allocation;
pub mod error;
pub mod market_data;

// Re-export the core types to provide a clean public API.
pub use allocation::{
    availability_mask, available_indices, normalize_l1, silent_divide, uniform_allocation,
};
pub use error::CoreError;
pub use market_data::{MarketData, PriceFrame, PriceSeries};
