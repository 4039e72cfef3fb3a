pub mod algod;
pub mod client;
pub mod resilience;
pub mod simulated;
pub mod units;

pub use algod::{AlgodClient, CachedAccountReader};
pub use client::*;
pub use resilience::{
    calculate_delay, retry_with_backoff, with_timeout, CircuitBreaker, CircuitBreakerConfig,
    CircuitState, ResilientCaller, RetryConfig,
};
pub use simulated::SimulatedLedger;
pub use units::{algos_to_micro_algos, micro_algos_to_algos, MICRO_ALGOS_PER_ALGO};
