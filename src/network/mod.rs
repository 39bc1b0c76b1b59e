//! Network selection.
//!
//! # Data Flow
//! ```text
//! Web3Config.networks (non-empty, validated)
//!     → NetworkRegistry (index 0 active)
//!     → switch_network(i): build new node handle → atomic swap → notify
//! ```
//!
//! # Design Decisions
//! - Entries are never mutated, only selected by index
//! - In-flight operations keep the handle they captured

pub mod registry;
pub mod types;

pub use registry::{ActiveNetwork, NetworkChanged, NetworkRegistry};
pub use types::Network;
