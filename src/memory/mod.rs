//! # Value store
//!
//! Solid Numbers handed to generated code live in a fixed-capacity pool with
//! reference-counted slots.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   SolidPool     │───▶│  slots[index]   │───▶│  SolidNumber    │
//! │ (free list)     │    │ (generation)    │    │  + ref_count    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   PoolStats     │
//! └─────────────────┘
//! ```

pub mod pool;
pub mod stats;

pub use pool::{SolidId, SolidPool};
pub use stats::PoolStats;
