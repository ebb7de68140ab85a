pub mod algebra;
pub mod analysis;
pub mod arith;
pub mod config;
pub mod error;
pub mod exact;
pub mod gggx;
pub mod memory;
pub mod solid;

pub use arith::{add, combine_barriers, combine_confidence, divide, multiply, subtract, Operation};
pub use config::SolidConfig;
pub use error::{Result, SolidError};
pub use gggx::{analyze, GggxResult, Phase};
pub use memory::{PoolStats, SolidId, SolidPool};
pub use solid::{AstSolidLiteral, Barrier, Certainty, Confidence, GapMagnitude, SolidNumber, Terminal};
