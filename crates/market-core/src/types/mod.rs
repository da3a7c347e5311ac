//! 마켓 봇 전반에서 사용되는 공통 타입.

mod ids;
mod quote;
mod schedule;
mod snapshot;
mod symbol;

pub use ids::*;
pub use quote::*;
pub use schedule::*;
pub use snapshot::*;
pub use symbol::*;
