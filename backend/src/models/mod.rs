pub mod catalog;
pub mod gear;
pub mod macros;
pub mod target;
pub mod time;

pub use catalog::*;
pub use gear::*;
pub use target::*;
pub use time::*;
