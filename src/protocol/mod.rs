mod packet;
mod command;
pub mod constants;

pub use packet::*;
pub use command::*;
pub use constants::*;
