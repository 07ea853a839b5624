pub mod implementations;
pub mod input;
pub mod traits;
