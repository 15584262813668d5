pub mod consts;
pub mod error;
pub mod filters;
pub mod io;
pub mod progress;
pub mod spots;
pub mod stack;
