//! Implementations of the domain ports, plus the command-script driver.

pub mod clipboard;
pub mod clock;
pub mod ids;
pub mod script;
