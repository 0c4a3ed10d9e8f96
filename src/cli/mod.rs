//! CLI command handling

pub mod check;
pub mod notify_test;
pub mod run;
pub mod status;

pub use check::*;
pub use notify_test::*;
pub use run::*;
pub use status::*;
