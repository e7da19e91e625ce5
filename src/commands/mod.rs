//! Command implementations

pub mod build;
pub mod check;
pub mod clean;
pub mod list;
pub mod new;
pub mod serve;

#[cfg(all(test, unix))]
pub(crate) mod testing;
