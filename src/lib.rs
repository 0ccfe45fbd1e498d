//! Progressive personal income tax calculation with a persisted deduction
//! policy, served over HTTP and from the command line.

pub mod api;
pub mod policy;
pub mod request;
pub mod tax;
