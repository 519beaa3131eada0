//! Infrastructure layer - External service implementations

pub mod logging;
pub mod stopwatch;
pub mod storage;
pub mod user;
