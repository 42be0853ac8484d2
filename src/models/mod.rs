pub mod tweet;
pub mod signal;
