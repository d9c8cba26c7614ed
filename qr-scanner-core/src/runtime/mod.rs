pub mod executor;
pub mod reply;
