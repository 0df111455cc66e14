pub mod decision;
pub mod dispatch;
pub mod log;
pub mod milestone;
pub mod progress;
pub mod project;
pub mod request;
pub mod serve;
pub mod shared;
