pub mod dispatch;
pub mod events;

pub use dispatch::{dispatch_created, dispatch_updated};
