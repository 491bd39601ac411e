pub mod dispatch;
pub mod protocol;
pub mod registry;
pub mod server;

pub use dispatch::Dispatcher;
