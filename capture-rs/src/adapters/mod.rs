pub mod serial;

pub use serial::SerialOpener;
