pub mod controller;
pub mod loop_worker;

pub use controller::ReaderController;
pub use loop_worker::reading_loop;
