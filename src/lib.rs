pub mod error;
pub mod ffi;
pub mod log_factorial;
pub mod output;
pub mod table_reader;
pub mod types;
pub mod window;
