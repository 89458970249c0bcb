mod account_handler;

pub use account_handler::*;
