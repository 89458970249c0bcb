mod account_service;

pub use account_service::{check_credentials, AccountService, LoginOutcome, RegisterOutcome};
