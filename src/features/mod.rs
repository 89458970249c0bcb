pub mod accounts;
pub mod categories;
pub mod home;
pub mod pages;
pub mod visits;
