//! Rango: a small link directory where visitors browse categories of web
//! pages, registered users add to them, and the site counts daily visits.

pub mod app;
pub mod core;
pub mod features;
pub mod modules;
pub mod seed;
pub mod shared;
