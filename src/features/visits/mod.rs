//! Day-granularity visit counting kept entirely in the session.

mod counter;

pub use counter::visitor_cookie_handler;
