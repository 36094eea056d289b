//! Step definitions binding scenario phrases to page objects.

pub mod login;

pub use login::register_login_steps;
