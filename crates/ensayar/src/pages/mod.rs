//! Concrete page objects.

pub mod login;

pub use login::LoginPage;
