//! Request handlers.

pub mod admin;
pub mod carousels;
pub mod health;
pub mod pages;
pub mod posts;
pub mod requests;
pub mod site;

pub use admin::*;
pub use carousels::*;
pub use health::*;
pub use pages::*;
pub use posts::*;
pub use requests::*;
pub use site::*;
