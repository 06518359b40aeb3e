pub(crate) mod base;

pub mod account;
pub mod chat;
pub mod notifications;
pub mod profiles;
pub mod recipes;

pub use account::Account;
pub use chat::Chat;
pub use notifications::Notifications;
pub use profiles::Profiles;
pub use recipes::Recipes;
