pub mod chat;
pub mod notification;
pub mod recipe;
pub mod user;

pub use chat::*;
pub use notification::*;
pub use recipe::*;
pub use user::*;
