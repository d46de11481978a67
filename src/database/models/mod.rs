pub mod item;
pub mod user;

pub use item::{Item, ItemFields};
pub use user::{NewUser, User};
