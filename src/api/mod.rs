pub mod schemas;

pub use schemas::{ItemCreate, ItemRead, LoginForm, Token, UserCreate, UserRead};
