// Public handlers: no bearer token required.

pub mod register; // POST /register - create a user account
pub mod service; // GET / and GET /health
pub mod token; // POST /token - exchange credentials for a bearer token

pub use register::register;
pub use service::{health, root};
pub use token::token;
