//! Request and response bodies, one plain struct per direction.
//!
//! Inbound structs are converted into persistence models with explicit
//! field copies; outbound structs are built from models the same way so a
//! stored password hash can never reach a response.

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::database::models::{Item, ItemFields, User};
use crate::error::ApiError;

/// POST /register body
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
}

impl UserCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::validation("username must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRead {
    pub id: i32,
    pub username: String,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// POST /token form body, OAuth2 password grant layout
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub grant_type: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        match self.grant_type.as_deref() {
            None | Some("password") => Ok(()),
            Some(other) => Err(ApiError::validation(format!(
                "unsupported grant_type '{}', expected 'password'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// POST /items and PUT /items/{id} body. Every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "integral_quantity")]
    pub quantity: i32,
    pub price: f64,
}

/// Accepts `5` and `5.0` alike; fractional or out-of-range numbers are refused.
fn integral_quantity<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => i32::try_from(n)
            .map_err(|_| de::Error::custom(format!("quantity {} is out of range", n))),
        Number::Float(f) if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 => {
            Ok(f as i32)
        }
        Number::Float(f) => Err(de::Error::custom(format!(
            "quantity must be a whole number, got {}",
            f
        ))),
    }
}

impl From<ItemCreate> for ItemFields {
    fn from(input: ItemCreate) -> Self {
        Self {
            name: input.name,
            description: input.description,
            quantity: input.quantity,
            price: input.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRead {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: f64,
}

impl From<Item> for ItemRead {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            price: item.price,
        }
    }
}
