//! Token entity and its wire codec.

pub mod codec;
pub mod token;

pub use token::Token;
