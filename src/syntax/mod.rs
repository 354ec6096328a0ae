//! Pattern syntax: tokens, the tokenizer and the serializer.

pub mod char_table;
pub mod class;
pub mod escape;
pub mod serializer;
pub mod token;
pub mod tokenizer;
pub mod width;

pub use serializer::{layout, serialize};
pub use token::{Token, TokenKind};
pub use tokenizer::tokenize;
