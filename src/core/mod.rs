// Core modules: raw storage, tokenizer, evaluation, categories and the read API.
pub mod category;
pub mod error;
pub mod evaluate;
pub mod ini;
pub mod list;
pub mod literal;
pub mod parser;
pub mod section;
pub mod store;
pub mod value;
