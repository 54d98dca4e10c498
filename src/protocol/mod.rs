pub(crate) mod error_shapes;
pub mod heck;
pub mod openai_chat;
