pub mod error;
pub mod label;
pub mod message;
pub mod poll;
pub mod result;
pub mod time;
