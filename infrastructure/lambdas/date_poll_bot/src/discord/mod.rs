pub mod client;
pub mod mapper;
pub mod model;
pub mod service;

pub use client::{Client, HttpClient};
pub use service::{Service, ServiceError};
