//! Backend access.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{CompleteStepResponse, LoginResponse, UserProfile};
