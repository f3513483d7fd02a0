//! # Protocolo 7D Core Library
//!
//! Client-side logic for Protocolo 7D, a seven-step habit-change program.
//! Screens (mobile or the bundled CLI) are a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Auth State**: the signed-in email and onboarding flag, mirrored into a
//!   device-local key-value store on every write
//! - **Progress State**: in-memory cache of the backend's progress document,
//!   refreshed by shallow merge and updated optimistically on step completion
//! - **API Client**: six JSON requests against one configurable backend
//! - **Program**: application root owning the above and running the login,
//!   onboarding, dashboard and step-completion flows
//!
//! ## Key Components
//!
//! - [`Program`]: flows and routing
//! - [`AuthState`] / [`ProgressState`]: the two state containers
//! - [`ApiClient`]: backend access
//! - [`Config`]: backend URL and timeout

pub mod api;
pub mod auth;
pub mod badges;
pub mod clean_time;
pub mod error;
pub mod program;
pub mod progress;
pub mod steps;
pub mod storage;

pub use api::{ApiClient, CompleteStepResponse, LoginResponse, UserProfile};
pub use auth::{AuthState, Session};
pub use clean_time::CleanTimeTicker;
pub use error::{ConfigError, CoreError, NetworkError, StoreError, ValidationError};
pub use program::{Dashboard, DialogMessage, FlowError, Program, Route, StepCompletion, StepView};
pub use progress::{ProgressPatch, ProgressSnapshot, ProgressState, ToolAnswers};
pub use steps::{StepDefinition, EBOOK_URL, STEPS};
pub use storage::{Config, FileStore, KeyValueStore, MemoryStore};
