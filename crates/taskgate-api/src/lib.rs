// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taskgate-api
//!
//! HTTP boundary for the taskgate task backend.
//!
//! Routes are served by axum. Every request outside the public paths passes
//! through [`AuthLayer`](middleware::AuthLayer), which asks the core
//! [`AccessGate`](taskgate_core::AccessGate) for a decision before the handler
//! runs.
//!
//! ```text
//! /health                      public
//! /auth/{login,signup}         public, credentials in body
//! /auth/{logout,validate-token} public, bearer header read by the handler
//! /users/*                     protected
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;
pub mod validation;

pub use config::{ApiConfig, CorsConfig};
pub use context::AuthContext;
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
