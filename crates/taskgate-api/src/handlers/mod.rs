// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness
//! - [`auth`]: login, signup, logout, token validation
//! - [`users`]: profile and account management for the authenticated caller

mod auth;
mod health;
mod users;

pub use auth::*;
pub use health::*;
pub use users::*;
