// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # taskgate Integration Tests
//!
//! Shared helpers for the integration suites under `tests/`.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Canonical accounts and configurations
//!   - `mocks`: Account stores with injectable failures
//!   - `harness`: In-process HTTP harness over the axum router
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p taskgate-tests
//! cargo test -p taskgate-tests --test integration_session
//! cargo test -p taskgate-tests --test integration_api
//! ```
//!
//! ## Test Categories
//!
//! ### Session Tests (`integration_session.rs`)
//! - Login, signup, logout and token validation
//! - Revocation lifetime and sweeping
//! - Concurrent revocation
//! - Record store failures
//!
//! ### API Tests (`integration_api.rs`)
//! - End to end flows over HTTP
//! - Status codes and error bodies
//! - Account upkeep endpoints

pub mod common;
