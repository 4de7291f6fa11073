// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! GraphQL access to the marketplace backend.
//!
//! - [`client`]: HTTP transport, bearer token and error envelope
//! - [`api`]: typed queries and mutations with cache invalidation
//! - [`documents`]: the query and mutation documents

pub mod api;
pub mod client;
pub mod documents;

pub use api::UniversityApi;
pub use client::{GraphQlClient, GraphQlError};
