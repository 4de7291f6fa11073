// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Web3 University

//! Authentication errors.

use crate::graphql::GraphQlError;
use crate::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The operation needs a session token and none is held.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error(transparent)]
    Api(#[from] GraphQlError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
