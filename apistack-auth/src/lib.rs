//! Request authorization for apistack
//!
//! Implements the API-key check run in front of protected routes.

pub mod api_key;

pub use api_key::{
    ApiKeyAuthorizer, AuthContext, AuthError, AuthReason, AuthorizerRequest, AuthorizerResponse, API_KEY_HEADER,
};
