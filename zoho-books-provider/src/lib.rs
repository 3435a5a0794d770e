//! # zoho-books-provider
//!
//! Low-level plumbing for talking to the Zoho Books REST API and the Zoho
//! OAuth v2 token endpoint.
//!
//! ## Regions
//!
//! | Region | Domain | API base |
//! |--------|--------|----------|
//! | `US` | `com` | `https://www.zohoapis.com/books/v3` |
//! | `EU` | `eu` | `https://www.zohoapis.eu/books/v3` |
//! | `IN` | `in` | `https://www.zohoapis.in/books/v3` |
//! | `AU` | `com.au` | `https://www.zohoapis.com.au/books/v3` |
//! | `JP` | `jp` | `https://www.zohoapis.jp/books/v3` |
//! | `CN` | `com.cn` | `https://www.zohoapis.com.cn/books/v3` |
//! | `CA` | `ca` | `https://www.zohoapis.ca/books/v3` |
//!
//! Unknown region codes are rejected when parsed; there is no silent default
//! once a value has been supplied.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)* - Use the platform's native TLS implementation.
//! - **`rustls`** - Use rustls. Recommended for static and cross-compiled builds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use zoho_books_provider::{
//!     BooksApi, HttpMethod, OAuthClient, Region, ReqwestBackend, RetryPolicy, TokenEndpoint,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(ReqwestBackend::new(Duration::from_secs(60))?);
//!     let region: Region = "EU".parse()?;
//!
//!     let oauth = OAuthClient::new(
//!         backend.clone(),
//!         region.auth_base_url(),
//!         "client-id",
//!         "client-secret",
//!         RetryPolicy::default(),
//!     );
//!     let grant = oauth.refresh("refresh-token").await?;
//!
//!     let books = BooksApi::new(backend, region.api_base_url(), "org-id", RetryPolicy::default());
//!     let contacts = books
//!         .send(&grant.access_token, HttpMethod::Get, "/contacts", &[], None)
//!         .await?;
//!     println!("{contacts}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ZohoError>`](ZohoError):
//!
//! - [`ZohoError::Unauthorized`] - the API rejected the access token (HTTP 401)
//! - [`ZohoError::InvalidCredentials`] - the token endpoint rejected the refresh token or client
//! - [`ZohoError::RateLimited`] - HTTP 429 (retryable)
//! - [`ZohoError::ServerError`] - HTTP 5xx (retryable)
//! - [`ZohoError::NetworkError`] / [`ZohoError::Timeout`] - transport failures (retryable)
//!
//! Retryable errors are retried by [`HttpUtils::execute_request_with_retry`]
//! according to a [`RetryPolicy`].

mod books;
mod error;
mod http_client;
mod oauth;
mod region;
mod traits;
mod utils;

pub use books::{BooksApi, EMPTY_SUCCESS_MESSAGE};
pub use error::{Result, ZohoError};
pub use http_client::{
    HttpMethod, HttpRequest, HttpResponse, HttpUtils, RequestBody, ReqwestBackend, RetryPolicy,
};
pub use oauth::{DEFAULT_EXPIRES_IN_SECS, DEFAULT_SCOPES, OAuthClient, TokenGrant};
pub use region::Region;
pub use traits::{HttpBackend, TokenEndpoint};
pub use utils::log_sanitizer;
