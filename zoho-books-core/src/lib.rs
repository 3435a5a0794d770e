//! Zoho Books Core Library
//!
//! Transport-independent business logic of the Zoho Books MCP server:
//! - OAuth token lifecycle (`TokenManager`)
//! - Authenticated request dispatch with one refresh-and-retry on 401 (`ApiClient`)
//! - Contact, invoice, expense, item and sales order services
//! - Read-only reports behind the MCP resources
//!
//! Persistence is abstracted through the [`CredentialStore`] trait; the
//! binary supplies a file-backed implementation.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult, ErrorKind};
pub use services::{ApiClient, ServiceContext, TokenManager};
pub use traits::CredentialStore;
pub use utils::validation::Validate;
