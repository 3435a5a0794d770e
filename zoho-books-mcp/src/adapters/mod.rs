//! Platform adapters for the MCP server
//!
//! - **`FileCredentialStore`**: persists the OAuth credential as a JSON
//!   token cache (`~/.zoho-mcp/.token_cache` unless `TOKEN_CACHE_PATH` says otherwise).

mod file_credential_store;

pub use file_credential_store::FileCredentialStore;
