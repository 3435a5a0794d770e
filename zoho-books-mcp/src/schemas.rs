//! MCP tool parameter schemas
//!
//! List, create and update tools take the request types of `zoho-books-core`
//! directly. The structs here cover tools that address a single record by id.
//! All derive `Deserialize` and `JsonSchema` as required by rmcp.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for `get_contact` and `delete_contact`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ContactIdParams {
    #[schemars(description = "The Zoho Books contact ID")]
    pub contact_id: String,
}

/// Parameters for `get_invoice`, `delete_invoice`, `mark_invoice_as_sent` and `void_invoice`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InvoiceIdParams {
    #[schemars(description = "The Zoho Books invoice ID")]
    pub invoice_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExpenseIdParams {
    #[schemars(description = "The Zoho Books expense ID")]
    pub expense_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ItemIdParams {
    #[schemars(description = "The Zoho Books item ID")]
    pub item_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SalesOrderIdParams {
    #[schemars(description = "The Zoho Books sales order ID")]
    pub salesorder_id: String,
}
