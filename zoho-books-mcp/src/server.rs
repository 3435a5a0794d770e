//! MCP Server implementation for Zoho Books.
//!
//! Exposes 31 tools over contacts, invoices, expenses, items and sales
//! orders, read-only markdown resources and guided workflow prompts.

use std::sync::Arc;

use chrono::Utc;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, GetPromptRequestParams, GetPromptResult, Implementation,
        ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParams, ProtocolVersion, ReadResourceRequestParams, ReadResourceResult,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use serde_json::json;

use zoho_books_core::services::{
    ContactService, ExpenseService, InvoiceService, ItemService, SalesOrderService,
    ServiceContext,
};
use zoho_books_core::types::{
    ConvertToInvoiceRequest, CreateContactRequest, CreateExpenseRequest, CreateInvoiceRequest,
    CreateItemRequest, CreateSalesOrderRequest, EmailInvoiceRequest, ListContactsRequest,
    ListExpensesRequest, ListInvoicesRequest, ListItemsRequest, ListSalesOrdersRequest,
    NewContact, UpdateContactRequest, UpdateExpenseRequest, UpdateInvoiceRequest,
    UpdateItemRequest, UpdateSalesOrderRequest,
};
use zoho_books_core::{CoreError, CoreResult, ErrorKind};

use crate::prompts;
use crate::resources::{self, ResourceReader, ResourceUri};
use crate::schemas::{
    ContactIdParams, ExpenseIdParams, InvoiceIdParams, ItemIdParams, SalesOrderIdParams,
};

fn kind_data(kind: ErrorKind) -> Option<serde_json::Value> {
    Some(json!({ "kind": kind.as_str() }))
}

/// Sanitize error messages to prevent sensitive information leakage.
///
/// Logs the full error to stderr but returns a generic message to the client.
fn sanitize_internal_error(error: impl std::fmt::Display, context: &str) -> McpError {
    tracing::error!("{context} error: {error}");
    McpError::internal_error(
        format!("{context} failed - check server logs for details"),
        kind_data(ErrorKind::InternalError),
    )
}

/// Translate a core failure into the JSON-RPC error the client sees.
///
/// `data.kind` always carries the stable error category.
fn map_core_error(context: &str, error: &CoreError) -> McpError {
    match error {
        CoreError::ValidationError(message) => {
            tracing::warn!("{context} rejected: {message}");
            McpError::invalid_params(message.clone(), kind_data(ErrorKind::ValidationError))
        }
        CoreError::StorageError(_) | CoreError::SerializationError(_) => {
            sanitize_internal_error(error, context)
        }
        CoreError::AuthError { .. }
        | CoreError::ApiError { .. }
        | CoreError::TransientError(_) => {
            if error.is_expected() {
                tracing::warn!("{context} error: {error}");
            } else {
                tracing::error!("{context} error: {error}");
            }
            McpError::internal_error(error.to_string(), kind_data(error.kind()))
        }
    }
}

fn json_result<T: Serialize>(value: &T, context: &str) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| sanitize_internal_error(e, &format!("Serialize {context} result")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Map the outcome of a service call to a tool result.
fn respond<T: Serialize>(result: CoreResult<T>, context: &str) -> Result<CallToolResult, McpError> {
    let value = result.map_err(|e| map_core_error(context, &e))?;
    json_result(&value, context)
}

/// MCP Server for Zoho Books.
///
/// Every clone shares the same services and therefore the same token manager.
#[derive(Clone)]
pub struct ZohoBooksMcp {
    contacts: Arc<ContactService>,
    invoices: Arc<InvoiceService>,
    expenses: Arc<ExpenseService>,
    items: Arc<ItemService>,
    sales_orders: Arc<SalesOrderService>,
    /// Renders the `resources/read` bodies.
    reader: Arc<ResourceReader>,
    /// Tool router generated by macro.
    tool_router: ToolRouter<Self>,
}

impl ZohoBooksMcp {
    #[must_use]
    pub fn new(ctx: &Arc<ServiceContext>) -> Self {
        let contacts = Arc::new(ContactService::new(Arc::clone(ctx)));
        let invoices = Arc::new(InvoiceService::new(Arc::clone(ctx)));
        let expenses = Arc::new(ExpenseService::new(Arc::clone(ctx)));
        let items = Arc::new(ItemService::new(Arc::clone(ctx)));
        let reader = Arc::new(ResourceReader::new(
            ctx,
            Arc::clone(&contacts),
            Arc::clone(&invoices),
            Arc::clone(&expenses),
            Arc::clone(&items),
        ));

        Self {
            contacts,
            invoices,
            expenses,
            items,
            sales_orders: Arc::new(SalesOrderService::new(Arc::clone(ctx))),
            reader,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ZohoBooksMcp {
    // Contacts

    #[tool(
        description = "List contacts (customers and vendors) with filtering by type, status and search text, sorting and pagination"
    )]
    async fn list_contacts(
        &self,
        Parameters(params): Parameters<ListContactsRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.contacts.list_contacts(&params).await, "List contacts")
    }

    #[tool(description = "Create a customer or vendor contact")]
    async fn create_contact(
        &self,
        Parameters(params): Parameters<CreateContactRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.contacts.create_contact(&params).await, "Create contact")
    }

    #[tool(description = "Create a customer contact")]
    async fn create_customer(
        &self,
        Parameters(params): Parameters<NewContact>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.contacts.create_customer(params).await, "Create customer")
    }

    #[tool(description = "Create a vendor contact")]
    async fn create_vendor(
        &self,
        Parameters(params): Parameters<NewContact>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.contacts.create_vendor(params).await, "Create vendor")
    }

    #[tool(description = "Get a contact with its addresses, contact persons and balances")]
    async fn get_contact(
        &self,
        Parameters(params): Parameters<ContactIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.contacts.get_contact(&params.contact_id).await,
            "Get contact",
        )
    }

    #[tool(description = "Update fields of an existing contact; at least one field is required")]
    async fn update_contact(
        &self,
        Parameters(params): Parameters<UpdateContactRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.contacts.update_contact(&params).await, "Update contact")
    }

    #[tool(description = "Delete a contact")]
    async fn delete_contact(
        &self,
        Parameters(params): Parameters<ContactIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.contacts.delete_contact(&params.contact_id).await,
            "Delete contact",
        )
    }

    // Invoices

    #[tool(
        description = "List invoices with filtering by status, customer, date range and search text, sorting and pagination"
    )]
    async fn list_invoices(
        &self,
        Parameters(params): Parameters<ListInvoicesRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.invoices.list_invoices(&params).await, "List invoices")
    }

    #[tool(description = "Create an invoice for a customer with at least one line item")]
    async fn create_invoice(
        &self,
        Parameters(params): Parameters<CreateInvoiceRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.invoices.create_invoice(&params).await, "Create invoice")
    }

    #[tool(description = "Get an invoice with its line items, totals and payment status")]
    async fn get_invoice(
        &self,
        Parameters(params): Parameters<InvoiceIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.invoices.get_invoice(&params.invoice_id).await,
            "Get invoice",
        )
    }

    #[tool(description = "Update fields of an existing invoice; at least one field is required")]
    async fn update_invoice(
        &self,
        Parameters(params): Parameters<UpdateInvoiceRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.invoices.update_invoice(&params).await, "Update invoice")
    }

    #[tool(description = "Delete an invoice")]
    async fn delete_invoice(
        &self,
        Parameters(params): Parameters<InvoiceIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.invoices.delete_invoice(&params.invoice_id).await,
            "Delete invoice",
        )
    }

    #[tool(
        description = "Email an invoice; without recipients it goes to the customer's contact persons"
    )]
    async fn email_invoice(
        &self,
        Parameters(params): Parameters<EmailInvoiceRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.invoices.email_invoice(&params).await, "Email invoice")
    }

    #[tool(description = "Mark a draft invoice as sent without emailing it")]
    async fn mark_invoice_as_sent(
        &self,
        Parameters(params): Parameters<InvoiceIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.invoices.mark_invoice_as_sent(&params.invoice_id).await,
            "Mark invoice as sent",
        )
    }

    #[tool(description = "Void an invoice")]
    async fn void_invoice(
        &self,
        Parameters(params): Parameters<InvoiceIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.invoices.void_invoice(&params.invoice_id).await,
            "Void invoice",
        )
    }

    // Expenses

    #[tool(
        description = "List expenses with filtering by status, vendor, date range and search text, sorting and pagination"
    )]
    async fn list_expenses(
        &self,
        Parameters(params): Parameters<ListExpensesRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.expenses.list_expenses(&params).await, "List expenses")
    }

    #[tool(
        description = "Record an expense against an expense account, paid through a bank, cash or card account"
    )]
    async fn create_expense(
        &self,
        Parameters(params): Parameters<CreateExpenseRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.expenses.create_expense(&params).await, "Create expense")
    }

    #[tool(description = "Get an expense")]
    async fn get_expense(
        &self,
        Parameters(params): Parameters<ExpenseIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.expenses.get_expense(&params.expense_id).await,
            "Get expense",
        )
    }

    #[tool(description = "Update fields of an existing expense; at least one field is required")]
    async fn update_expense(
        &self,
        Parameters(params): Parameters<UpdateExpenseRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.expenses.update_expense(&params).await, "Update expense")
    }

    #[tool(description = "Delete an expense")]
    async fn delete_expense(
        &self,
        Parameters(params): Parameters<ExpenseIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.expenses.delete_expense(&params.expense_id).await,
            "Delete expense",
        )
    }

    // Items

    #[tool(
        description = "List products and services with filtering by item type, status and search text, sorting and pagination"
    )]
    async fn list_items(
        &self,
        Parameters(params): Parameters<ListItemsRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.items.list_items(&params).await, "List items")
    }

    #[tool(description = "Create a product or service item")]
    async fn create_item(
        &self,
        Parameters(params): Parameters<CreateItemRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.items.create_item(&params).await, "Create item")
    }

    #[tool(description = "Get an item")]
    async fn get_item(
        &self,
        Parameters(params): Parameters<ItemIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.items.get_item(&params.item_id).await, "Get item")
    }

    #[tool(description = "Update fields of an existing item; at least one field is required")]
    async fn update_item(
        &self,
        Parameters(params): Parameters<UpdateItemRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.items.update_item(&params).await, "Update item")
    }

    #[tool(description = "Delete an item")]
    async fn delete_item(
        &self,
        Parameters(params): Parameters<ItemIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.items.delete_item(&params.item_id).await, "Delete item")
    }

    // Sales orders

    #[tool(
        description = "List sales orders with filtering by status, customer and date range, sorting and pagination"
    )]
    async fn list_sales_orders(
        &self,
        Parameters(params): Parameters<ListSalesOrdersRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.sales_orders.list_sales_orders(&params).await,
            "List sales orders",
        )
    }

    #[tool(description = "Create a sales order for a customer with at least one line item")]
    async fn create_sales_order(
        &self,
        Parameters(params): Parameters<CreateSalesOrderRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.sales_orders.create_sales_order(&params).await,
            "Create sales order",
        )
    }

    #[tool(description = "Get a sales order with its line items and totals")]
    async fn get_sales_order(
        &self,
        Parameters(params): Parameters<SalesOrderIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.sales_orders.get_sales_order(&params.salesorder_id).await,
            "Get sales order",
        )
    }

    #[tool(
        description = "Update fields of an existing sales order; at least one field is required"
    )]
    async fn update_sales_order(
        &self,
        Parameters(params): Parameters<UpdateSalesOrderRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.sales_orders.update_sales_order(&params).await,
            "Update sales order",
        )
    }

    #[tool(description = "Delete a sales order")]
    async fn delete_sales_order(
        &self,
        Parameters(params): Parameters<SalesOrderIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.sales_orders
                .delete_sales_order(&params.salesorder_id)
                .await,
            "Delete sales order",
        )
    }

    #[tool(description = "Create an invoice from a confirmed sales order")]
    async fn convert_to_invoice(
        &self,
        Parameters(params): Parameters<ConvertToInvoiceRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.sales_orders.convert_to_invoice(&params).await,
            "Convert sales order",
        )
    }
}

#[tool_handler]
impl ServerHandler for ZohoBooksMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Zoho Books MCP Server - Manage contacts, invoices, expenses, items and sales orders \
                 of one Zoho Books organization. \
                 List tools accept page/page_size or the next_cursor of a previous page. \
                 Read dashboard://summary for an overview and invoice://overdue or invoice://unpaid \
                 for receivables; contact://{contact_id} shows a single contact. \
                 Amounts and identifiers are returned exactly as Zoho Books reports them."
                    .into(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(resources::catalog()))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let templates = resources::templates()
            .map_err(|e| sanitize_internal_error(e, "List resource templates"))?;
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let Some(uri) = ResourceUri::parse(&request.uri) else {
            return Err(McpError::resource_not_found(
                format!("Unknown resource: {}", request.uri),
                Some(json!({ "uri": request.uri })),
            ));
        };
        let text = self
            .reader
            .read(&uri, Utc::now().date_naive())
            .await
            .map_err(|e| map_core_error(&format!("Read {}", request.uri), &e))?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult::with_all_items(prompts::catalog()))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        prompts::render(&request.name, request.arguments.as_ref()).ok_or_else(|| {
            McpError::invalid_params(
                format!("Unknown prompt: {}", request.name),
                Some(json!({ "name": request.name })),
            )
        })
    }
}

#[cfg(test)]
#[path = "test_mocks.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
pub(crate) mod test_mocks;

#[cfg(test)]
#[path = "server_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;

#[cfg(test)]
#[path = "client_integration_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod client_integration_tests;
