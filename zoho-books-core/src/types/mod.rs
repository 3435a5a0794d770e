//! Type definitions

mod common;
mod contact;
mod credential;
mod expense;
mod invoice;
mod item;
mod pagination;
mod report;
mod response;
mod sales_order;

pub use common::{LineItem, ListOptions, SortOrder};
pub use contact::{
    ContactStatusFilter, ContactType, CreateContactRequest, ListContactsRequest, NewContact,
    UpdateContactRequest,
};
pub use credential::{AccessToken, CredentialKey, StoredCredential};
pub use expense::{
    CreateExpenseRequest, ExpenseStatus, ListExpensesRequest, UpdateExpenseRequest,
};
pub use invoice::{
    CreateInvoiceRequest, EmailInvoiceRequest, InvoiceStatus, ListInvoicesRequest,
    UpdateInvoiceRequest,
};
pub use item::{
    CreateItemRequest, ItemStatus, ItemType, ListItemsRequest, ProductType, UpdateItemRequest,
};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageCursor, PageRequest};
pub use report::{CashFlowSummary, DashboardSummary, PeriodTotals};
pub use response::{ActionResponse, ListPage, RecordResponse, ResourceKind};
pub use sales_order::{
    ConvertToInvoiceRequest, CreateSalesOrderRequest, ListSalesOrdersRequest, SalesOrderStatus,
    UpdateSalesOrderRequest,
};

// Re-export provider types
pub use zoho_books_provider::{HttpMethod, Region};
