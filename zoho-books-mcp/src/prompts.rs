//! Guided workflow prompts.
//!
//! Each template names its arguments; `{argument}` placeholders in the
//! messages are replaced with the caller's value or the argument's default.

use rmcp::model::{
    GetPromptResult, JsonObject, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
};
use serde_json::Value;

struct Argument {
    name: &'static str,
    description: &'static str,
    default: &'static str,
}

struct Template {
    name: &'static str,
    description: &'static str,
    arguments: &'static [Argument],
    messages: &'static [(PromptMessageRole, &'static str)],
}

const TEMPLATES: &[Template] = &[
    Template {
        name: "invoice_collection_workflow",
        description: "Create an invoice, send it and follow it until the payment arrives",
        arguments: &[
            Argument {
                name: "customer",
                description: "Customer name or ID; say 'new' for a customer that does not exist yet",
                default: "a customer I will name",
            },
            Argument {
                name: "items",
                description: "Items or services with quantities and rates",
                default: "items I will list",
            },
            Argument {
                name: "payment_terms",
                description: "Payment terms, e.g. Net 30 or Due on receipt",
                default: "Net 30",
            },
        ],
        messages: &[
            (
                PromptMessageRole::User,
                "I need to invoice {customer} for {items} and follow the invoice through to payment. \
                 Payment terms: {payment_terms}.",
            ),
            (
                PromptMessageRole::Assistant,
                "Let's take it step by step.\n\n\
                 **1. Customer**\n\
                 I'll look up {customer} with `list_contacts` (search_text). If there is no match I \
                 can create the profile with `create_customer`.\n\n\
                 **2. Invoice**\n\
                 With the customer ID I'll call `create_invoice` with one line item per entry in \
                 {items}, using terms {payment_terms}. Items already in the catalog can be referenced \
                 by `item_id` (see `list_items`).\n\n\
                 **3. Delivery**\n\
                 Once you have reviewed the draft I can email it with `email_invoice`, or record that \
                 you sent it yourself with `mark_invoice_as_sent`.\n\n\
                 **4. Collection**\n\
                 I'll watch `invoice://overdue` and `get_invoice` for the balance, and recent payments \
                 appear under `payment://recent`. If the invoice was raised in error, `void_invoice` \
                 cancels it.\n\n\
                 Shall I start with the customer lookup?",
            ),
        ],
    },
    Template {
        name: "monthly_invoicing",
        description: "Raise the month's invoices for recurring clients in one pass",
        arguments: &[
            Argument {
                name: "month",
                description: "Billing period, e.g. 2024-03",
                default: "the current month",
            },
            Argument {
                name: "clients",
                description: "Which clients to bill",
                default: "all active customers",
            },
            Argument {
                name: "services",
                description: "Services or items billed to every client",
                default: "each client's usual monthly services",
            },
        ],
        messages: &[
            (
                PromptMessageRole::User,
                "Please help me create the invoices for {month} for {clients}, billing {services}.",
            ),
            (
                PromptMessageRole::Assistant,
                "Here is how I'll run the monthly billing for {month}:\n\n\
                 1. **Clients**: collect {clients} with `list_contacts` (contact_type customer, \
                 status active) and confirm the list with you.\n\
                 2. **Services**: match {services} against `list_items` so rates come from the catalog.\n\
                 3. **Open orders**: check `list_sales_orders` for confirmed orders; those can be turned \
                 into invoices directly with `convert_to_invoice`.\n\
                 4. **Creation**: call `create_invoice` once per client, all with the same date, due \
                 date and terms, and keep a running total.\n\
                 5. **Review**: list what was created with `list_invoices` (status draft) before anything \
                 is sent.\n\
                 6. **Delivery**: send with `email_invoice`, or keep them as drafts for individual review.\n\n\
                 Would you like to adjust the client list or the common terms first?",
            ),
        ],
    },
    Template {
        name: "expense_tracking_workflow",
        description: "Record, categorize and review business expenses",
        arguments: &[
            Argument {
                name: "period",
                description: "When the expenses were incurred",
                default: "this month",
            },
            Argument {
                name: "expenses",
                description: "The expenses to record: date, amount, vendor, description",
                default: "expenses I will describe",
            },
            Argument {
                name: "category",
                description: "Expense account (category) to book them against",
                default: "the matching expense account",
            },
        ],
        messages: &[
            (
                PromptMessageRole::User,
                "I need to record {expenses} from {period} and book them against {category}.",
            ),
            (
                PromptMessageRole::Assistant,
                "For each expense I need a date (YYYY-MM-DD), the amount, the expense account and the \
                 account it was paid through. Vendor, description, reference number and whether it \
                 is billable to a customer are optional.\n\n\
                 Typical categories: travel, meals and entertainment, office supplies, software and \
                 subscriptions, rent and utilities, professional services, marketing, bank charges.\n\n\
                 I'll record each one with `create_expense` against {category}, then list {period} with \
                 `list_expenses` so you can check the totals. Corrections go through `update_expense`, \
                 and `report://cash_flow` shows how the month's spending compares to income.\n\n\
                 Please give me the first expense.",
            ),
        ],
    },
];

pub fn catalog() -> Vec<Prompt> {
    TEMPLATES
        .iter()
        .map(|t| {
            let arguments = t
                .arguments
                .iter()
                .map(|a| PromptArgument {
                    name: a.name.to_string(),
                    title: None,
                    description: Some(a.description.to_string()),
                    required: Some(false),
                })
                .collect();
            Prompt::new(t.name, Some(t.description), Some(arguments))
        })
        .collect()
}

/// The prompt `name` with `arguments` substituted, or `None` for an unknown name.
pub fn render(name: &str, arguments: Option<&JsonObject>) -> Option<GetPromptResult> {
    let template = TEMPLATES.iter().find(|t| t.name == name)?;
    let messages = template
        .messages
        .iter()
        .map(|(role, text)| PromptMessage::new_text(role.clone(), fill(template, text, arguments)))
        .collect();
    Some(GetPromptResult {
        description: Some(template.description.to_string()),
        messages,
    })
}

fn fill(template: &Template, text: &str, arguments: Option<&JsonObject>) -> String {
    template.arguments.iter().fold(text.to_string(), |acc, arg| {
        let value = arguments
            .and_then(|args| args.get(arg.name))
            .and_then(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| arg.default.to_string());
        acc.replace(&format!("{{{}}}", arg.name), &value)
    })
}
