//! 供应商管理演示工具

use crate::tools::descriptor::{ParamKind as K, ParamSpec as P, ToolDescriptor};

pub const INSTRUCTIONS: &str = include_str!("../../../prompts/vendors.md");

const VENDOR_ID: P = P::required("vendor_id", K::String, "Vendor id");

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "check_vendor_status",
            "Check the current status and compliance state of a vendor.",
            vec![VENDOR_ID],
            "a status message.",
            |a| format!("Retrieved status for vendor {}", a.str("vendor_id")),
        ),
        ToolDescriptor::new(
            "submit_vendor_onboarding",
            "Submit a new vendor for onboarding review.",
            vec![
                P::required("company_name", K::String, "Company name"),
                P::required("contact_email", K::String, "Contact email"),
                P::required("service_type", K::String, "Service type"),
            ],
            "a confirmation message.",
            |a| format!("Submitted onboarding request for {}", a.str("company_name")),
        ),
        ToolDescriptor::new(
            "request_vendor_quote",
            "Request a quote from an existing vendor for a specific service.",
            vec![VENDOR_ID, P::required("service_description", K::String, "Service needed")],
            "a confirmation message.",
            |a| {
                format!(
                    "Requested quote from vendor {} for {}",
                    a.str("vendor_id"),
                    a.str("service_description")
                )
            },
        ),
        ToolDescriptor::new(
            "approve_vendor_invoice",
            "Approve a vendor invoice for payment processing.",
            vec![
                P::required("invoice_id", K::String, "Vendor invoice id"),
                P::required("amount", K::Number, "Invoice amount"),
            ],
            "a confirmation message.",
            |a| format!("Approved invoice {} for ${:.2}", a.str("invoice_id"), a.number("amount")),
        ),
        ToolDescriptor::new(
            "log_vendor_issue",
            "Log an issue with a vendor's service or deliverables.",
            vec![
                VENDOR_ID,
                P::required("issue_description", K::String, "What went wrong"),
                P::required("severity", K::String, "low, medium or high"),
            ],
            "a confirmation message.",
            |a| {
                format!(
                    "Logged {} issue for vendor {}: {}",
                    a.str("severity"),
                    a.str("vendor_id"),
                    a.str("issue_description")
                )
            },
        ),
        ToolDescriptor::new(
            "schedule_vendor_review",
            "Schedule a quarterly performance review with a vendor.",
            vec![VENDOR_ID],
            "a confirmation message.",
            |a| format!("Scheduled review for vendor {}", a.str("vendor_id")),
        ),
        ToolDescriptor::new(
            "update_vendor_contract",
            "Request an update to a vendor's contract terms.",
            vec![VENDOR_ID, P::required("update_type", K::String, "Kind of update")],
            "a confirmation message.",
            |a| format!("Requested {} update for vendor {}", a.str("update_type"), a.str("vendor_id")),
        ),
        ToolDescriptor::new(
            "get_vendor_spend",
            "Retrieve spending history with a specific vendor.",
            vec![VENDOR_ID],
            "a status message.",
            |a| format!("Retrieved spend history for vendor {}", a.str("vendor_id")),
        ),
    ]
}
