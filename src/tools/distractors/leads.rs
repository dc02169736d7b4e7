//! 销售线索演示工具

use crate::tools::descriptor::{ParamKind as K, ParamSpec as P, ToolDescriptor};

pub const INSTRUCTIONS: &str = include_str!("../../../prompts/leads.md");

const EMAIL: P = P::required("email", K::String, "Lead email");

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "check_existing_relationship",
            "Check if the given email is associated with an existing customer or account.",
            vec![EMAIL],
            "a status message.",
            |a| format!("Checked existing relationship for {}", a.str("email")),
        ),
        ToolDescriptor::new(
            "assign_to_salesperson",
            "Assign a lead to a salesperson in Salesforce.",
            vec![EMAIL, P::required("salesperson_name", K::String, "Salesperson name")],
            "a confirmation message.",
            |a| format!("Assigned lead {} to {}", a.str("email"), a.str("salesperson_name")),
        ),
        ToolDescriptor::new(
            "create_new_lead",
            "Create a new lead record in Salesforce.",
            vec![
                P::required("name", K::String, "Lead name"),
                EMAIL,
                P::required("company", K::String, "Company"),
            ],
            "a confirmation message.",
            |a| format!("Created new lead: {}, {}, {}", a.str("name"), a.str("email"), a.str("company")),
        ),
        ToolDescriptor::new(
            "log_lead_interaction",
            "Log an interaction or note for a lead in the CRM.",
            vec![EMAIL, P::required("note", K::String, "Interaction note")],
            "a confirmation message.",
            |a| format!("Logged interaction for {}: {}", a.str("email"), a.str("note")),
        ),
        ToolDescriptor::new(
            "qualify_lead",
            "Determine if a lead meets basic qualification criteria.",
            vec![EMAIL, P::required("description", K::String, "Brief lead description")],
            "a qualification message.",
            |a| format!("Qualified lead {} with description: {}", a.str("email"), a.str("description")),
        ),
        ToolDescriptor::new(
            "flag_lead",
            "Flag a lead as suspicious or requiring review.",
            vec![EMAIL, P::required("reason", K::String, "Why the lead is flagged")],
            "a confirmation message.",
            |a| format!("Flagged lead {} for review: {}", a.str("email"), a.str("reason")),
        ),
        ToolDescriptor::new(
            "get_industry_insights",
            "Retrieve industry-related insights for the given company.",
            vec![P::required("company", K::String, "Company name")],
            "a status message.",
            |a| format!("Retrieved industry insights for {}", a.str("company")),
        ),
        ToolDescriptor::new(
            "merge_lead_records",
            "Merge two duplicate lead records in the CRM.",
            vec![
                P::required("email1", K::String, "First lead email"),
                P::required("email2", K::String, "Second lead email"),
            ],
            "a confirmation message.",
            |a| format!("Merged lead records for {} and {}", a.str("email1"), a.str("email2")),
        ),
        ToolDescriptor::new(
            "fetch_lead_source",
            "Retrieve how a lead discovered the company.",
            vec![EMAIL],
            "a status message.",
            |a| format!("Fetched lead source for {}", a.str("email")),
        ),
        ToolDescriptor::new(
            "update_lead_status",
            "Update the status of a lead in the CRM.",
            vec![EMAIL, P::required("status", K::String, "Contacted, Qualified or Unqualified")],
            "a confirmation message.",
            |a| format!("Updated lead {} status to {}", a.str("email"), a.str("status")),
        ),
    ]
}
