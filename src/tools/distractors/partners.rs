//! 合作伙伴计划演示工具

use crate::tools::descriptor::{ParamKind as K, ParamSpec as P, ToolDescriptor};

pub const INSTRUCTIONS: &str = include_str!("../../../prompts/partners.md");

const PARTNER_ID: P = P::required("partner_id", K::String, "Partner id");

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "verify_partner_status",
            "Check if an organization is an existing partner and their current tier.",
            vec![P::required("email", K::String, "Organization contact email")],
            "a status message.",
            |a| format!("Verified partner status for {}", a.str("email")),
        ),
        ToolDescriptor::new(
            "submit_partner_application",
            "Submit a new partner program application.",
            vec![
                P::required("company_name", K::String, "Company name"),
                P::required("email", K::String, "Contact email"),
                P::required("use_case", K::String, "Intended use case"),
            ],
            "a confirmation message.",
            |a| format!("Submitted partner application for {}", a.str("company_name")),
        ),
        ToolDescriptor::new(
            "update_partner_tier",
            "Update a partner's tier level (e.g., Silver, Gold, Platinum).",
            vec![PARTNER_ID, P::required("new_tier", K::String, "Silver, Gold or Platinum")],
            "a confirmation message.",
            |a| format!("Updated partner {} to {} tier", a.str("partner_id"), a.str("new_tier")),
        ),
        ToolDescriptor::new(
            "log_integration_request",
            "Log a request for a new integration from a partner.",
            vec![PARTNER_ID, P::required("integration_type", K::String, "Integration type")],
            "a confirmation message.",
            |a| {
                format!(
                    "Logged integration request for partner {}: {}",
                    a.str("partner_id"),
                    a.str("integration_type")
                )
            },
        ),
        ToolDescriptor::new(
            "get_partner_metrics",
            "Retrieve partner performance metrics (revenue, customers, etc.).",
            vec![PARTNER_ID],
            "a status message.",
            |a| format!("Retrieved metrics for partner {}", a.str("partner_id")),
        ),
        ToolDescriptor::new(
            "schedule_partner_review",
            "Schedule a quarterly review or technical assessment for a partner.",
            vec![PARTNER_ID, P::required("review_type", K::String, "Review type")],
            "a confirmation message.",
            |a| format!("Scheduled {} review for partner {}", a.str("review_type"), a.str("partner_id")),
        ),
        ToolDescriptor::new(
            "generate_partner_agreement",
            "Generate a partner agreement document.",
            vec![PARTNER_ID, P::required("agreement_type", K::String, "Agreement type")],
            "a confirmation message.",
            |a| format!("Generated {} agreement for partner {}", a.str("agreement_type"), a.str("partner_id")),
        ),
        ToolDescriptor::new(
            "approve_co_marketing",
            "Approve a co-marketing initiative with a partner.",
            vec![PARTNER_ID, P::required("campaign_type", K::String, "Campaign type")],
            "a confirmation message.",
            |a| format!("Approved {} campaign for partner {}", a.str("campaign_type"), a.str("partner_id")),
        ),
        ToolDescriptor::new(
            "get_integration_status",
            "Check the status of a partner's integration development.",
            vec![P::required("integration_id", K::String, "Integration id")],
            "a status message.",
            |a| format!("Retrieved status for integration {}", a.str("integration_id")),
        ),
        ToolDescriptor::new(
            "issue_partner_credentials",
            "Issue API keys or portal credentials to partners.",
            vec![PARTNER_ID, P::required("credential_type", K::String, "Credential type")],
            "a confirmation message.",
            |a| format!("Issued {} credentials to partner {}", a.str("credential_type"), a.str("partner_id")),
        ),
    ]
}
