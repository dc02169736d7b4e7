//! 产品反馈演示工具

use crate::tools::descriptor::{ParamKind as K, ParamSpec as P, ToolDescriptor};

pub const INSTRUCTIONS: &str = include_str!("../../../prompts/feedback.md");

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "log_feature_request",
            "Log a new feature request from a customer.",
            vec![
                P::required("customer_email", K::String, "Customer email"),
                P::required("feature_description", K::String, "Requested feature"),
                P::optional("priority", K::String, "low, medium or high (default medium)"),
            ],
            "a confirmation message.",
            |a| {
                format!(
                    "Feature request logged for {}: {} (Priority: {})",
                    a.str("customer_email"),
                    a.str("feature_description"),
                    a.opt_str("priority").unwrap_or("medium")
                )
            },
        ),
        ToolDescriptor::new(
            "log_bug_report",
            "Log a bug report from a customer.",
            vec![
                P::required("customer_email", K::String, "Customer email"),
                P::required("bug_description", K::String, "What went wrong"),
                P::required("severity", K::String, "low, medium or high"),
                P::required("product_area", K::String, "Affected product area"),
            ],
            "a confirmation message.",
            |a| {
                format!(
                    "Bug report logged for {} in {} (Severity: {})",
                    a.str("customer_email"),
                    a.str("product_area"),
                    a.str("severity")
                )
            },
        ),
        ToolDescriptor::new(
            "create_feedback_survey",
            "Create a new customer feedback survey.",
            vec![
                P::required("topic", K::String, "Survey topic"),
                P::required("questions", K::StringList, "Survey questions"),
            ],
            "a confirmation message.",
            |a| format!("Survey created on {} with {} questions", a.str("topic"), a.list("questions").len()),
        ),
        ToolDescriptor::new(
            "get_survey_results",
            "Retrieve aggregated results from a feedback survey.",
            vec![P::required("survey_id", K::String, "Survey id")],
            "a status message.",
            |a| format!("Retrieved results for survey {}", a.str("survey_id")),
        ),
        ToolDescriptor::new(
            "check_feature_status",
            "Check the status of a requested feature.",
            vec![P::required("feature_id", K::String, "Feature id")],
            "a status message.",
            |a| format!("Status checked for feature {}", a.str("feature_id")),
        ),
        ToolDescriptor::new(
            "get_customer_feedback_history",
            "Retrieve all feedback submitted by a specific customer.",
            vec![P::required("customer_email", K::String, "Customer email")],
            "a status message.",
            |a| format!("Retrieved feedback history for {}", a.str("customer_email")),
        ),
        ToolDescriptor::new(
            "tag_feedback",
            "Add tags to categorize feedback.",
            vec![
                P::required("feedback_id", K::String, "Feedback id"),
                P::required("tags", K::StringList, "Tags to add"),
            ],
            "a confirmation message.",
            |a| format!("Added tags {} to feedback {}", a.list("tags").join(", "), a.str("feedback_id")),
        ),
        ToolDescriptor::new(
            "get_feedback_trends",
            "Analyze trending feedback topics for a given time period.",
            vec![P::required("time_period", K::String, "e.g. last_week, last_month")],
            "a status message.",
            |a| format!("Retrieved feedback trends for {}", a.str("time_period")),
        ),
        ToolDescriptor::new(
            "link_related_feedback",
            "Link two related feedback items together.",
            vec![
                P::required("feedback_id1", K::String, "First feedback id"),
                P::required("feedback_id2", K::String, "Second feedback id"),
            ],
            "a confirmation message.",
            |a| format!("Linked feedback items {} and {}", a.str("feedback_id1"), a.str("feedback_id2")),
        ),
        ToolDescriptor::new(
            "escalate_feedback",
            "Escalate feedback for product manager review.",
            vec![
                P::required("feedback_id", K::String, "Feedback id"),
                P::required("reason", K::String, "Why it needs review"),
            ],
            "a confirmation message.",
            |a| format!("Escalated feedback {}: {}", a.str("feedback_id"), a.str("reason")),
        ),
    ]
}
