//! HR 演示工具：结果均为模拟文本，不访问任何系统

use serde_json::json;

use crate::tools::descriptor::{ParamKind as K, ParamSpec as P, ToolDescriptor};

pub const INSTRUCTIONS: &str = include_str!("../../../prompts/hr.md");

fn policy_doc(policy_type: &str) -> &'static str {
    match policy_type {
        "PTO" => "PTO Policy: Employees are entitled to 15 days of PTO annually.",
        "Benefits" => "Benefits Policy: Eligible employees may enroll in health, dental, and vision plans.",
        "Conduct" => "Conduct Policy: All employees must adhere to the Code of Conduct.",
        _ => "Policy not found.",
    }
}

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "get_employee_info",
            "Retrieve basic information about an employee, including their department, role, PTO balance, and benefits eligibility.",
            vec![P::required("email", K::String, "Employee email")],
            "a JSON object with department, role, pto_balance and benefits_eligible.",
            |a| {
                json!({
                    "email": a.str("email"),
                    "department": "Engineering",
                    "role": "Software Engineer",
                    "pto_balance": 10,
                    "benefits_eligible": true,
                })
                .to_string()
            },
        ),
        ToolDescriptor::new(
            "update_pto_balance",
            "Adjust the PTO balance for an employee by the specified amount. Positive values add, negative values subtract.",
            vec![
                P::required("email", K::String, "Employee email"),
                P::required("adjustment", K::Integer, "Hours to add (negative to subtract)"),
            ],
            "a confirmation message.",
            |a| format!("Updated PTO balance for {} by {} hours.", a.str("email"), a.int("adjustment")),
        ),
        ToolDescriptor::new(
            "submit_benefits_request",
            "Submit a request for a specific benefit for an employee.",
            vec![
                P::required("email", K::String, "Employee email"),
                P::required("benefit", K::String, "Requested benefit, e.g. health plan"),
            ],
            "a confirmation message.",
            |a| format!("Submitted request for {} benefit for {}.", a.str("benefit"), a.str("email")),
        ),
        ToolDescriptor::new(
            "file_incident_report",
            "Log a formal incident report for an employee.",
            vec![
                P::required("email", K::String, "Employee email"),
                P::required("description", K::String, "What happened"),
            ],
            "a confirmation message.",
            |a| format!("Incident report filed for {}: {}", a.str("email"), a.str("description")),
        ),
        ToolDescriptor::new(
            "get_policy_docs",
            "Retrieve specific company policy documents.",
            vec![P::required("policy_type", K::String, "PTO, Benefits or Conduct")],
            "the policy text, or 'Policy not found.'.",
            |a| policy_doc(a.str("policy_type")).to_string(),
        ),
        ToolDescriptor::new(
            "get_team_structure",
            "Retrieve the team hierarchy for a specific department, including managers and direct reports.",
            vec![P::required("department", K::String, "Department name")],
            "a JSON object with manager and team_members.",
            |a| {
                json!({
                    "department": a.str("department"),
                    "manager": "Alice Johnson",
                    "team_members": ["Bob Smith", "Carol Davis", "Eve White"],
                })
                .to_string()
            },
        ),
        ToolDescriptor::new(
            "log_training_completion",
            "Log the completion of a training program for compliance purposes.",
            vec![
                P::required("email", K::String, "Employee email"),
                P::required("training_name", K::String, "Training program name"),
            ],
            "a confirmation message.",
            |a| format!("Logged completion of training '{}' for {}.", a.str("training_name"), a.str("email")),
        ),
    ]
}
