//! 干扰工具集：七个与客服无关的虚构业务域（HR、销售线索、社区、文档、产品反馈、合作伙伴、供应商）
//!
//! 只用于噪声智能体，演示超大工具表与冗长指令对 ReAct 智能体可靠性的影响。
//! 所有工具的效果都是模拟的：返回一段描述文本。

pub mod community;
pub mod docs;
pub mod feedback;
pub mod hr;
pub mod leads;
pub mod partners;
pub mod vendors;

use std::sync::Arc;

use crate::tools::descriptor::ToolDescriptor;
use crate::tools::Tool;

/// 一个业务域：标题、指令、工具
pub struct DistractorDomain {
    pub title: &'static str,
    pub instructions: &'static str,
    pub tools: Vec<ToolDescriptor>,
}

/// 按噪声智能体 prompt 中的出现顺序返回所有业务域
pub fn domains() -> Vec<DistractorDomain> {
    vec![
        DistractorDomain {
            title: "HR",
            instructions: hr::INSTRUCTIONS,
            tools: hr::tools(),
        },
        DistractorDomain {
            title: "Lead Management",
            instructions: leads::INSTRUCTIONS,
            tools: leads::tools(),
        },
        DistractorDomain {
            title: "Community Engagement",
            instructions: community::INSTRUCTIONS,
            tools: community::tools(),
        },
        DistractorDomain {
            title: "Content Documentation",
            instructions: docs::INSTRUCTIONS,
            tools: docs::tools(),
        },
        DistractorDomain {
            title: "Product Feedback",
            instructions: feedback::INSTRUCTIONS,
            tools: feedback::tools(),
        },
        DistractorDomain {
            title: "Partner Program",
            instructions: partners::INSTRUCTIONS,
            tools: partners::tools(),
        },
        DistractorDomain {
            title: "Vendor Management",
            instructions: vendors::INSTRUCTIONS,
            tools: vendors::tools(),
        },
    ]
}

/// 全部干扰工具（注册顺序与业务域顺序一致）
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    domains()
        .into_iter()
        .flat_map(|d| d.tools)
        .map(|t| Arc::new(t) as Arc<dyn Tool>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use serde_json::json;

    #[test]
    fn test_catalog_sizes() {
        let sizes: Vec<(&str, usize)> = domains().iter().map(|d| (d.title, d.tools.len())).collect();
        assert_eq!(
            sizes,
            vec![
                ("HR", 7),
                ("Lead Management", 10),
                ("Community Engagement", 8),
                ("Content Documentation", 8),
                ("Product Feedback", 10),
                ("Partner Program", 10),
                ("Vendor Management", 8),
            ]
        );
    }

    #[test]
    fn test_names_are_unique_across_domains() {
        let registry = ToolRegistry::from_tools(all_tools()).unwrap();
        assert_eq!(registry.len(), 61);
    }

    #[test]
    fn test_instruction_bundles_are_loaded() {
        for d in domains() {
            assert!(!d.instructions.trim().is_empty(), "{} instructions empty", d.title);
        }
        assert!(hr::INSTRUCTIONS.contains("get_employee_info"));
    }

    #[tokio::test]
    async fn test_simulated_effects() {
        let tools = all_tools();
        let find = |name: &str| tools.iter().find(|t| t.name() == name).unwrap().clone();

        let out = find("get_policy_docs")
            .execute(json!({"policy_type": "PTO"}))
            .await
            .unwrap();
        assert_eq!(out, "PTO Policy: Employees are entitled to 15 days of PTO annually.");

        let out = find("create_community_poll")
            .execute(json!({"topic": "Next meetup", "options": ["Berlin", "Lisbon"]}))
            .await
            .unwrap();
        assert_eq!(out, "Poll on 'Next meetup' created with options: Berlin, Lisbon.");

        let out = find("log_feature_request")
            .execute(json!({"customer_email": "a@b.c", "feature_description": "dark mode"}))
            .await
            .unwrap();
        assert!(out.ends_with("(Priority: medium)"));

        let out = find("approve_vendor_invoice")
            .execute(json!({"invoice_id": "INV-1", "amount": 120.5}))
            .await
            .unwrap();
        assert_eq!(out, "Approved invoice INV-1 for $120.50");
    }
}
