//! 社区运营演示工具

use crate::tools::descriptor::{ParamKind as K, ParamSpec as P, ToolDescriptor};

pub const INSTRUCTIONS: &str = include_str!("../../../prompts/community.md");

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "flag_forum_post",
            "Flag a forum post for moderation with a specific reason.",
            vec![
                P::required("post_id", K::Integer, "Forum post id"),
                P::required("reason", K::String, "Reason for flagging"),
            ],
            "a confirmation message.",
            |a| format!("Post {} flagged for {}.", a.int("post_id"), a.str("reason")),
        ),
        ToolDescriptor::new(
            "escalate_issue_to_moderator",
            "Escalate a flagged issue to a community moderator.",
            vec![P::required("issue_id", K::Integer, "Issue id")],
            "a confirmation message.",
            |a| format!("Issue {} escalated to moderator.", a.int("issue_id")),
        ),
        ToolDescriptor::new(
            "create_community_poll",
            "Create a community poll with the given topic and options.",
            vec![
                P::required("topic", K::String, "Poll topic"),
                P::required("options", K::StringList, "Poll options"),
            ],
            "a confirmation message.",
            |a| {
                format!(
                    "Poll on '{}' created with options: {}.",
                    a.str("topic"),
                    a.list("options").join(", ")
                )
            },
        ),
        ToolDescriptor::new(
            "fetch_community_metrics",
            "Fetch community engagement metrics like active users or post volume.",
            vec![P::required("metric", K::String, "Metric name")],
            "a status message.",
            |a| format!("Retrieved metrics for {}.", a.str("metric")),
        ),
        ToolDescriptor::new(
            "post_community_announcement",
            "Post an important announcement to the community.",
            vec![P::required("message", K::String, "Announcement text")],
            "a confirmation message.",
            |a| format!("Posted announcement: {}", a.str("message")),
        ),
        ToolDescriptor::new(
            "lookup_user_profile",
            "Look up the profile of a specific community member.",
            vec![P::required("username", K::String, "Community username")],
            "a status message.",
            |a| format!("Profile data for user {} retrieved.", a.str("username")),
        ),
        ToolDescriptor::new(
            "approve_event_sponsorship",
            "Approve a sponsorship request for a community event.",
            vec![P::required("event_id", K::Integer, "Event id")],
            "a confirmation message.",
            |a| format!("Sponsorship for event {} approved.", a.int("event_id")),
        ),
        ToolDescriptor::new(
            "moderate_forum_post",
            "Take moderation action (e.g., delete, warn) on a forum post.",
            vec![
                P::required("post_id", K::Integer, "Forum post id"),
                P::required("action", K::String, "Moderation action"),
            ],
            "a confirmation message.",
            |a| format!("Post {} moderated with action: {}.", a.int("post_id"), a.str("action")),
        ),
    ]
}
