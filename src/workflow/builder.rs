//! 工作流构建器
//!
//! 提供流畅的API来声明节点与边，build 时校验拓扑

use std::collections::HashMap;
use std::sync::Arc;

use crate::workflow::graph::WorkflowGraph;
use crate::workflow::types::*;

/// 工作流构建器
pub struct WorkflowBuilder<S, E> {
    name: String,
    nodes: Vec<(NodeId, Arc<dyn Node<S, E>>)>,
    edges: Vec<(NodeId, Edge<S>)>,
}

impl<S, E> WorkflowBuilder<S, E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// 添加节点
    pub fn node(mut self, id: impl Into<NodeId>, node: Arc<dyn Node<S, E>>) -> Self {
        self.nodes.push((id.into(), node));
        self
    }

    /// 固定边
    pub fn edge(mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        self.edges.push((from.into(), Edge::Fixed(to.into())));
        self
    }

    /// 条件边：router 的返回值必须是 targets 之一
    pub fn conditional_edge<F>(mut self, from: impl Into<NodeId>, targets: &[&str], router: F) -> Self
    where
        F: Fn(&S) -> NodeId + Send + Sync + 'static,
    {
        self.edges.push((
            from.into(),
            Edge::Conditional {
                targets: targets.iter().map(|t| t.to_string()).collect(),
                router: Box::new(router),
            },
        ));
        self
    }

    /// 构建工作流：节点不重名、每个节点恰有一条出边、边的端点都存在
    pub fn build(self) -> Result<WorkflowGraph<S, E>, WorkflowError> {
        let mut nodes = HashMap::new();
        for (id, node) in self.nodes {
            if id == START || id == END {
                return Err(WorkflowError::InvalidConfiguration(format!(
                    "{id} is reserved"
                )));
            }
            if nodes.insert(id.clone(), node).is_some() {
                return Err(WorkflowError::DuplicateNode(id));
            }
        }

        let mut edges = HashMap::new();
        for (from, edge) in self.edges {
            if from == END {
                return Err(WorkflowError::InvalidConfiguration(
                    "END cannot have outgoing edges".to_string(),
                ));
            }
            if from != START && !nodes.contains_key(&from) {
                return Err(WorkflowError::UnknownNode(from));
            }
            let targets: Vec<&NodeId> = match &edge {
                Edge::Fixed(to) => vec![to],
                Edge::Conditional { targets, .. } => targets.iter().collect(),
            };
            for to in targets {
                if to == START {
                    return Err(WorkflowError::InvalidConfiguration(
                        "START cannot be an edge target".to_string(),
                    ));
                }
                if to != END && !nodes.contains_key(to) {
                    return Err(WorkflowError::UnknownNode(to.clone()));
                }
            }
            if edges.insert(from.clone(), edge).is_some() {
                return Err(WorkflowError::InvalidConfiguration(format!(
                    "{from} has more than one outgoing edge"
                )));
            }
        }

        if !edges.contains_key(START) {
            return Err(WorkflowError::MissingEdge(START.to_string()));
        }
        if let Some(id) = nodes.keys().find(|id| !edges.contains_key(*id)) {
            return Err(WorkflowError::MissingEdge(id.clone()));
        }

        Ok(WorkflowGraph {
            name: self.name,
            nodes,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Node<u32, WorkflowError> for Noop {
        async fn run(&self, state: u32, _ctx: &NodeContext) -> Result<NodeOutcome<u32>, WorkflowError> {
            Ok(NodeOutcome::Continue(state))
        }
    }

    fn builder() -> WorkflowBuilder<u32, WorkflowError> {
        WorkflowBuilder::<u32, WorkflowError>::new("test").node("a", Arc::new(Noop)).node("b", Arc::new(Noop))
    }

    #[test]
    fn test_build_linear_graph() {
        let graph = builder()
            .edge(START, "a")
            .edge("a", "b")
            .edge("b", END)
            .build()
            .unwrap();
        assert_eq!(graph.node_names(), vec!["a", "b"]);
        assert_eq!(graph.entry(&0).unwrap(), "a");
        assert_eq!(graph.next("b", &0).unwrap(), END);
        let debug = format!("{graph:?}");
        assert!(debug.contains("nodes: [\"a\", \"b\"]"), "{debug}");
    }

    #[test]
    fn test_build_rejects_bad_topologies() {
        let err = builder().edge(START, "a").edge("a", "b").build().unwrap_err();
        assert!(matches!(err, WorkflowError::MissingEdge(id) if id == "b"));

        let err = builder()
            .edge(START, "a")
            .edge("a", "missing")
            .edge("b", END)
            .build()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownNode(id) if id == "missing"));

        let err = builder()
            .node("a", Arc::new(Noop))
            .edge(START, "a")
            .build()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateNode(id) if id == "a"));

        let err = builder().edge("a", "b").edge("b", END).build().unwrap_err();
        assert!(matches!(err, WorkflowError::MissingEdge(id) if id == START));
    }

    #[test]
    fn test_conditional_edge_only_reaches_declared_targets() {
        let graph = builder()
            .edge(START, "a")
            .conditional_edge("a", &["b", END], |n: &u32| {
                if *n > 0 { "b".to_string() } else { "nowhere".to_string() }
            })
            .edge("b", END)
            .build()
            .unwrap();
        assert_eq!(graph.next("a", &1).unwrap(), "b");
        assert!(matches!(
            graph.next("a", &0),
            Err(WorkflowError::UndeclaredTarget { .. })
        ));
    }
}
