//! 工作流图：节点表 + 每个节点唯一的出边

use std::collections::HashMap;
use std::sync::Arc;

use crate::workflow::types::*;

pub struct WorkflowGraph<S, E> {
    pub(crate) name: String,
    pub(crate) nodes: HashMap<NodeId, Arc<dyn Node<S, E>>>,
    pub(crate) edges: HashMap<NodeId, Edge<S>>,
}

impl<S, E> std::fmt::Debug for WorkflowGraph<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut edges: Vec<&str> = self.edges.keys().map(String::as_str).collect();
        edges.sort_unstable();
        f.debug_struct("WorkflowGraph")
            .field("name", &self.name)
            .field("nodes", &self.node_names())
            .field("edges_from", &edges)
            .finish()
    }
}

impl<S, E> WorkflowGraph<S, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self, id: &str) -> Result<&Arc<dyn Node<S, E>>, WorkflowError> {
        self.nodes
            .get(id)
            .ok_or_else(|| WorkflowError::UnknownNode(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// 节点名（排序，便于日志与测试）
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// 沿 from 的出边求下一个节点；条件边只能落在声明过的目标上
    pub fn next(&self, from: &str, state: &S) -> Result<NodeId, WorkflowError> {
        match self.edges.get(from) {
            Some(Edge::Fixed(to)) => Ok(to.clone()),
            Some(Edge::Conditional { targets, router }) => {
                let to = router(state);
                if targets.contains(&to) {
                    Ok(to)
                } else {
                    Err(WorkflowError::UndeclaredTarget {
                        from: from.to_string(),
                        to,
                    })
                }
            }
            None => Err(WorkflowError::MissingEdge(from.to_string())),
        }
    }

    /// 起点之后的第一个节点
    pub fn entry(&self, state: &S) -> Result<NodeId, WorkflowError> {
        self.next(START, state)
    }
}
