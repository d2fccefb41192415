//! Workflow task graphs
//!
//! A graph is assembled with [`WorkflowGraphBuilder`], validated once in
//! [`WorkflowGraphBuilder::build`], and is read-only afterwards.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::agents::AssetReference;
use crate::types::{AppError, AppResult};

/// Where an agent task's message comes from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageInput {
    Literal(String),
    /// Output of an upstream task
    FromTask { from_task: String },
    /// `{task_name}` placeholders filled with upstream outputs
    Template { template: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    Agent {
        agent_id: String,
        message: MessageInput,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        assets: Vec<AssetReference>,
    },
    Conditional {
        input: String,
        condition: String,
        if_true: String,
        if_false: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowTask {
    pub name: String,
    #[serde(flatten)]
    pub kind: TaskKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowEdge {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowTaskGraph {
    flow_name: String,
    user_id: String,
    session_id: String,
    tasks: Vec<WorkflowTask>,
    edges: Vec<WorkflowEdge>,
}

impl WorkflowTaskGraph {
    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn tasks(&self) -> &[WorkflowTask] {
        &self.tasks
    }
}

#[cfg(test)]
impl WorkflowTaskGraph {
    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    pub fn task(&self, name: &str) -> Option<&WorkflowTask> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

pub struct WorkflowGraphBuilder {
    flow_name: String,
    user_id: String,
    session_id: String,
    tasks: Vec<WorkflowTask>,
}

impl WorkflowGraphBuilder {
    pub fn new(flow_name: impl Into<String>, user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            flow_name: flow_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            tasks: Vec::new(),
        }
    }

    pub fn agent(
        mut self,
        name: &str,
        agent_id: &str,
        message: MessageInput,
        assets: Vec<AssetReference>,
        depends_on: &[&str],
    ) -> Self {
        self.tasks.push(WorkflowTask {
            name: name.to_string(),
            kind: TaskKind::Agent {
                agent_id: agent_id.to_string(),
                message,
                assets,
            },
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
        });
        self
    }

    /// Branch on `input`'s output; exactly one of the two targets runs
    pub fn conditional(mut self, name: &str, input: &str, condition: &str, if_true: &str, if_false: &str) -> Self {
        self.tasks.push(WorkflowTask {
            name: name.to_string(),
            kind: TaskKind::Conditional {
                input: input.to_string(),
                condition: condition.to_string(),
                if_true: if_true.to_string(),
                if_false: if_false.to_string(),
            },
            depends_on: vec![input.to_string()],
        });
        self
    }

    pub fn build(self) -> AppResult<WorkflowTaskGraph> {
        let mut names = HashSet::new();
        for task in &self.tasks {
            if !names.insert(task.name.as_str()) {
                return Err(AppError::InvalidGraph(format!("duplicate task '{}'", task.name)));
            }
        }

        let mut edges = Vec::new();
        for task in &self.tasks {
            for dep in &task.depends_on {
                if !names.contains(dep.as_str()) {
                    return Err(AppError::InvalidGraph(format!(
                        "task '{}' depends on unknown task '{}'",
                        task.name, dep
                    )));
                }
                edges.push(WorkflowEdge {
                    from: dep.clone(),
                    to: task.name.clone(),
                    condition: None,
                });
            }

            match &task.kind {
                TaskKind::Conditional { if_true, if_false, .. } => {
                    for (target, branch) in [(if_true, true), (if_false, false)] {
                        if !names.contains(target.as_str()) {
                            return Err(AppError::InvalidGraph(format!(
                                "branch '{}' of '{}' is not a task",
                                target, task.name
                            )));
                        }
                        edges.push(WorkflowEdge {
                            from: task.name.clone(),
                            to: target.clone(),
                            condition: Some(branch),
                        });
                    }
                }
                TaskKind::Agent { message, .. } => {
                    if let MessageInput::FromTask { from_task } = message {
                        if !task.depends_on.contains(from_task) {
                            return Err(AppError::InvalidGraph(format!(
                                "task '{}' reads '{}' without depending on it",
                                task.name, from_task
                            )));
                        }
                    }
                }
            }
        }

        ensure_acyclic(&self.tasks, &edges)?;

        Ok(WorkflowTaskGraph {
            flow_name: self.flow_name,
            user_id: self.user_id,
            session_id: self.session_id,
            tasks: self.tasks,
            edges,
        })
    }
}

/// Kahn's algorithm over the edge list. A branch edge and a dependency edge
/// between the same pair count once.
fn ensure_acyclic(tasks: &[WorkflowTask], edges: &[WorkflowEdge]) -> AppResult<()> {
    let mut in_degree: HashMap<&str, usize> = tasks.iter().map(|t| (t.name.as_str(), 0)).collect();
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut seen = HashSet::new();

    for edge in edges {
        if !seen.insert((edge.from.as_str(), edge.to.as_str())) {
            continue;
        }
        outgoing.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
        *in_degree.entry(edge.to.as_str()).or_default() += 1;
    }

    let mut ready: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut visited = 0;

    while let Some(name) = ready.pop_front() {
        visited += 1;
        for next in outgoing.get(name).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(next);
                }
            }
        }
    }

    if visited != tasks.len() {
        return Err(AppError::InvalidGraph("graph contains a cycle".to_string()));
    }
    Ok(())
}
