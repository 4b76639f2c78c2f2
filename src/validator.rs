use std::sync::Arc;

use crate::models::{Edge, HandlePosition, Node};

/// An edge the connection gesture wants to create. Both handles have already
/// been resolved against their nodes.
#[derive(Debug, Clone, Copy)]
pub struct ProposedEdge<'a> {
    pub source: &'a Node,
    pub source_handle: HandlePosition,
    pub target: &'a Node,
    pub target_handle: HandlePosition,
    pub existing_edges: &'a [Arc<Edge>],
}

impl ProposedEdge<'_> {
    pub fn is_self_loop(&self) -> bool {
        self.source.id == self.target.id
    }
}

/// Decides whether a proposed edge may be created.
pub trait ConnectionValidator {
    fn allows(&self, proposed: &ProposedEdge<'_>) -> bool;

    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Any handle may pair with any other handle, including self-loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ConnectionValidator for AcceptAll {
    fn allows(&self, _proposed: &ProposedEdge<'_>) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "accept_all"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RejectSelfLoops;

impl ConnectionValidator for RejectSelfLoops {
    fn allows(&self, proposed: &ProposedEdge<'_>) -> bool {
        !proposed.is_self_loop()
    }

    fn name(&self) -> &'static str {
        "reject_self_loops"
    }
}

/// Rejects a second edge between the same source and target nodes,
/// regardless of which handles either edge uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectParallelEdges;

impl ConnectionValidator for RejectParallelEdges {
    fn allows(&self, proposed: &ProposedEdge<'_>) -> bool {
        !proposed
            .existing_edges
            .iter()
            .any(|edge| edge.source == proposed.source.id && edge.target == proposed.target.id)
    }

    fn name(&self) -> &'static str {
        "reject_parallel_edges"
    }
}

/// Only facing handles connect: right to left, bottom to top and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireOpposingHandles;

impl ConnectionValidator for RequireOpposingHandles {
    fn allows(&self, proposed: &ProposedEdge<'_>) -> bool {
        proposed.source_handle.opposite() == proposed.target_handle
    }

    fn name(&self) -> &'static str {
        "require_opposing_handles"
    }
}

#[derive(Default)]
pub struct AllOf {
    policies: Vec<Box<dyn ConnectionValidator>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, policy: impl ConnectionValidator + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }
}

impl ConnectionValidator for AllOf {
    fn allows(&self, proposed: &ProposedEdge<'_>) -> bool {
        self.policies.iter().all(|policy| {
            let allowed = policy.allows(proposed);
            if !allowed {
                tracing::debug!(policy = policy.name(), "connection rejected by policy");
            }
            allowed
        })
    }

    fn name(&self) -> &'static str {
        "all_of"
    }
}

/// Adapts a closure into a validator.
pub struct FnValidator<F>(F);

pub fn validator_fn<F>(f: F) -> FnValidator<F>
where
    F: Fn(&ProposedEdge<'_>) -> bool,
{
    FnValidator(f)
}

impl<F> ConnectionValidator for FnValidator<F>
where
    F: Fn(&ProposedEdge<'_>) -> bool,
{
    fn allows(&self, proposed: &ProposedEdge<'_>) -> bool {
        (self.0)(proposed)
    }
}
