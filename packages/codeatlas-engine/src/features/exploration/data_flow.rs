//! Data-flow tracing
//!
//! Breadth-first traversal along CALLS edges from a start symbol, forward
//! (outgoing) or reverse (incoming), bounded by `max_hops` and `max_nodes`.
//! Every visited node is classified against the source/sink registry;
//! non-matches are transforms. Traces carry the visit path, a `truncated`
//! flag when a bound was hit, and the standing static-analysis limitations.

use std::collections::VecDeque;

use ahash::AHashSet;
use tracing::debug;

use super::results::{DataFlow, DataPoint};
use crate::features::pattern_registry::PatternRegistry;
use crate::features::symbol_graph::CodeGraph;
use crate::shared::cancel::CancellationToken;
use crate::shared::models::{EdgeKind, EngineError, Result, Symbol};

/// Traversal bounds
#[derive(Debug, Clone, Copy)]
pub struct TraversalBounds {
    pub max_nodes: usize,
    pub max_hops: usize,
}

impl Default for TraversalBounds {
    fn default() -> Self {
        Self {
            max_nodes: 1000,
            max_hops: 10,
        }
    }
}

/// Trace direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Forward,
    Reverse,
}

impl FlowDirection {
    fn as_str(&self) -> &'static str {
        match self {
            FlowDirection::Forward => "forward",
            FlowDirection::Reverse => "reverse",
        }
    }
}

/// Trace data flow forward from a symbol along outgoing CALLS edges.
pub fn trace_data_flow(
    graph: &CodeGraph,
    registry: &PatternRegistry,
    start_id: &str,
    bounds: TraversalBounds,
    token: &CancellationToken,
) -> Result<DataFlow> {
    trace(graph, registry, start_id, FlowDirection::Forward, bounds, token)
}

/// Trace data flow in reverse, following incoming CALLS edges.
pub fn trace_data_flow_reverse(
    graph: &CodeGraph,
    registry: &PatternRegistry,
    start_id: &str,
    bounds: TraversalBounds,
    token: &CancellationToken,
) -> Result<DataFlow> {
    trace(graph, registry, start_id, FlowDirection::Reverse, bounds, token)
}

/// Forward trace keeping only sinks flagged dangerous.
pub fn trace_to_dangerous_sinks(
    graph: &CodeGraph,
    registry: &PatternRegistry,
    start_id: &str,
    bounds: TraversalBounds,
    token: &CancellationToken,
) -> Result<DataFlow> {
    let mut flow = trace_data_flow(graph, registry, start_id, bounds, token)?;
    flow.sinks.retain(|sink| sink.dangerous);
    Ok(flow)
}

fn trace(
    graph: &CodeGraph,
    registry: &PatternRegistry,
    start_id: &str,
    direction: FlowDirection,
    bounds: TraversalBounds,
    token: &CancellationToken,
) -> Result<DataFlow> {
    graph.ensure_frozen()?;
    if start_id.is_empty() {
        return Err(EngineError::invalid_input("start symbol must not be empty"));
    }
    graph.require(start_id)?;
    if bounds.max_nodes == 0 {
        return Err(EngineError::invalid_input("max_nodes must be positive"));
    }

    let mut sources = Vec::new();
    let mut transforms = Vec::new();
    let mut sinks = Vec::new();
    let mut path = Vec::new();
    let mut truncated = false;

    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    queue.push_back((start_id, 0));
    visited.insert(start_id);

    let mut visits = 0usize;
    while let Some((id, depth)) = queue.pop_front() {
        token.check_every(visits, "trace_data_flow")?;

        if visits >= bounds.max_nodes {
            truncated = true;
            break;
        }
        visits += 1;

        let Some(symbol) = graph.get(id) else { continue };
        path.push(symbol.id.clone());
        classify(registry, symbol, &mut sources, &mut transforms, &mut sinks);

        if depth >= bounds.max_hops {
            // Unexplored frontier beyond the hop budget
            truncated = true;
            continue;
        }

        let neighbors: Vec<&str> = match direction {
            FlowDirection::Forward => graph
                .outgoing_of_kind(id, EdgeKind::Calls)
                .map(|e| e.to.as_str())
                .collect(),
            FlowDirection::Reverse => graph
                .incoming_of_kind(id, EdgeKind::Calls)
                .map(|e| e.from.as_str())
                .collect(),
        };
        for next in neighbors {
            if visited.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }
    if !queue.is_empty() {
        truncated = true;
    }

    debug!(
        start_id,
        direction = direction.as_str(),
        visited = path.len(),
        sources = sources.len(),
        sinks = sinks.len(),
        truncated,
        "data-flow trace complete"
    );

    Ok(DataFlow {
        start: start_id.to_string(),
        direction: direction.as_str().to_string(),
        sources,
        transforms,
        sinks,
        path,
        truncated,
        precision: "function".to_string(),
        limitations: standing_limitations(),
    })
}

fn classify(
    registry: &PatternRegistry,
    symbol: &Symbol,
    sources: &mut Vec<DataPoint>,
    transforms: &mut Vec<DataPoint>,
    sinks: &mut Vec<DataPoint>,
) {
    if let Some(pattern) = registry.classify_source(symbol) {
        sources.push(data_point(symbol, "source", pattern.category, false));
        return;
    }
    if let Some(pattern) = registry.classify_sink(symbol) {
        sinks.push(data_point(symbol, "sink", pattern.category, pattern.dangerous));
        return;
    }
    transforms.push(data_point(symbol, "transform", "", false));
}

fn data_point(symbol: &Symbol, point_type: &str, category: &str, dangerous: bool) -> DataPoint {
    DataPoint {
        symbol_id: symbol.id.clone(),
        name: symbol.name.clone(),
        point_type: point_type.to_string(),
        category: category.to_string(),
        file_path: symbol.file_path.clone(),
        line: symbol.start_line,
        dangerous,
    }
}

fn standing_limitations() -> Vec<String> {
    vec![
        "analysis operates at function-level precision; statement-level flows are approximated"
            .to_string(),
        "calls through interfaces are not resolved to concrete implementations".to_string(),
        "dynamic dispatch and reflection targets are invisible to static analysis".to_string(),
    ]
}

// ============================================================================
// Tests
// ============================================================================
