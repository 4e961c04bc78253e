//! A hand-rolled min-cost-flow primitive shared by MinMax and FairFlow,
//! in place of the retrieved Python original's
//! `ortools.graph.pywrapgraph.SimpleMinCostFlow` binding (no Rust
//! ecosystem equivalent ships in this pack; the example pack's own
//! linear-sum-assignment and branch-and-bound reference files hand-roll
//! their numeric kernels the same way rather than reaching for a solver
//! binding).
//!
//! Successive shortest augmenting paths, shortest path found by SPFA
//! (queue-based Bellman-Ford) so residual edges with negative cost are
//! handled directly — correct as long as the residual graph never
//! contains a negative cycle, which successive-shortest-path maintains
//! as an invariant.

use std::collections::VecDeque;

#[derive(Clone, Copy, Debug)]
struct FlowEdge {
    to: usize,
    cap: i64,
    cost: i64,
    flow: i64,
}

pub struct MinCostFlow {
    adj: Vec<Vec<usize>>,
    edges: Vec<FlowEdge>,
}

impl MinCostFlow {
    pub fn new(n: usize) -> Self {
        MinCostFlow { adj: vec![Vec::new(); n], edges: Vec::new() }
    }

    /// Add a directed arc `from -> to` with the given capacity and cost.
    /// Returns the edge id used to read back the realized flow.
    pub fn add_edge(&mut self, from: usize, to: usize, cap: i64, cost: i64) -> usize {
        let id = self.edges.len();
        self.edges.push(FlowEdge { to, cap, cost, flow: 0 });
        self.adj[from].push(id);
        self.edges.push(FlowEdge { to: from, cap: 0, cost: -cost, flow: 0 });
        self.adj[to].push(id + 1);
        id
    }

    pub fn flow_on(&self, edge_id: usize) -> i64 {
        self.edges[edge_id].flow
    }

    fn shortest_path(&self, s: usize, t: usize) -> Option<(i64, Vec<Option<usize>>)> {
        let n = self.adj.len();
        let mut dist = vec![i64::MAX; n];
        let mut in_queue = vec![false; n];
        let mut prev_edge: Vec<Option<usize>> = vec![None; n];
        dist[s] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(s);
        in_queue[s] = true;

        while let Some(u) = queue.pop_front() {
            in_queue[u] = false;
            if dist[u] == i64::MAX {
                continue;
            }
            for &eid in &self.adj[u] {
                let e = self.edges[eid];
                if e.cap - e.flow <= 0 {
                    continue;
                }
                let nd = dist[u] + e.cost;
                if nd < dist[e.to] {
                    dist[e.to] = nd;
                    prev_edge[e.to] = Some(eid);
                    if !in_queue[e.to] {
                        queue.push_back(e.to);
                        in_queue[e.to] = true;
                    }
                }
            }
        }

        if dist[t] == i64::MAX {
            None
        } else {
            Some((dist[t], prev_edge))
        }
    }

    /// Push up to `max_flow` units of flow from `s` to `t` at minimum
    /// cost. Returns `(flow_pushed, total_cost)`; `flow_pushed` may be
    /// less than `max_flow` if the network saturates first.
    pub fn min_cost_flow(&mut self, s: usize, t: usize, max_flow: i64) -> (i64, i64) {
        let mut total_flow = 0i64;
        let mut total_cost = 0i64;

        while total_flow < max_flow {
            let (unit_cost, prev_edge) = match self.shortest_path(s, t) {
                Some(p) => p,
                None => break,
            };

            let mut aug = max_flow - total_flow;
            let mut v = t;
            while v != s {
                let eid = prev_edge[v].expect("path reconstruction must reach s");
                let e = self.edges[eid];
                aug = aug.min(e.cap - e.flow);
                v = self.edges[eid ^ 1].to;
            }
            if aug <= 0 {
                break;
            }

            let mut v = t;
            while v != s {
                let eid = prev_edge[v].expect("path reconstruction must reach s");
                self.edges[eid].flow += aug;
                self.edges[eid ^ 1].flow -= aug;
                v = self.edges[eid ^ 1].to;
            }

            total_flow += aug;
            total_cost += aug * unit_cost;
        }

        (total_flow, total_cost)
    }
}

/// A directed arc with an inclusive `[lower, upper]` capacity range
/// (spec §4.3's "lower bounds on reviewer edges equal `minimum[r]`").
#[derive(Clone, Copy, Debug)]
pub struct BoundedEdge {
    pub from: usize,
    pub to: usize,
    pub lower: i64,
    pub upper: i64,
    pub cost: i64,
}

pub struct LowerBoundedResult {
    /// Realized flow per input edge, in the same order as `edges`.
    pub flows: Vec<i64>,
    pub total_cost: i64,
}

/// Solve a min-cost flow honoring per-edge lower bounds via the standard
/// excess-transform (super source/sink + a `t -> s` circulation edge),
/// the same two-phase "saturate minimums, then satisfy demand" shape as
/// `FairFlow::_construct_and_solve_validifier_network` in the retrieved
/// Python original (generalized here into a standalone primitive MinMax
/// and FairFlow both call). Returns `None` if the lower bounds cannot
/// all be satisfied.
pub fn solve_lower_bounded(n: usize, s: usize, t: usize, edges: &[BoundedEdge]) -> Option<LowerBoundedResult> {
    let super_source = n;
    let super_sink = n + 1;
    let mut mcf = MinCostFlow::new(n + 2);
    let mut excess = vec![0i64; n + 2];
    let mut edge_ids = Vec::with_capacity(edges.len());
    let mut fixed_cost = 0i64;

    for e in edges {
        let cap = e.upper - e.lower;
        let id = mcf.add_edge(e.from, e.to, cap, e.cost);
        edge_ids.push(id);
        excess[e.to] += e.lower;
        excess[e.from] -= e.lower;
        fixed_cost += e.lower * e.cost;
    }

    const INF: i64 = i64::MAX / 4;
    mcf.add_edge(t, s, INF, 0);

    let mut required = 0i64;
    for v in 0..(n + 2) {
        if excess[v] > 0 {
            mcf.add_edge(super_source, v, excess[v], 0);
            required += excess[v];
        } else if excess[v] < 0 {
            mcf.add_edge(v, super_sink, -excess[v], 0);
        }
    }

    let (flow, cost) = mcf.min_cost_flow(super_source, super_sink, required);
    if flow < required {
        return None;
    }

    let flows = edges.iter().zip(edge_ids.iter()).map(|(e, &id)| e.lower + mcf.flow_on(id)).collect();
    Some(LowerBoundedResult { flows, total_cost: cost + fixed_cost })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_bipartite_flow_picks_cheapest_matching() {
        // s -> r0, r1 (cap 1 each); r -> p edges with costs; p -> t (cap 1 each)
        let mut mcf = MinCostFlow::new(4);
        let s = 0;
        let r0 = 1;
        let p0 = 2;
        let t = 3;
        mcf.add_edge(s, r0, 1, 0);
        let e = mcf.add_edge(r0, p0, 1, 5);
        mcf.add_edge(p0, t, 1, 0);
        let (flow, cost) = mcf.min_cost_flow(s, t, 1);
        assert_eq!(flow, 1);
        assert_eq!(cost, 5);
        assert_eq!(mcf.flow_on(e), 1);
    }

    #[test]
    fn lower_bound_transform_enforces_minimums() {
        // source(0) -> reviewer(1) lower=1 upper=2 cost0
        // reviewer(1) -> paper(2) lower=0 upper=1 cost=-3 (reward)
        // paper(2) -> sink(3) lower=1 upper=1 cost0
        let edges = vec![
            BoundedEdge { from: 0, to: 1, lower: 1, upper: 2, cost: 0 },
            BoundedEdge { from: 1, to: 2, lower: 0, upper: 1, cost: -3 },
            BoundedEdge { from: 2, to: 3, lower: 1, upper: 1, cost: 0 },
        ];
        let result = solve_lower_bounded(4, 0, 3, &edges).unwrap();
        assert_eq!(result.flows[0], 1);
        assert_eq!(result.flows[1], 1);
        assert_eq!(result.flows[2], 1);
        assert_eq!(result.total_cost, -3);
    }

    #[test]
    fn infeasible_lower_bound_returns_none() {
        // paper needs 2 but reviewer capacity only supports 1.
        let edges = vec![
            BoundedEdge { from: 0, to: 1, lower: 0, upper: 1, cost: 0 },
            BoundedEdge { from: 1, to: 2, lower: 0, upper: 1, cost: 0 },
            BoundedEdge { from: 2, to: 3, lower: 2, upper: 2, cost: 0 },
        ];
        assert!(solve_lower_bounded(4, 0, 3, &edges).is_none());
    }
}
