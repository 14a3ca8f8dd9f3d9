//! Flow attribution: decomposes one sample into labeled source -> sink edges.
//!
//! This is a display heuristic, not an energy ledger. Several edges subtract
//! overlapping surplus terms, so per-node inflow and outflow need not match.

use std::fmt;

use serde::Serialize;

use super::types::SimulationState;

/// Edges at or below this magnitude are dropped (kW).
pub const FLOW_NOISE_THRESHOLD_KW: f64 = 0.05;

/// Logical node of the flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Node {
    Pv,
    House,
    Battery,
    Grid,
    HeatPump,
    Ev,
}

impl Node {
    /// Display label of the node.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pv => "PV",
            Self::House => "House",
            Self::Battery => "Battery",
            Self::Grid => "Grid",
            Self::HeatPump => "HeatPump",
            Self::Ev => "EV",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A directed power flow between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowEdge {
    pub source: Node,
    pub sink: Node,
    pub power_kw: f64,
}

impl FlowEdge {
    fn new(source: Node, sink: Node, power_kw: f64) -> Self {
        Self {
            source,
            sink,
            power_kw,
        }
    }
}

impl fmt::Display for FlowEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {:.2} kW", self.source, self.sink, self.power_kw)
    }
}

/// All ten candidate edges for `state`, before the noise threshold.
pub fn candidate_edges(state: &SimulationState) -> [FlowEdge; 10] {
    use Node::*;

    let s = state;
    let household = s.household_kw();
    let [pv_house, pv_battery, pv_grid] = primary_pv_flows(s);

    [
        FlowEdge::new(Pv, House, pv_house),
        FlowEdge::new(Pv, Battery, pv_battery),
        FlowEdge::new(Pv, Grid, pv_grid),
        FlowEdge::new(Battery, House, (-s.battery_power).max(0.0)),
        FlowEdge::new(Grid, House, s.grid.max(0.0)),
        FlowEdge::new(House, HeatPump, s.heat_pump.max(0.0)),
        FlowEdge::new(Pv, Ev, s.ev_power.max(0.0)),
        FlowEdge::new(
            Battery,
            Ev,
            (s.ev_power - (s.pv - household).max(0.0)).max(0.0),
        ),
        FlowEdge::new(Ev, House, (-s.ev_power).max(0.0)),
        FlowEdge::new(
            Ev,
            Grid,
            (-s.ev_power - (household - s.pv).max(0.0)).max(0.0),
        ),
    ]
}

/// The three primary PV flows `[PV->House, PV->Battery, PV->Grid]`.
pub fn primary_pv_flows(state: &SimulationState) -> [f64; 3] {
    [
        state.pv.min(state.household_kw().max(0.0)),
        state.battery_power.max(0.0),
        (-state.grid.min(0.0)).max(0.0),
    ]
}

/// Edges of `state` whose magnitude exceeds [`FLOW_NOISE_THRESHOLD_KW`].
pub fn attribute(state: &SimulationState) -> Vec<FlowEdge> {
    candidate_edges(state)
        .into_iter()
        .filter(|e| e.power_kw > FLOW_NOISE_THRESHOLD_KW)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(pv: f64, load_base: f64, heat_pump: f64, ev: f64, bat: f64, grid: f64) -> SimulationState {
        SimulationState {
            time: 0,
            pv,
            load_base,
            heat_pump,
            ev_power: ev,
            ev_soc: 50.0,
            battery_soc: 50.0,
            battery_power: bat,
            grid,
            pv_energy: 0.0,
            grid_import_energy: 0.0,
            grid_export_energy: 0.0,
            ev_charge_energy: 0.0,
            ev_discharge_energy: 0.0,
            load_total: load_base + heat_pump + ev.max(0.0),
        }
    }

    fn power(edges: &[FlowEdge], source: Node, sink: Node) -> Option<f64> {
        edges
            .iter()
            .find(|e| e.source == source && e.sink == sink)
            .map(|e| e.power_kw)
    }

    fn assert_flow(edges: &[FlowEdge], source: Node, sink: Node, expected: f64) {
        let got = power(edges, source, sink);
        assert!(
            got.is_some_and(|kw| (kw - expected).abs() < 1e-9),
            "{source} -> {sink}: expected {expected}, got {got:?}"
        );
    }

    #[test]
    fn sunny_surplus_with_export() {
        let s = state(5.0, 0.6, 1.0, 0.0, 1.6, -1.8);
        let edges = attribute(&s);
        assert_flow(&edges, Node::Pv, Node::House, 1.6);
        assert_flow(&edges, Node::Pv, Node::Battery, 1.6);
        assert_flow(&edges, Node::Pv, Node::Grid, 1.8);
        assert_flow(&edges, Node::House, Node::HeatPump, 1.0);
        assert_eq!(power(&edges, Node::Grid, Node::House), None);
        assert_eq!(power(&edges, Node::Battery, Node::House), None);
    }

    #[test]
    fn night_deficit_with_import() {
        let s = state(0.0, 1.0, 1.0, 0.0, -0.4, 1.6);
        let edges = attribute(&s);
        assert_flow(&edges, Node::Battery, Node::House, 0.4);
        assert_flow(&edges, Node::Grid, Node::House, 1.6);
        assert_eq!(power(&edges, Node::Pv, Node::House), None);
    }

    #[test]
    fn ev_charging_edges() {
        // household 1.5, pv 2.5 => pv surplus 1.0, ev 3.0 => battery->ev 2.0
        let s = state(2.5, 0.5, 1.0, 3.0, 0.0, 2.0);
        let edges = attribute(&s);
        assert_flow(&edges, Node::Pv, Node::Ev, 3.0);
        assert_flow(&edges, Node::Battery, Node::Ev, 2.0);
        assert_eq!(power(&edges, Node::Ev, Node::House), None);
    }

    #[test]
    fn ev_discharge_edges() {
        // household 1.5, pv 0 => deficit 1.5, ev -2.5 => ev->grid 1.0
        let s = state(0.0, 0.5, 1.0, -2.5, 0.0, -1.0);
        let edges = attribute(&s);
        assert_flow(&edges, Node::Ev, Node::House, 2.5);
        assert_flow(&edges, Node::Ev, Node::Grid, 1.0);
        assert_eq!(power(&edges, Node::Pv, Node::Ev), None);
    }

    #[test]
    fn noise_threshold_drops_small_edges() {
        let s = state(0.05, 0.5, 1.0, 0.0, 0.0, 1.45);
        let all = candidate_edges(&s);
        assert_eq!(all.len(), 10);
        let edges = attribute(&s);
        assert_eq!(power(&edges, Node::Pv, Node::House), None);
        assert!(edges.iter().all(|e| e.power_kw > FLOW_NOISE_THRESHOLD_KW));
    }

    #[test]
    fn primary_flows_non_negative() {
        for s in [
            state(5.0, 0.6, 1.0, 0.0, 1.6, -1.8),
            state(0.0, 1.0, 1.0, 0.0, -0.4, 1.6),
            state(0.0, 0.5, 1.0, -2.5, 0.0, -1.0),
        ] {
            assert!(primary_pv_flows(&s).iter().all(|f| *f >= 0.0));
        }
    }

    #[test]
    fn edge_display() {
        let e = FlowEdge::new(Node::Pv, Node::Grid, 1.234);
        assert_eq!(e.to_string(), "PV -> Grid: 1.23 kW");
    }
}
