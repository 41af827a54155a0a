//! End-to-end routing scenarios.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use u_picking::assembly::{resolve, rotate};
use u_picking::config::{AccessType, RouterConfig, SolverKind, Strategy};
use u_picking::graph::AccessGraph;
use u_picking::models::{ItemId, Node, Order, Position, Warehouse};
use u_picking::router::{Degradation, Router};
use u_picking::solver::{
    BranchAndBound, Deadline, LocalizedMinPath, NearestNeighbor, TourSolver,
};

fn router(config: RouterConfig) -> Router {
    Router::new(config).expect("valid config")
}

/// 5x5 open floor, worker starts and ends at the origin, two shelves beside row 0.
fn line_warehouse() -> Warehouse {
    let mut wh = Warehouse::new(5, 5, Position::new(0, 0), Position::new(0, 0))
        .expect("valid");
    wh.add_product(1, Position::new(2, 1)).expect("free");
    wh.add_product(2, Position::new(4, 1)).expect("free");
    wh
}

/// Three shelves on both sides of a centered start.
fn spread_warehouse() -> Warehouse {
    let mut wh = Warehouse::new(9, 3, Position::new(4, 0), Position::new(4, 0))
        .expect("valid");
    wh.add_product(1, Position::new(2, 1)).expect("free");
    wh.add_product(2, Position::new(7, 1)).expect("free");
    wh.add_product(3, Position::new(1, 1)).expect("free");
    wh
}

#[test]
fn line_scenario_costs_eight_in_either_order() {
    let wh = line_warehouse();
    let router = router(RouterConfig::default().with_strategy(Strategy::BranchAndBound));

    for items in [[1, 2], [2, 1]] {
        let report = router.compute_route(&wh, &items).expect("valid order");
        assert_eq!(report.cost, Some(8));
        assert_eq!(report.strategy, SolverKind::BranchAndBound);
        assert!(!report.timed_out);
        assert!(report.degradation.is_none());

        let nodes = report.tour.nodes();
        assert_eq!(nodes.first(), Some(&Node::Start));
        assert_eq!(nodes.last(), Some(&Node::End));
        assert_eq!(nodes.len(), 4);

        let lines = report.instruction_lines();
        assert_eq!(lines.first().map(String::as_str), Some("Start at position (0, 0)."));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Arrive at end position (0, 0). Total steps: 8.")
        );
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("Pick up item")).count(),
            2
        );
    }
}

#[test]
fn walled_in_item_degrades_without_panicking() {
    let mut wh = line_warehouse();
    wh.add_product(9, Position::new(2, 3)).expect("free");
    for p in [(1, 3), (3, 3), (2, 4), (2, 2)] {
        wh.add_obstacle(Position::from(p)).expect("free");
    }

    let order = Order::new(&wh, &[1, 2, 9]).expect("valid");
    let graph = AccessGraph::build(&wh, &order);
    assert!(graph.check_connected().is_err());

    let report = router(RouterConfig::default())
        .compute_route(&wh, &[1, 2, 9])
        .expect("valid order");
    assert_eq!(report.degradation, Some(Degradation::IncompleteGraph(Node::Item(9))));
    assert!(report.is_degraded());
    assert!(!report.timed_out);
    assert_eq!(report.cost, None);
    assert_eq!(
        report.tour.nodes(),
        vec![Node::Start, Node::Item(1), Node::Item(2), Node::End]
    );

    // The reachable items still get a full route.
    let lines = report.instruction_lines();
    assert_eq!(lines.first().map(String::as_str), Some("Start at position (0, 0)."));
    assert!(lines
        .last()
        .is_some_and(|l| l.starts_with("Arrive at end position (0, 0).")));
    assert_eq!(
        lines.iter().filter(|l| l.starts_with("Pick up item")).count(),
        2
    );
    assert!(!lines.iter().any(|l| l.contains("(2, 3)")));
}

#[test]
fn zero_budget_returns_input_order() {
    // 20 free-standing shelves on a 11x9 floor.
    let mut wh = Warehouse::new(11, 9, Position::new(0, 0), Position::new(10, 8))
        .expect("valid");
    let mut id: ItemId = 0;
    for x in (1..10).step_by(2) {
        for y in (1..8).step_by(2) {
            id += 1;
            wh.add_product(id, Position::new(x, y)).expect("free");
        }
    }
    let mut items: Vec<ItemId> = (1..=id).collect();
    items.shuffle(&mut StdRng::seed_from_u64(42));

    let config = RouterConfig::default().with_time_budget(Duration::ZERO);
    let report = router(config).compute_route(&wh, &items).expect("valid order");

    assert!(report.timed_out);
    assert_eq!(report.degradation, Some(Degradation::DeadlineExceeded));
    assert_eq!(report.strategy, SolverKind::NearestNeighbor);
    assert!(report.cost.is_some());

    let expected: Vec<Node> = std::iter::once(Node::Start)
        .chain(items.iter().map(|&id| Node::Item(id)))
        .chain(std::iter::once(Node::End))
        .collect();
    assert_eq!(report.tour.nodes(), expected);
    assert_eq!(
        report
            .instruction_lines()
            .iter()
            .filter(|l| l.starts_with("Pick up item"))
            .count(),
        20
    );
}

#[test]
fn exact_beats_heuristics_on_spread_layout() {
    let wh = spread_warehouse();
    let order = Order::new(&wh, &[1, 2, 3]).expect("valid");
    let graph = AccessGraph::build(&wh, &order);
    let deadline = Deadline::unbounded();

    let exact = BranchAndBound::new(AccessType::Multi)
        .solve(&graph, &deadline)
        .expect("connected");
    let nearest = NearestNeighbor::new().solve(&graph, &deadline).expect("connected");
    let localized = LocalizedMinPath::new().solve(&graph, &deadline).expect("connected");

    assert!(exact.cost <= nearest.cost);
    assert!(nearest.cost <= localized.cost);
    assert!(exact.cost <= 12);
    // Nearest-first threading crosses the floor twice.
    assert_eq!(localized.cost, 16);
}

#[test]
fn resolved_route_runs_from_start_to_end() {
    let mut rng = StdRng::seed_from_u64(3);
    let start = Position::new(0, 0);
    let end = Position::new(11, 7);
    let wh = Warehouse::random(12, 8, 6, start, end, &mut rng).expect("layout");
    let items: Vec<ItemId> = wh.products().map(|(id, _)| id).collect();
    let order = Order::new(&wh, &items).expect("valid");
    let graph = AccessGraph::build(&wh, &order);
    if graph.check_connected().is_err() {
        return;
    }

    for solver in [
        Box::new(BranchAndBound::default()) as Box<dyn TourSolver>,
        Box::new(NearestNeighbor::new()),
        Box::new(LocalizedMinPath::new()),
    ] {
        let solution = solver.solve(&graph, &Deadline::unbounded()).expect("connected");
        let route = resolve(&graph, &rotate(&solution.tour)).expect("edges exist");
        assert_eq!(route.first(), Some(&start), "{}", solver.name());
        assert_eq!(route.last(), Some(&end), "{}", solver.name());

        let walked: u32 = route.windows(2).map(|w| w[0].manhattan(w[1])).sum();
        assert_eq!(walked, solution.cost, "{}", solver.name());
    }
}

#[test]
fn route_to_single_item() {
    let report = router(RouterConfig::default())
        .route_to_item(&line_warehouse(), 1)
        .expect("known item");
    assert_eq!(report.strategy, SolverKind::LocalizedMinPath);
    assert_eq!(report.cost, Some(4));
    assert_eq!(
        report.instruction_lines(),
        vec![
            "Start at position (0, 0).",
            "From (0, 0), move right 2 steps to (2, 0).",
            "Pick up item at (2, 1).",
            "From (2, 0), move left 2 steps to (0, 0).",
            "Arrive at end position (0, 0). Total steps: 4.",
        ]
    );
}

#[test]
fn shared_shelf_is_picked_once() {
    let mut wh = line_warehouse();
    wh.add_product(5, Position::new(2, 1)).expect("shared shelf");

    let report = router(RouterConfig::default())
        .compute_route(&wh, &[1, 2, 5])
        .expect("valid order");
    assert_eq!(report.cost, Some(8));
    assert_eq!(report.tour.len(), 5);
    let picks: Vec<String> = report
        .instruction_lines()
        .into_iter()
        .filter(|l| l.starts_with("Pick up item"))
        .collect();
    assert_eq!(picks.len(), 2);
    assert!(picks.contains(&"Pick up item at (2, 1).".to_string()));
}

#[test]
fn config_round_trips_through_json() {
    let config = RouterConfig::default()
        .with_strategy(Strategy::LocalizedMinPath)
        .with_access_type(AccessType::Single)
        .with_time_budget(Duration::from_millis(250))
        .with_fallback(false);
    let json = config.to_json().expect("serializable");
    assert_eq!(RouterConfig::from_json(&json).expect("valid"), config);
}
