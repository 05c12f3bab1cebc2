use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use parkpath_lib::{
    build_graph, find_nearest_slot, plan_path, shortest_path, Coordinate, CorridorSegment,
    Direction, Entrance, Graph, GridPoint, Level, MapDescription, MapElement, PathRequest, Ramp,
    Slot, SlotRequest, SlotStatus,
};
use std::hint::black_box;

const LEVELS: i32 = 4;
const CELLS: u32 = 24;
const SPACING: u32 = 4;

fn corridor(points: Vec<GridPoint>) -> MapElement {
    MapElement::Corridor(CorridorSegment {
        points,
        direction: Direction::Both,
    })
}

/// Square lattice of corridors per level, ramps in two corners and a slot in
/// every cell. Only the top level has free slots.
fn generated_map() -> MapDescription {
    let extent = CELLS * SPACING;
    let mut map = MapDescription::new("bench");

    for level_number in 1..=LEVELS {
        let mut level = Level::new(level_number);
        if level_number == 1 {
            level = level.with(MapElement::Entrance(Entrance {
                point: GridPoint::new(0, 2),
                kind: None,
            }));
        }
        for corner in [GridPoint::new(0, 0), GridPoint::new(extent, extent)] {
            level = level.with(MapElement::Ramp(Ramp {
                point: corner,
                link: None,
                cost: None,
            }));
        }
        for line in 0..=CELLS {
            let offset = line * SPACING;
            let row = (0..=CELLS).map(|i| GridPoint::new(i * SPACING, offset)).collect();
            let column = (0..=CELLS).map(|i| GridPoint::new(offset, i * SPACING)).collect();
            level = level.with(corridor(row)).with(corridor(column));
        }
        for cx in 0..CELLS {
            for cy in 0..CELLS {
                let status = if level_number == LEVELS {
                    SlotStatus::Available
                } else {
                    SlotStatus::Occupied
                };
                level = level.with(MapElement::Slot(Slot {
                    point: GridPoint::new(cx * SPACING + 2, cy * SPACING + 1),
                    slot_id: format!("L{level_number}-{cx:02}{cy:02}"),
                    status,
                }));
            }
        }
        map = map.with_level(level);
    }
    map
}

static MAP: Lazy<MapDescription> = Lazy::new(generated_map);
static GRAPH: Lazy<Graph> = Lazy::new(|| build_graph(&MAP).expect("generated map builds"));

fn benchmark_pathfinding(c: &mut Criterion) {
    let graph = &*GRAPH;
    let far = CELLS * SPACING;

    c.bench_function("build_graph_generated", |b| {
        b.iter(|| {
            let graph = build_graph(&MAP).expect("generated map builds");
            black_box(graph.edge_count())
        });
    });

    c.bench_function("dijkstra_corner_to_top_level", |b| {
        let start = graph
            .node_id(&Coordinate::new(1, 0, 0))
            .expect("entrance exists");
        let goal = graph
            .node_id(&Coordinate::new(LEVELS, far / 2, far / 2))
            .expect("centre exists");
        b.iter(|| {
            let path = shortest_path(graph, start, goal).expect("route exists");
            black_box(path.distance)
        });
    });

    c.bench_function("plan_path_ad_hoc_endpoints", |b| {
        let request = PathRequest::new(
            Coordinate::new(1, 1, 3),
            Coordinate::new(LEVELS, far - 1, 3),
        );
        b.iter(|| {
            let plan = plan_path(graph, &request).expect("route exists");
            black_box(plan.hop_count())
        });
    });

    c.bench_function("nearest_slot_from_entrance", |b| {
        let request = SlotRequest::available(Coordinate::new(1, 0, 0));
        b.iter(|| {
            let assignment = find_nearest_slot(graph, &request).expect("slot exists");
            black_box(assignment.path.distance)
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
