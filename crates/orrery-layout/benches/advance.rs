use criterion::{Criterion, black_box, criterion_group, criterion_main};
use orrery_core::{FileEntry, LayoutConfig, RawEdge, Viewport, build};
use orrery_layout::{Forces, Simulation, advance};

fn world_of(count: usize) -> orrery_layout::World {
    let files: Vec<FileEntry> = (0..count)
        .map(|i| FileEntry::file(format!("mod{}/file{i:03}.ts", i % 12)))
        .collect();
    let edges: Vec<RawEdge> = (1..count)
        .map(|i| RawEdge::import(files[i].path.clone(), files[i / 2].path.clone()))
        .collect();
    let graph = build(&files, &edges, 300).graph;
    Simulation::new(&graph, LayoutConfig::default(), Viewport::default())
        .world()
        .clone()
}

fn bench_advance(c: &mut Criterion) {
    let forces = Forces::default();
    for count in [50, 280] {
        let world = world_of(count);
        c.bench_function(&format!("advance_{count}"), |b| {
            b.iter(|| advance(black_box(&world), &forces, 1.0))
        });
    }
}

criterion_group!(benches, bench_advance);
criterion_main!(benches);
