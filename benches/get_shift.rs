use criterion::{criterion_group, criterion_main, Criterion};
use ostn15::{errors::BuildError, GridNode, GridReference, GridStore, Lattice, ShiftInterpolator};

fn build_store(columns: i32, rows: i32) -> Result<GridStore, BuildError>
{
    // full lattice block, with a ragged "coastline" of missing nodes
    let nodes = (0..rows).flat_map(|y| (0..columns).filter(move |x| x + y < columns + rows / 2).map(move |x|
    {
        let (fx, fy) = (x as f64, y as f64);
        GridNode::new(x, y, (90.0 + 0.01 * fx, -80.0 + 0.02 * fy, 45.0 + 0.001 * fx * fy))
    }));
    GridStore::from_nodes(Lattice::OSTN15, nodes)
}

fn queries(count: usize) -> Vec<GridReference>
{
    (0..count).map(|i| GridReference::new(123.457 * i as f64 % 300_000.0, 371.111 * i as f64 % 300_000.0)).collect()
}

fn run_lookup(c: &mut Criterion)
{
    let store = build_store(300, 300).unwrap();
    c.bench_function("lookup", |b| b.iter(|| store.lookup(150, 120)));
}

fn run_get_shift(c: &mut Criterion)
{
    let store = build_store(300, 300).unwrap();
    let interpolator = ShiftInterpolator::new(&store);
    let x = queries(1000);
    c.bench_function("get_shift x1000", |b| b.iter(|| x.iter().filter_map(|r| interpolator.get_shift_at(*r).ok()).count()));
    c.bench_function("get_shifts x1000", |b| b.iter(|| interpolator.get_shifts(&x)));
}

fn run_build(c: &mut Criterion)
{
    c.bench_function("build 100x100", |b| b.iter(|| build_store(100, 100).unwrap()));
}

criterion_group!(benches, run_lookup, run_get_shift, run_build);
criterion_main!(benches);
