//! Benchmarks for delta rendering performance.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use qd_renderer::{Registry, RenderOptions, render_delta};

/// Generate a delta with alternating paragraphs and bullet lists.
fn generate_delta(sections: usize, items_per_list: usize) -> String {
    let mut ops = Vec::with_capacity(sections * (items_per_list * 2 + 4));
    for i in 0..sections {
        ops.push(format!(r#"{{"insert":"Section {i} has "}}"#));
        ops.push(r#"{"insert":"bold","attributes":{"bold":true}}"#.to_owned());
        ops.push(
            r#"{"insert":" and mixed","attributes":{"bold":true,"italic":true,"color":"red"}}"#
                .to_owned(),
        );
        ops.push(r#"{"insert":" text.\n"}"#.to_owned());
        for j in 0..items_per_list {
            ops.push(format!(
                r#"{{"insert":"Item {j}","attributes":{{"underline":true}}}}"#
            ));
            ops.push(r#"{"insert":"\n","attributes":{"list":"bullet"}}"#.to_owned());
        }
    }
    format!("[{}]", ops.join(","))
}

fn bench_render_simple(c: &mut Criterion) {
    let delta = r#"[{"insert":"Hello "},{"insert":"world","attributes":{"bold":true}},{"insert":"\n"}]"#;
    let options = RenderOptions::default();

    c.bench_function("render_simple_delta", |b| {
        b.iter(|| render_delta(delta, &mut Registry::new(), &options));
    });
}

fn bench_render_varying_sizes(c: &mut Criterion) {
    let options = RenderOptions::default();
    let mut group = c.benchmark_group("render_by_size");

    for (sections, items) in [(5, 2), (20, 5), (100, 10)] {
        let delta = generate_delta(sections, items);
        group.throughput(Throughput::Bytes(delta.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("delta", format!("{sections}s_{items}i")),
            &delta,
            |b, delta| {
                let mut registry = Registry::new();
                b.iter(|| render_delta(delta, &mut registry, &options));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_render_simple, bench_render_varying_sizes);
criterion_main!(benches);
