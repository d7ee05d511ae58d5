//! Benchmark for mesh parsing throughput.
//!
//! TARGET: the full park catalog parses in well under one frame budget.
//!
//! Run with: cargo bench --package parkview_assets --bench parse_benchmark

use std::fmt::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use parkview_assets::{FaceMode, MaterialLibrary, MeshParser};

const MTL: &str = "# bench

newmtl Bark
Ns 96.078431
Ka 1.000000 1.000000 1.000000
Kd 0.300000 0.180000 0.080000
Ks 0.500000 0.500000 0.500000
illum 2

newmtl Leaves
Ns 20.000000
Ka 1.000000 1.000000 1.000000
Kd 0.100000 0.600000 0.150000
Ks 0.100000 0.100000 0.100000
illum 2
";

/// A `side x side` grid of quads, alternating materials per row.
fn grid_mesh(side: usize) -> String {
    let mut out = String::from("o Grid\n");
    for z in 0..=side {
        for x in 0..=side {
            let _ = writeln!(out, "v {x}.0 0.0 {z}.0");
        }
    }
    out.push_str("vt 0.0 0.0\nvt 1.0 0.0\nvt 1.0 1.0\nvt 0.0 1.0\nvn 0.0 1.0 0.0\n");

    let row = side + 1;
    for z in 0..side {
        out.push_str(if z % 2 == 0 { "usemtl Bark\n" } else { "usemtl Leaves\n" });
        for x in 0..side {
            let a = z * row + x + 1;
            let b = a + 1;
            let c = b + row;
            let d = a + row;
            let _ = writeln!(out, "f {a}/1/1 {b}/2/1 {c}/3/1 {d}/4/1");
        }
    }
    out
}

fn benchmark_material_library(c: &mut Criterion) {
    c.bench_function("material_library_parse", |b| {
        b.iter(|| black_box(MaterialLibrary::parse(black_box(MTL))));
    });
}

fn benchmark_mesh(c: &mut Criterion) {
    let library = MaterialLibrary::parse(MTL).expect("bench library parses");
    let mesh = grid_mesh(100);

    let mut group = c.benchmark_group("mesh_parse");
    group.throughput(Throughput::Bytes(mesh.len() as u64));

    for mode in [FaceMode::FirstTriangle, FaceMode::Fan] {
        let parser = MeshParser::new().with_face_mode(mode);
        group.bench_function(format!("{mode:?}"), |b| {
            b.iter(|| black_box(parser.parse("grid.obj", black_box(&mesh), &library)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_material_library, benchmark_mesh);
criterion_main!(benches);
