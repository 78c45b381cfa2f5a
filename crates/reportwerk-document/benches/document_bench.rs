// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the reportwerk-document crate: document assembly
// alone and the full assemble-render pass for a multi-page table.

use std::io::Cursor;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{ImageFormat, Rgb, RgbImage};

use reportwerk_core::{FooterFields, HeaderFields, LayoutConfig, TableData};
use reportwerk_document::{NoopObserver, ReportAssembler, ReportGenerator};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn cover_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(640, 360, Rgb([20, 90, 160]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode fixture");
    bytes
}

/// 500 rows across six columns, one of them long enough to need soft breaks.
fn sample_table() -> TableData {
    let mut rows = vec![
        ["Timestamp", "Sensor", "Reading", "Unit", "Status", "Notes"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
    ];
    for i in 0..500 {
        rows.push(vec![
            format!("2024-01-{:02} 12:{:02}", i % 28 + 1, i % 60),
            format!("probe-{}", i % 12),
            format!("{:.2}", i as f32 * 0.37),
            "kPa".to_string(),
            if i % 9 == 0 { "WARN" } else { "OK" }.to_string(),
            "calibration drift observed after maintenance window".to_string(),
        ]);
    }
    TableData::new(rows)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_assemble(c: &mut Criterion) {
    let image = cover_png();
    let table = sample_table();
    let header = HeaderFields::default();
    let footer = FooterFields::page_numbers();
    let config = LayoutConfig::default();

    c.bench_function("assemble (500 rows)", |b| {
        b.iter(|| {
            let document = ReportAssembler::new(&config, &NoopObserver)
                .assemble(black_box(&image), black_box(&table), &header, &footer)
                .expect("assemble");
            black_box(document);
        });
    });
}

fn bench_generate(c: &mut Criterion) {
    let image = cover_png();
    let table = sample_table();
    let header = HeaderFields::default();
    let footer = FooterFields::page_numbers();
    let generator = ReportGenerator::new(LayoutConfig::default());

    c.bench_function("generate pdf (500 rows)", |b| {
        b.iter(|| {
            let report = generator
                .generate(black_box(&image), black_box(&table), &header, &footer)
                .expect("generate");
            black_box(report.bytes);
        });
    });
}

criterion_group!(benches, bench_assemble, bench_generate);
criterion_main!(benches);
