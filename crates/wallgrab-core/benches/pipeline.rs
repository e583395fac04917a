//! Benchmarks for the per-task CPU stages.
//!
//! Run with: cargo bench -p wallgrab-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat as EncodeFormat};
use std::io::Cursor;
use wallgrab_core::config::{CategoryConfig, FilterConfig};
use wallgrab_core::pipeline::{resolve_filename, Categorizer, RuleEvaluator, Validator};
use wallgrab_core::types::{DownloadTask, HintMetadata, ImageFormat, ImageMetadata};

fn encoded(format: EncodeFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(1920, 1080)
        .write_to(&mut out, format)
        .expect("encode fixture");
    out.into_inner()
}

fn sample_meta() -> ImageMetadata {
    ImageMetadata {
        url: "https://images.example.com/walls/2024/aurora-over-fjord.jpg".to_string(),
        width: 3840,
        height: 2160,
        byte_size: 4_200_000,
        format: ImageFormat::Jpeg,
        hints: HintMetadata::from_parts("Aurora over the fjord", "northern lights", ""),
    }
}

fn benchmark_validate(c: &mut Criterion) {
    let png = encoded(EncodeFormat::Png);
    let jpeg = encoded(EncodeFormat::Jpeg);
    let task = DownloadTask::new("https://example.com/a");

    c.bench_function("validate_png_header", |b| {
        b.iter(|| {
            let _ = Validator::validate(black_box(&png), &task);
        })
    });
    c.bench_function("validate_jpeg_header", |b| {
        b.iter(|| {
            let _ = Validator::validate(black_box(&jpeg), &task);
        })
    });
}

fn benchmark_rules(c: &mut Criterion) {
    let evaluator = RuleEvaluator::new(FilterConfig::default());
    let meta = sample_meta();

    c.bench_function("rule_evaluate", |b| {
        b.iter(|| evaluator.evaluate(black_box(&meta)))
    });
}

fn benchmark_categorize(c: &mut Criterion) {
    let categorizer = Categorizer::new(&CategoryConfig::default(), true);
    let hit = sample_meta();
    let mut miss = sample_meta();
    miss.url = "https://images.example.com/IMG_0001.jpg".to_string();
    miss.hints = HintMetadata::default();

    c.bench_function("categorize_first_match", |b| {
        b.iter(|| categorizer.categorize(black_box(&hit)))
    });
    c.bench_function("categorize_no_match", |b| {
        b.iter(|| categorizer.categorize(black_box(&miss)))
    });
}

fn benchmark_filename(c: &mut Criterion) {
    let bytes = vec![0x5Au8; 4 * 1024 * 1024];
    let url = "https://images.example.com/walls/2024/aurora-over-fjord.jpg";

    c.bench_function("resolve_filename_4mb", |b| {
        b.iter(|| resolve_filename(black_box(url), None, black_box(&bytes), ImageFormat::Jpeg))
    });
}

criterion_group!(
    benches,
    benchmark_validate,
    benchmark_rules,
    benchmark_categorize,
    benchmark_filename,
);

criterion_main!(benches);
