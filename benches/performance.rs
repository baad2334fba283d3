//! Performance benchmarks for sift.
//!
//! Run with: cargo bench
//!
//! Target performance:
//! - Search over 1000 entries: < 1ms
//! - Catalog build from 200 desktop files: < 50ms

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sift::platform::linux::DesktopScanner;
use sift::services::icons::icon_key;
use sift::{filter, Application, Catalog, CatalogSource, IconResolver};

fn synthetic_apps(count: usize) -> Vec<Application> {
    (0..count)
        .map(|i| Application {
            name: format!("Application {} - Test Entry", i),
            exec: format!("/usr/bin/app-{} --flag", i),
            icon_name: None,
            icon_path: None,
            path: PathBuf::from(format!("/usr/share/applications/app-{}.desktop", i)),
        })
        .collect()
}

/// Benchmark ranking across query shapes.
fn bench_filter(c: &mut Criterion) {
    let apps = synthetic_apps(1000);
    let queries = ["app", "entry 50", "atst", "usrbin", "zzz"];

    let mut group = c.benchmark_group("filter");

    for query in queries {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, query| {
            b.iter(|| black_box(filter(&apps, black_box(query))))
        });
    }

    group.finish();
}

/// Benchmark icon key normalisation.
fn bench_icon_key(c: &mut Criterion) {
    let names = [
        "firefox",
        "org.gnome.Nautilus.SVG",
        "weird.png.svg.xpm",
        "/usr/share/pixmaps/app.png",
    ];

    let mut group = c.benchmark_group("icon_key");

    for name in names {
        group.bench_with_input(BenchmarkId::from_parameter(name), &name, |b, name| {
            b.iter(|| black_box(icon_key(black_box(name))))
        });
    }

    group.finish();
}

/// Benchmark a full catalog build over generated desktop files.
fn bench_catalog_build(c: &mut Criterion) {
    let dir = match tempfile::TempDir::new() {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let apps_dir = dir.path().join("applications");
    if fs::create_dir_all(&apps_dir).is_err() {
        return;
    }
    for i in 0..200 {
        let content = format!(
            "[Desktop Entry]\nType=Application\nName=App {}\nExec=app-{} %U\nIcon=app-{}\n",
            i, i, i
        );
        if fs::write(apps_dir.join(format!("app-{}.desktop", i)), content).is_err() {
            return;
        }
    }

    let icons = Arc::new(IconResolver::new(Vec::new()));
    let sources = vec![CatalogSource::DesktopEntries(DesktopScanner::new(
        vec![apps_dir],
        icons,
    ))];

    c.bench_function("catalog_build_200", |b| {
        b.iter(|| black_box(Catalog::build(&sources)))
    });
}

criterion_group!(benches, bench_filter, bench_icon_key, bench_catalog_build);

criterion_main!(benches);
