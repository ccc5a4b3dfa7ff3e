//! Benchmarks the matcher and the parallel driver over a synthetic source
//! tree, isolating per-item match cost from end-to-end throughput.

use criterion::{criterion_group, criterion_main, Criterion};

use pare::{for_each_match, IterSource, Matcher, MatcherOptions, OptionsBuilder};

const DIRS: &[&str] = &["src", "include", "tests", "drivers/net", "fs/ext4", "arch/x86/kernel"];
const STEMS: &[&str] = &["matcher", "scheduler", "allocator", "parser", "socket", "buffer", "signal"];
const EXTS: &[&str] = &["c", "h", "rs"];

fn corpus() -> Vec<String> {
    let mut items = Vec::new();
    for dir in DIRS {
        for stem in STEMS {
            for ext in EXTS {
                for i in 0..40 {
                    items.push(format!("{dir}/{stem}_{i}.{ext}"));
                }
            }
        }
    }
    items
}

fn bench_matcher(c: &mut Criterion) {
    let items = corpus();
    let matcher = Matcher::new(b"sched", &MatcherOptions::default());

    c.bench_function("match_item", |b| {
        b.iter(|| {
            let mut count = 0u64;
            for item in &items {
                if matcher.match_item(item.as_bytes()).is_some() {
                    count += 1;
                }
            }
            count
        });
    });
}

fn bench_driver(c: &mut Criterion) {
    let items = corpus();

    for threads in [1usize, 4] {
        let opts = OptionsBuilder::default()
            .limit(10)
            .nr_threads(threads)
            .build()
            .expect("static options");
        c.bench_function(&format!("for_each_match_{threads}_threads"), |b| {
            b.iter(|| {
                let source = IterSource::new(items.clone());
                let mut count = 0u64;
                for_each_match(b"sched", &opts, &source, |_: String, _| count += 1)
                    .expect("matching failed");
                count
            });
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_matcher, bench_driver
);
criterion_main!(benches);
