use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stylex_bundle_core::compiler::VersionedCompiler;
use stylex_bundle_core::registry::StyleRegistry;
use stylex_bundle_core::rules::{PriorityMerger, RuleRecord};

fn registry_with(modules: usize, rules_per_module: usize) -> StyleRegistry {
    let mut registry = StyleRegistry::new();
    for m in 0..modules {
        let rules = (0..rules_per_module)
            .map(|r| {
                let class_name = format!("x{m}r{r}");
                let css = format!(".{class_name}{{margin:{r}px}}");
                RuleRecord::new(class_name, css, (3000 + (r % 4) * 1000) as f64)
            })
            .collect();
        registry.set(&format!("/src/module{m}.tsx"), rules);
    }
    registry
}

fn bench_compile_hit(c: &mut Criterion) {
    let registry = registry_with(200, 20);
    let mut compiler = VersionedCompiler::new();
    compiler.compile(&registry, &PriorityMerger, true).unwrap();

    c.bench_function("compile_cache_hit", |b| {
        b.iter(|| black_box(compiler.compile(black_box(&registry), &PriorityMerger, true).unwrap()))
    });
}

fn bench_compile_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_cache_miss");
    for modules in [10, 100, 500] {
        let registry = registry_with(modules, 20);
        group.bench_with_input(BenchmarkId::from_parameter(modules), &registry, |b, registry| {
            b.iter(|| {
                let mut compiler = VersionedCompiler::new();
                black_box(compiler.compile(registry, &PriorityMerger, true).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile_hit, bench_compile_miss);
criterion_main!(benches);
