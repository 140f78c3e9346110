use criterion::{Criterion, criterion_group, criterion_main};
use std::fs;
use std::hint::black_box;
use walkcache::cache::{CacheRoot, CompiledCache};
use walkcache::decode::{Decoder, DescriptorDecoder};
use walkcache::storage::LocalStorage;

fn descriptor(keys: usize) -> String {
    let body: Vec<String> = (0..keys)
        .map(|i| format!(r#""key_{i}":{{"name":"service {i}","port":{i},"tags":["a","b"]}}"#))
        .collect();
    format!("{{{}}}", body.join(","))
}

fn benchmark_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("services.json");
    fs::write(&source, descriptor(500)).unwrap();
    let source = source.to_string_lossy().into_owned();

    let cache = CompiledCache::new(
        LocalStorage::new(),
        DescriptorDecoder,
        CacheRoot::new(dir.path().join("cache").to_string_lossy()),
    );
    cache.load(&source).unwrap();

    let mut group = c.benchmark_group("descriptor_load");

    group.bench_function("artifact_hit", |b| {
        b.iter(|| cache.load(black_box(&source)).unwrap());
    });

    let raw = fs::read(&source).unwrap();
    group.bench_function("decode_only", |b| {
        b.iter(|| DescriptorDecoder.decode(&source, black_box(&raw)).unwrap());
    });

    group.bench_function("invalidate_and_compile", |b| {
        b.iter(|| {
            cache.invalidate(&source).unwrap();
            cache.load(black_box(&source)).unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_load);
criterion_main!(benches);
