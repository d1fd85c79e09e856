use agrolens_core::ContentKey;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_derive_photo_sized(c: &mut Criterion) {
    // Roughly a compressed phone photo
    let photo: Vec<u8> = (0..3 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

    c.bench_function("content_key_3mb", |b| {
        b.iter(|| ContentKey::derive(black_box(&photo)));
    });
}

fn bench_derive_thumbnail(c: &mut Criterion) {
    let thumb: Vec<u8> = (0..32 * 1024).map(|i| (i % 251) as u8).collect();

    c.bench_function("content_key_32kb", |b| {
        b.iter(|| ContentKey::derive(black_box(&thumb)));
    });
}

criterion_group!(benches, bench_derive_photo_sized, bench_derive_thumbnail);
criterion_main!(benches);
