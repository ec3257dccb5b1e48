use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use aesni_core::{decrypt, encrypt, AesKey, Backend};

fn available_backends() -> impl Iterator<Item = Backend> {
    Backend::ALL
        .into_iter()
        .filter(|backend| backend.is_available())
}

fn bench_key_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_schedule");
    let raw = [0x2bu8; 16];
    for backend in available_backends() {
        group.bench_function(BenchmarkId::from_parameter(backend), |b| {
            b.iter(|| AesKey::create_with_backend(&raw, backend).unwrap());
        });
    }
    group.finish();
}

fn bench_cbc(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
    let mut raw = [0u8; 16];
    let mut iv = [0u8; 16];
    rng.fill_bytes(&mut raw);
    rng.fill_bytes(&mut iv);
    let mut plaintext = vec![0u8; 16 * 1024];
    rng.fill_bytes(&mut plaintext);

    let mut group = c.benchmark_group("cbc");
    group.throughput(Throughput::Bytes(plaintext.len() as u64));
    for backend in available_backends() {
        let key = AesKey::create_with_backend(&raw, backend).unwrap();
        let mut ciphertext = vec![0u8; plaintext.len()];
        group.bench_function(BenchmarkId::new("encrypt", backend), |b| {
            b.iter(|| encrypt(&plaintext, &mut ciphertext, &key, &iv).unwrap());
        });

        let mut recovered = vec![0u8; plaintext.len()];
        group.bench_function(BenchmarkId::new("decrypt", backend), |b| {
            b.iter(|| decrypt(&mut recovered, &ciphertext, &key, &iv).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_key_schedule, bench_cbc);
criterion_main!(benches);
