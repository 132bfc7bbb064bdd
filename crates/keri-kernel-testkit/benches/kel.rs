use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::json;

use keri_kernel::verify_credential;
use keri_kernel_core::{Blake3Hash, Kel};
use keri_kernel_testkit::fixtures::TestFixture;

fn bench_replay(c: &mut Criterion) {
    let mut fixture = TestFixture::with_seed(1);
    for i in 0u32..100 {
        if i % 10 == 9 {
            fixture.rotate();
        } else {
            fixture.interact(Blake3Hash::hash(&i.to_be_bytes()));
        }
    }
    let events = fixture.kel.events().to_vec();

    c.bench_function("kel_replay_101", |b| {
        b.iter_batched(
            || events.clone(),
            |events| Kel::replay(black_box(events)).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

fn bench_verify(c: &mut Criterion) {
    let mut fixture = TestFixture::with_seed(1);
    let signed = fixture.issue("bench", json!({"msg": "hi", "n": [1, 2, 3]}));
    fixture.rotate();
    let prefix = fixture.prefix();
    let log = fixture.tel.log(&signed.digest()).cloned();

    c.bench_function("credential_verify", |b| {
        b.iter(|| verify_credential(&prefix, &fixture.kel, log.as_ref(), black_box(&signed)));
    });
}

criterion_group!(benches, bench_replay, bench_verify);
criterion_main!(benches);
