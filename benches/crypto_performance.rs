//! Key core benchmarks: signing, verification and BIP32 derivation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ion_keys::{hardened, Engine, ExtendedPrivateKey, PrivateKey};
use sha2::{Digest, Sha256};

fn bench_signing(c: &mut Criterion) {
    let engine = Engine::new();
    let key = PrivateKey::from_slice(&[1u8; 32], true).expect("valid key");
    let hash: [u8; 32] = Sha256::digest(b"transfer 1.0 to 0x1234...").into();

    c.bench_function("sign_der", |b| {
        b.iter(|| key.sign(black_box(&engine), black_box(&hash)).expect("sign"))
    });
    c.bench_function("sign_compact", |b| {
        b.iter(|| key.sign_compact(black_box(&engine), black_box(&hash)).expect("sign"))
    });

    let pubkey = key.public_key(&engine);
    let sig = key.sign(&engine, &hash).expect("sign");
    c.bench_function("verify_der", |b| {
        b.iter(|| pubkey.verify(black_box(&engine), black_box(&hash), black_box(&sig)))
    });
}

fn bench_derivation(c: &mut Criterion) {
    let engine = Engine::new();
    let seed = [0x42u8; 64];

    c.bench_function("set_master", |b| {
        b.iter(|| ExtendedPrivateKey::set_master(black_box(&seed)).expect("master"))
    });

    let master = ExtendedPrivateKey::set_master(&seed).expect("master");
    c.bench_function("derive_hardened", |b| {
        b.iter(|| master.derive(black_box(&engine), black_box(hardened(0))).expect("derive"))
    });
    c.bench_function("derive_normal", |b| {
        b.iter(|| master.derive(black_box(&engine), black_box(0)).expect("derive"))
    });

    let xpub = master.neuter(&engine);
    c.bench_function("derive_public", |b| {
        b.iter(|| xpub.derive(black_box(&engine), black_box(0)).expect("derive"))
    });
}

criterion_group!(benches, bench_signing, bench_derivation);
criterion_main!(benches);
