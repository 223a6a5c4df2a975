//! # S/Kademlia Overlay Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Routing | XOR distance, table update, k-closest lookup |
//! | Identity | Static + dynamic puzzle check |
//! | Channel | AES-256-GCM seal/open per frame size |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::time::Duration;

use skad_crypto::{SecretKey, SessionCipher, AEAD_NONCE_LENGTH};
use skad_overlay::{
    xor_distance, NodeId, OverlayConfig, PeerId, PuzzleCheck, PuzzleValidator, RoutingTable,
};

fn random_peer(rng: &mut impl Rng, i: usize) -> PeerId {
    let mut key = vec![0u8; 32];
    rng.fill(&mut key[..]);
    PeerId::new(key, format!("10.{}.{}.1:4000", (i >> 8) & 0xFF, i & 0xFF))
}

// ============================================================================
// Routing
// ============================================================================

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    group.measurement_time(Duration::from_secs(5));
    let mut rng = rand::thread_rng();

    let a = NodeId::new(rng.gen());
    let b = NodeId::new(rng.gen());
    group.bench_function("xor_distance", |bench| {
        bench.iter(|| black_box(xor_distance(&a, &b)))
    });

    for size in [100usize, 1_000, 5_000] {
        let config = OverlayConfig::default();
        let mut table = RoutingTable::with_config(random_peer(&mut rng, 0), &config);
        for i in 1..=size {
            let _ = table.update(random_peer(&mut rng, i));
        }
        let target = NodeId::new(rng.gen());

        group.throughput(Throughput::Elements(table.peer_count() as u64));
        group.bench_with_input(BenchmarkId::new("find_closest", size), &table, |bench, t| {
            bench.iter(|| black_box(t.find_closest_peers(&target, config.k)))
        });
    }

    let peers: Vec<PeerId> = (0..1_000).map(|i| random_peer(&mut rng, i)).collect();
    group.bench_function("update_1000", |bench| {
        bench.iter(|| {
            let me = random_peer(&mut rand::thread_rng(), 0);
            let mut table = RoutingTable::with_config(me, &OverlayConfig::default());
            for peer in &peers {
                let _ = table.update(peer.clone());
            }
            black_box(table.peer_count())
        })
    });

    group.finish();
}

// ============================================================================
// Identity puzzles
// ============================================================================

fn bench_puzzle(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let peer = random_peer(&mut rng, 1).with_nonce(vec![0x5A; 32]);
    let validator = PuzzleValidator::new(0, 0);

    c.bench_function("puzzle_check", |bench| {
        bench.iter(|| black_box(validator.verify_puzzle(&peer)))
    });
}

// ============================================================================
// Channel
// ============================================================================

fn bench_channel(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel");
    let cipher = SessionCipher::new(&SecretKey::derive_from_shared_secret(&[7u8; 32])).unwrap();
    let nonce = [0u8; AEAD_NONCE_LENGTH];

    for size in [64usize, 1_024, 16 * 1_024] {
        let body = vec![0xABu8; size];
        let sealed = cipher.seal(&nonce, &body).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("seal", size), &body, |bench, body| {
            bench.iter(|| black_box(cipher.seal(&nonce, body)))
        });
        group.bench_with_input(BenchmarkId::new("open", size), &sealed, |bench, sealed| {
            bench.iter(|| black_box(cipher.open(&nonce, sealed)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_routing, bench_puzzle, bench_channel);
criterion_main!(benches);
