//! Criterion benchmarks for deck shuffling and hand evaluation.
//!
//! Run with:
//! ```bash
//! cargo bench --package blackjack-core --bench hand_bench
//! ```

use blackjack_core::{hand_value, Card, Deck, Round, Suit};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn cards(pairs: &[(u8, Suit)]) -> Vec<Card> {
    pairs
        .iter()
        .filter_map(|&(rank, suit)| Card::new(rank, suit))
        .collect()
}

fn bench_hand_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("hand_value");
    let hands = [
        ("hard_two", cards(&[(10, Suit::Hearts), (7, Suit::Clubs)])),
        ("soft_two", cards(&[(1, Suit::Hearts), (6, Suit::Clubs)])),
        (
            "four_aces_seven",
            cards(&[
                (1, Suit::Hearts),
                (1, Suit::Diamonds),
                (1, Suit::Clubs),
                (1, Suit::Spades),
                (7, Suit::Hearts),
            ]),
        ),
    ];
    for (name, hand) in &hands {
        group.bench_with_input(BenchmarkId::from_parameter(name), hand, |b, h| {
            b.iter(|| hand_value(black_box(h)))
        });
    }
    group.finish();
}

fn bench_shuffle_and_deal(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    c.bench_function("shuffle_and_deal", |b| {
        b.iter(|| Round::deal(Deck::shuffled_with(&mut rng)))
    });
}

criterion_group!(benches, bench_hand_value, bench_shuffle_and_deal);
criterion_main!(benches);
