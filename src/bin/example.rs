use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use tourney::{OrderPolicy, QueryKind, Session, StrategyKind, Verdict};

fn main() {
    println!("tourney: human-in-the-loop tournament ranking");
    println!("=============================================\n");

    bracket_example();

    strategy_comparison();
}

/// A scripted stand-in for the human: holds hidden per-item appeal scores
/// and answers every query kind from them, with a little noise.
fn make_oracle(
    appeal: HashMap<String, f64>,
    noise: f64,
    seed: u64,
) -> impl FnMut(&[String], QueryKind) -> Verdict<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    move |group: &[String], kind: QueryKind| {
        let fuzzed: Vec<f64> = group
            .iter()
            .map(|item| appeal[item] + rng.gen_range(-noise..=noise))
            .collect();
        match kind {
            QueryKind::SingleWinner => {
                let best = (0..group.len())
                    .max_by(|&a, &b| fuzzed[a].partial_cmp(&fuzzed[b]).unwrap())
                    .unwrap();
                Verdict::Winner(group[best].clone())
            }
            QueryKind::TotalOrder => {
                let mut order: Vec<usize> = (0..group.len()).collect();
                order.sort_by(|&a, &b| fuzzed[b].partial_cmp(&fuzzed[a]).unwrap());
                Verdict::Order(order.into_iter().map(|i| group[i].clone()).collect())
            }
            QueryKind::NumericRating => Verdict::Ratings(fuzzed),
        }
    }
}

fn photo_set(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("photos/img_{:03}.jpg", i)).collect()
}

fn bracket_example() {
    println!("Bracket Example:");
    println!("---------------");

    let items = photo_set(6);
    let mut appeal = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        appeal.insert(item.clone(), i as f64);
    }

    let mut session = Session::new(
        items,
        StrategyKind::Bracket,
        OrderPolicy::Randomized { seed: 17 },
    )
    .unwrap();

    println!(
        "Ranking {} photos, about {} questions to answer",
        session.items().len(),
        session.estimated_remaining_queries()
    );

    let mut oracle = make_oracle(appeal, 0.0, 17);
    session.run(&mut oracle).unwrap();

    let standings = session.finalize().unwrap();
    println!("\nWinner: {}", standings.winner().item);
    println!("Standings:");
    for (i, ranked) in standings.rankings.iter().enumerate() {
        println!("  {}. {} ({:.0})", i + 1, ranked.item, ranked.score);
    }
    println!();
}

fn strategy_comparison() {
    println!("Strategy Comparison (16 photos, noisy judge):");
    println!("--------------------------------------------");

    let items = photo_set(16);
    let mut appeal = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        appeal.insert(item.clone(), i as f64);
    }

    let strategies = [
        ("bracket", StrategyKind::Bracket),
        ("round-robin", StrategyKind::RoundRobin),
        ("partition", StrategyKind::Partition(Default::default())),
        ("comparator-sort", StrategyKind::ComparatorSort),
    ];

    println!("{:<16} | {:>7} | winner", "strategy", "queries");
    println!("-----------------+---------+----------------------");
    for (name, kind) in strategies {
        let mut session =
            Session::new(items.clone(), kind, OrderPolicy::Randomized { seed: 3 }).unwrap();
        let mut oracle = make_oracle(appeal.clone(), 0.5, 3);
        session.run(&mut oracle).unwrap();
        let standings = session.finalize().unwrap();
        println!(
            "{:<16} | {:>7} | {}",
            name,
            session.queries_asked(),
            standings.winner().item
        );
    }
}
