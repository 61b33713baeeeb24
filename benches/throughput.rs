use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use matchlog::{
    config::{MatchConfig, MatchInfo},
    core::aggregate::Match,
    event::{EventDraft, EventPatch, ShotOutcome},
    roster::Team,
    types::SportVariant,
};

const OUTCOMES: [ShotOutcome; 4] = [
    ShotOutcome::Point,
    ShotOutcome::Wide,
    ShotOutcome::Goal,
    ShotOutcome::TwoPointer,
];

fn running_match() -> Match {
    let info = MatchInfo::new(Team::new(1, "Home"), Team::new(2, "Away"), 0);
    let config = MatchConfig {
        variant: SportVariant::Football,
        ..MatchConfig::default()
    };
    let mut m = Match::new(1, info, config);
    m.start_period_at(0).expect("start");
    m
}

fn filled_match(n: u64) -> Match {
    let mut m = running_match();
    for i in 0..n {
        // Several events share each second so ties are exercised.
        let draft = EventDraft::shot(1 + i % 2, OUTCOMES[(i % 4) as usize]);
        let _ = m.record_at(draft, (i / 3) * 1000).expect("record");
    }
    m
}

fn bench_records(c: &mut Criterion) {
    c.bench_function("match_record_10k", |b| {
        b.iter(|| filled_match(10_000));
    });
}

fn bench_edits(c: &mut Criterion) {
    c.bench_function("match_edit_5k", |b| {
        b.iter(|| {
            let mut m = filled_match(5_000);
            let ids: Vec<u64> = m.log().iter().skip(1).map(|e| e.id).collect();
            for id in ids {
                m.edit(
                    id,
                    &EventPatch {
                        shot_outcome: Some(ShotOutcome::Point),
                        ..EventPatch::default()
                    },
                )
                .expect("edit");
            }
        });
    });
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_queries");
    for n in [100u64, 1_000, 10_000] {
        let m = filled_match(n);
        group.bench_with_input(BenchmarkId::new("chronological", n), &m, |b, m| {
            b.iter(|| m.chronological().count());
        });
        group.bench_with_input(BenchmarkId::new("score", n), &m, |b, m| {
            b.iter(|| m.score(1));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_records, bench_edits, bench_queries);
criterion_main!(benches);
