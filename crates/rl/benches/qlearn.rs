use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rl::{AgentConfig, EpsilonGreedy, Observation, QTable};

fn bench_control_tick(c: &mut Criterion) {
    let config = AgentConfig::default();
    let discretizer = config.discretizer().unwrap();
    let policy = EpsilonGreedy::new(config.action_set().unwrap());
    let mut q = QTable::new(config.bucket_counts, config.actions.len());
    let mut rng = fastrand::Rng::with_seed(0);
    let observations: Vec<Observation> = (0..256)
        .map(|i| {
            let t = f64::from(i) * 0.05;
            Observation::new(t.sin() * 2.0, t.cos(), (t * 0.7).sin() * 0.3, t.cos() * 0.9)
        })
        .collect();

    c.bench_function("discretize_select_update", |b| {
        let mut i = 0;
        b.iter(|| {
            let s0 = discretizer.discretize(&observations[i % observations.len()]);
            let s1 = discretizer.discretize(&observations[(i + 1) % observations.len()]);
            let (action, _) = policy.select_action(&s0, &q, 0.1, &mut rng);
            black_box(q.update(&s0, action, 1.0, &s1, 0.1, config.discount));
            i += 1;
        });
    });
}

criterion_group!(benches, bench_control_tick);
criterion_main!(benches);
