use proptest::prelude::*;
use rl::{Bound, Discretizer, Observation, QTable, RateSchedule};

fn single_dim(lower: f64, width: f64, count: usize) -> Discretizer {
    Discretizer::new(
        [
            Bound::new(lower, lower + width),
            Bound::symmetric(1.0),
            Bound::symmetric(1.0),
            Bound::symmetric(1.0),
        ],
        [count, 1, 1, 1],
    )
    .unwrap()
}

fn first_index(d: &Discretizer, x: f64) -> usize {
    d.discretize(&Observation::new(x, 0.0, 0.0, 0.0))[0]
}

proptest! {
    #[test]
    fn bucket_is_monotonic(
        lower in -100.0f64..100.0,
        width in 0.01f64..50.0,
        count in 1usize..20,
        a in -200.0f64..200.0,
        b in -200.0f64..200.0,
    ) {
        let d = single_dim(lower, width, count);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (i_lo, i_hi) = (first_index(&d, lo), first_index(&d, hi));
        prop_assert!(i_lo <= i_hi, "{} -> {}, {} -> {}", lo, i_lo, hi, i_hi);
        prop_assert!(i_hi < count);
    }

    #[test]
    fn bounds_hit_the_end_buckets(
        lower in -100.0f64..100.0,
        width in 0.01f64..50.0,
        count in 1usize..20,
    ) {
        let d = single_dim(lower, width, count);
        prop_assert_eq!(first_index(&d, lower), 0);
        prop_assert_eq!(first_index(&d, lower + width), count - 1);
    }

    #[test]
    fn rates_stay_within_their_ranges(episode in 0usize..10_000_000) {
        let s = RateSchedule::default();
        let (lr, er) = (s.learning_rate(episode), s.explore_rate(episode));
        prop_assert!((0.1..=0.5).contains(&lr));
        prop_assert!((0.01..=1.0).contains(&er));
        prop_assert!(s.learning_rate(episode + 1) <= lr);
        prop_assert!(s.explore_rate(episode + 1) <= er);
    }

    #[test]
    fn backup_moves_towards_target(
        current in -1000.0f64..1000.0,
        reward in -100.0f64..100.0,
        alpha in 0.0f64..=1.0,
    ) {
        let mut q = QTable::new([1, 1, 1, 1], 1);
        let s = [0; 4];
        q.set(&s, 0, current);
        // With gamma 0 the target is the reward itself.
        q.update(&s, 0, reward, &s, alpha, 0.0);
        let next = q.get(&s, 0);
        prop_assert!(next >= current.min(reward) - 1e-9);
        prop_assert!(next <= current.max(reward) + 1e-9);
        prop_assert!((reward - next).abs() <= (reward - current).abs() + 1e-9);
    }
}
