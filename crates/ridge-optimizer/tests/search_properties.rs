//! End-to-end properties of the propose/evaluate loop.

use ridge_optimizer::{
    NeighborDistribution, Optimizer, OptimizerConfig, Position, ProposalStrategy,
    RandomRestartHillClimbing, SearchSpace, StrategyConfig, TabuSearch,
};

fn neg_square(p: &Position) -> f64 {
    -p.iter().map(|x| x * x).sum::<f64>()
}

/// Drive `opt` for `n_iterations` total evaluations, returning every proposed
/// position and score in order.
fn drive<S: ProposalStrategy>(
    opt: &mut Optimizer<S>,
    n_iterations: usize,
    objective: impl Fn(&Position) -> f64,
) -> Vec<(Position, f64)> {
    let mut trace = Vec::with_capacity(n_iterations);
    for i in 0..opt.n_initial() {
        let p = opt.init_pos(i).unwrap();
        let score = objective(&p);
        opt.evaluate(score).unwrap();
        trace.push((p, score));
    }
    for i in opt.n_initial()..n_iterations {
        let p = opt.iterate(i).unwrap();
        let score = objective(&p);
        opt.evaluate(score).unwrap();
        trace.push((p, score));
    }
    trace
}

fn plane() -> SearchSpace {
    SearchSpace::builder()
        .add_float("x", -10.0, 10.0)
        .add_int("k", -20, 20)
        .build()
        .unwrap()
}

#[test]
fn converges_on_negative_square() {
    for seed in 0..8 {
        let space = SearchSpace::from_bounds(&[(-10.0, 10.0)]).unwrap();
        let config = OptimizerConfig::new(StrategyConfig::HillClimbing)
            .with_initial_position([5.0])
            .with_step_scale(0.2)
            .with_seed(seed);
        let mut opt = Optimizer::from_config(space, config).unwrap();
        drive(&mut opt, 101, neg_square);

        let best = opt.finish().unwrap();
        assert!(best.score >= -1.0, "seed {seed}: best {}", best.score);
        assert!(best.score <= 0.0);
        assert!(best.position[0].abs() <= 1.0);
    }
}

#[test]
fn same_seed_same_trajectory() {
    let configs = [
        StrategyConfig::HillClimbing,
        StrategyConfig::random_restart(3),
        StrategyConfig::tabu(10),
    ];
    for strategy in configs {
        let config = OptimizerConfig::new(strategy.clone())
            .with_initial_position([3.0, 7.0])
            .with_random_init(2)
            .with_distribution(NeighborDistribution::Normal)
            .with_seed(42);

        let mut a = Optimizer::from_config(plane(), config.clone()).unwrap();
        let mut b = Optimizer::from_config(plane(), config).unwrap();
        let trace_a = drive(&mut a, 80, neg_square);
        let trace_b = drive(&mut b, 80, neg_square);

        assert_eq!(trace_a, trace_b, "{strategy:?} diverged");
        assert_eq!(a.best(), b.best());
        assert_ne!(a.run_id(), b.run_id());
    }
}

#[test]
fn different_seeds_explore_differently() {
    let run = |seed| {
        let config = OptimizerConfig::default()
            .with_initial_position([3.0, 7.0])
            .with_seed(seed);
        let mut opt = Optimizer::from_config(plane(), config).unwrap();
        drive(&mut opt, 20, neg_square)
    };
    assert_ne!(run(1), run(2));
}

/// Run 150 evaluations on a bumpy objective, checking after every one that
/// the best score never drops and equals the highest score seen.
fn assert_monotone_best<S: ProposalStrategy>(opt: &mut Optimizer<S>) {
    let objective = |p: &Position| -(p[0].sin() * 5.0 + p[1] * 0.1).abs();

    let mut last_best = f64::NEG_INFINITY;
    let mut max_seen = f64::NEG_INFINITY;
    for i in 0..opt.n_initial() {
        let p = opt.init_pos(i).unwrap();
        let score = objective(&p);
        opt.evaluate(score).unwrap();
        max_seen = max_seen.max(score);
    }
    for i in opt.n_initial()..150 {
        let p = opt.iterate(i).unwrap();
        assert!(opt.space().contains(&p));
        let score = objective(&p);
        opt.evaluate(score).unwrap();
        max_seen = max_seen.max(score);

        let best = opt.best().unwrap().score;
        assert!(best >= last_best);
        assert_eq!(best, max_seen);
        last_best = best;
    }
}

#[test]
fn best_is_monotone_and_matches_history() {
    let config = || OptimizerConfig::default().with_random_init(3).with_seed(9);

    for strategy in [StrategyConfig::HillClimbing, StrategyConfig::tabu(6)] {
        let mut opt = Optimizer::from_config(plane(), config().with_strategy(strategy)).unwrap();
        assert_monotone_best(&mut opt);
    }

    let mut opt = Optimizer::new(
        plane(),
        config().with_strategy(StrategyConfig::random_restart(5)),
        RandomRestartHillClimbing::new(5, 4),
    )
    .unwrap();
    assert_monotone_best(&mut opt);
    // Restarts jump to random points, so the best must survive them too.
    assert!(opt.strategy().restarts_done() > 0);
}

#[test]
fn hill_climbing_never_worsens_current() {
    let config = OptimizerConfig::new(StrategyConfig::HillClimbing)
        .with_initial_position([9.0, -18.0])
        .with_seed(5);
    let mut opt = Optimizer::from_config(plane(), config).unwrap();
    let p = opt.init_pos(0).unwrap();
    opt.evaluate(neg_square(&p)).unwrap();

    let mut current = opt.current().unwrap().score;
    for i in 1..200 {
        let p = opt.iterate(i).unwrap();
        let score = neg_square(&p);
        let verdict = opt.evaluate(score).unwrap();
        let now = opt.current().unwrap().score;
        assert!(now >= current);
        assert_eq!(verdict.accepted, score > current);
        current = now;
    }
}

#[test]
fn zero_restarts_and_zero_tabu_match_hill_climbing() {
    let base = OptimizerConfig::default()
        .with_initial_position([-4.0, 12.0])
        .with_random_init(1)
        .with_seed(77);
    let trace_of = |strategy: StrategyConfig| {
        let config = base.clone().with_strategy(strategy);
        let mut opt = Optimizer::from_config(plane(), config).unwrap();
        let trace = drive(&mut opt, 120, neg_square);
        (trace, opt.current().cloned(), opt.best().cloned())
    };

    let hill = trace_of(StrategyConfig::HillClimbing);
    assert_eq!(trace_of(StrategyConfig::random_restart(0)), hill);
    assert_eq!(trace_of(StrategyConfig::tabu(0)), hill);
}

#[test]
fn tabu_aspiration_accepts_revisit_beating_best() {
    // Two grid points. Once both are evaluated, every neighbor is tabu and
    // the search has to fall back to the least recently visited one.
    let space = SearchSpace::builder().add_int("bit", 0, 1).build().unwrap();
    let config = OptimizerConfig::new(StrategyConfig::tabu(5))
        .with_initial_position([1.0])
        .with_initial_position([0.0])
        .with_seed(11);
    let mut opt = Optimizer::new(space, config, TabuSearch::with_max_attempts(5, 64)).unwrap();

    opt.init_pos(0).unwrap();
    opt.evaluate(-1.0).unwrap();
    opt.init_pos(1).unwrap();
    opt.evaluate(0.0).unwrap();

    // A noisy objective re-scores the revisit above the global best.
    let revisit = opt.iterate(2).unwrap();
    assert_eq!(opt.strategy().fallbacks(), 1);
    let verdict = opt.evaluate(2.0).unwrap();
    assert!(verdict.accepted && verdict.new_best);
    assert_eq!(opt.current().unwrap().position, revisit);

    // A tabu revisit that does not beat the best is rejected.
    opt.iterate(3).unwrap();
    assert_eq!(opt.strategy().fallbacks(), 2);
    let verdict = opt.evaluate(1.5).unwrap();
    assert!(!verdict.accepted && !verdict.new_best);
    assert_eq!(opt.current().unwrap().score, 2.0);
}

#[test]
fn bounded_history_keeps_best() {
    let config = OptimizerConfig::new(StrategyConfig::tabu(4))
        .with_initial_position([0.0, 0.0])
        .with_max_history(4)
        .with_seed(3);
    let mut opt = Optimizer::from_config(plane(), config).unwrap();
    // The starting point is the global maximum and is evicted quickly.
    drive(&mut opt, 30, neg_square);

    assert_eq!(opt.memory().len(), 4);
    assert_eq!(opt.memory().total_recorded(), 30);
    let best = opt.best().unwrap();
    assert_eq!(best.position, Position::from([0.0, 0.0]));
    assert_eq!(best.iteration, 0);
}

#[test]
fn json_configured_run() {
    let config = OptimizerConfig::from_json(
        r#"{
            "step_scale": 0.05,
            "distribution": "normal",
            "strategy": { "type": "random_restart", "n_restarts": 2, "stagnation_threshold": 5 },
            "random_seed": 1234,
            "n_random_init": 4
        }"#,
    )
    .unwrap();
    let mut opt = Optimizer::from_config(plane(), config).unwrap();
    assert_eq!(opt.n_initial(), 4);
    assert_eq!(opt.seed(), 1234);
    let trace = drive(&mut opt, 60, neg_square);
    assert_eq!(trace.len(), 60);
    assert!(trace.iter().all(|(p, _)| opt.space().contains(p)));
}
