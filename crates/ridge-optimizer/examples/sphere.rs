//! Maximize a shifted negative sphere with each strategy, then once in batch mode.
//!
//! Run with `RUST_LOG=ridge_optimizer=debug` to see every proposal.

use anyhow::Result;
use rayon::prelude::*;
use ridge_optimizer::{
    BatchOptimizer, Optimizer, OptimizerConfig, Position, SearchSpace, StrategyConfig,
};
use tracing_subscriber::EnvFilter;

const N_ITERATIONS: usize = 300;

fn objective(p: &Position) -> f64 {
    // Peak of 0 at (1.5, -2, 3).
    let target = [1.5, -2.0, 3.0];
    -p.iter()
        .zip(target)
        .map(|(x, t)| (x - t).powi(2))
        .sum::<f64>()
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ridge_optimizer=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let space = SearchSpace::builder()
        .add_float("x", -10.0, 10.0)
        .add_int("y", -10, 10)
        .add_stepped("z", 0.0, 5.0, 0.25)
        .build()?;

    println!("Ridge sphere example");
    for strategy in [
        StrategyConfig::HillClimbing,
        StrategyConfig::random_restart(5),
        StrategyConfig::tabu(25),
    ] {
        let config = OptimizerConfig::new(strategy.clone())
            .with_initial_position([-8.0, 9.0, 0.0])
            .with_random_init(2)
            .with_seed(2024);
        let mut opt = Optimizer::from_config(space.clone(), config)?;

        for i in 0..opt.n_initial() {
            let p = opt.init_pos(i)?;
            opt.evaluate(objective(&p))?;
        }
        for i in opt.n_initial()..N_ITERATIONS {
            let p = opt.iterate(i)?;
            opt.evaluate(objective(&p))?;
        }

        if let Some(best) = opt.finish() {
            println!(
                "{:<40} best {:>10.4} at {} (iteration {})",
                format!("{strategy:?}"),
                best.score,
                best.position,
                best.iteration
            );
        }
    }

    let config = OptimizerConfig::new(StrategyConfig::tabu(25))
        .with_random_init(8)
        .with_seed(2024);
    let batch = BatchOptimizer::from_config(space, config)?;
    while batch.iteration() < N_ITERATIONS {
        let candidates = batch.ask(8)?;
        candidates
            .par_iter()
            .try_for_each(|(id, p)| batch.tell(*id, objective(p)).map(|_| ()))?;
    }
    if let Some(best) = batch.finish() {
        println!(
            "{:<40} best {:>10.4} at {} (iteration {})",
            "batch tabu", best.score, best.position, best.iteration
        );
    }

    Ok(())
}
