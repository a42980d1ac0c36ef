use std::error::Error;

use cache_sim::config::Config;
use cache_sim::{curve, draw, Error as SimError, Simulator, TracingObserver};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load(Config::parse())?;

    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let keys = match config.load_keys() {
        Err(SimError::NoKeys) if config.reads_interactively() => {
            println!("No accesses provided. Exiting.");
            return Ok(());
        }
        result => result?,
    };
    let kinds = config.policy_kinds();
    info!(
        "running {} accesses through {} policies",
        keys.len(),
        kinds.len()
    );

    for &kind in &kinds {
        let mut sim = Simulator::new(config.capacity, kind);
        sim.run_observed(&keys, &mut TracingObserver);
        println!("\n{}", sim.report());
    }

    if let Some(max_capacity) = config.sweep {
        let results = curve::sweep(&keys, &kinds, max_capacity);
        for result in &results {
            let (capacity, ratio) = result
                .points
                .last()
                .copied()
                .unwrap_or((0.0, 1.0));
            println!(
                "{}: miss ratio {:.4} at capacity {}",
                result.label, ratio, capacity
            );
        }
        if let Some(path) = &config.csv {
            curve::write_csv(&results, path)?;
        }
        if let Some(path) = &config.plot {
            draw::draw_lines(&results, path)?;
        }
    }

    Ok(())
}
