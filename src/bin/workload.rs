/*!
 * Workload Driver
 *
 * Generates a seeded random workload and replays it against two fresh
 * memory managers, one rounding requests up to powers of two and one not.
 *
 * Usage: workload [operations] [capacity] [seed] [csv_path]
 */

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

use memsim_kernel::core::limits::{
    DEFAULT_WORKLOAD_CAPACITY, DEFAULT_WORKLOAD_OPERATIONS, DEFAULT_WORKLOAD_SEED,
};
use memsim_kernel::workload::{
    compare_policies, render_memory_map, render_report, simulate, write_csv, WorkloadGenerator,
};
use memsim_kernel::{init_tracing, MemoryManager};

const MAP_WIDTH: usize = 64;

fn arg_or<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid argument #{}: '{}'", index, raw)),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let operations: usize = arg_or(&args, 1, DEFAULT_WORKLOAD_OPERATIONS)?;
    let capacity: usize = arg_or(&args, 2, DEFAULT_WORKLOAD_CAPACITY)?;
    let seed: u64 = arg_or(&args, 3, DEFAULT_WORKLOAD_SEED)?;
    let csv_path = args.get(4);

    info!(operations, capacity, seed, "Generating workload");
    let workload = WorkloadGenerator::new(seed).generate(operations);

    let comparison = compare_policies(&workload, capacity)
        .with_context(|| format!("cannot simulate on capacity {}", capacity))?;

    println!(
        "{}",
        render_report("WITH POWER-OF-TWO ROUNDING", &comparison.with_rounding.metrics)
    );
    println!(
        "{}",
        render_report("WITHOUT ROUNDING", &comparison.without_rounding.metrics)
    );

    let with = &comparison.with_rounding.metrics;
    let without = &comparison.without_rounding.metrics;
    println!(
        "Fragmentation difference: {:+.2}%",
        with.average_fragmentation - without.average_fragmentation
    );
    println!(
        "Success rate difference:  {:+.2}%",
        with.allocation_success_rate - without.allocation_success_rate
    );

    // Final layouts, replayed so the maps reflect the end of each run
    for use_rounding in [true, false] {
        let mut manager = MemoryManager::with_capacity(capacity)?;
        simulate(&mut manager, &workload, use_rounding);
        println!();
        println!("Final layout (rounding: {}):", use_rounding);
        print!("{}", render_memory_map(&manager, MAP_WIDTH));
    }

    if let Some(path) = csv_path {
        let file = File::create(path).with_context(|| format!("cannot create {}", path))?;
        write_csv(
            BufWriter::new(file),
            &[
                ("rounding", &comparison.with_rounding.stats),
                ("no_rounding", &comparison.without_rounding.stats),
            ],
        )
        .with_context(|| format!("cannot write {}", path))?;
        info!(path = %path, "Time series exported");

        let summary_path = format!("{}.json", path.trim_end_matches(".csv"));
        let summary = serde_json::to_string_pretty(&comparison).context("cannot encode summary")?;
        std::fs::write(&summary_path, summary)
            .with_context(|| format!("cannot write {}", summary_path))?;
        info!(path = %summary_path, "Summary exported");
    }

    Ok(())
}
