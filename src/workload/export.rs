/*!
 * Workload Export
 * CSV time series, text reports and memory maps
 */

use super::analysis::PerformanceMetrics;
use super::simulation::SimulationStats;
use crate::memory::MemoryManager;
use std::fmt::Write as _;
use std::io;

/// Write one CSV row per recorded step for each labelled run
///
/// Columns: `policy,operation,used_memory,free_memory,fragmentation,blocks_count`.
/// A run with series of unequal length is cut to the shortest one.
pub fn write_csv<W: io::Write>(mut writer: W, runs: &[(&str, &SimulationStats)]) -> io::Result<()> {
    writeln!(writer, "policy,operation,used_memory,free_memory,fragmentation,blocks_count")?;
    for (label, stats) in runs {
        let rows = stats
            .used_memory
            .iter()
            .zip(&stats.free_memory)
            .zip(&stats.fragmentation)
            .zip(&stats.blocks_count);
        for (step, (((used, free), fragmentation), blocks)) in rows.enumerate() {
            writeln!(
                writer,
                "{},{},{},{},{:.2},{}",
                label, step, used, free, fragmentation, blocks
            )?;
        }
    }
    writer.flush()
}

/// Human-readable summary of one run
pub fn render_report(title: &str, metrics: &PerformanceMetrics) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Memory Usage:");
    let _ = writeln!(out, "  Average Used Memory:    {:.2} KB", metrics.average_used_memory);
    let _ = writeln!(out, "  Average Free Memory:    {:.2} KB", metrics.average_free_memory);
    let _ = writeln!(out, "Fragmentation:");
    let _ = writeln!(out, "  Average Fragmentation:  {:.2}%", metrics.average_fragmentation);
    let _ = writeln!(out, "  Maximum Fragmentation:  {:.2}%", metrics.max_fragmentation);
    let _ = writeln!(out, "  Average Block Count:    {:.2}", metrics.average_blocks);
    let _ = writeln!(out, "Operations:");
    let _ = writeln!(out, "  Total Operations:       {}", metrics.total_operations);
    let _ = writeln!(out, "  Successful Allocations: {}", metrics.successful_allocations);
    let _ = writeln!(out, "  Failed Allocations:     {}", metrics.failed_allocations);
    let _ = writeln!(out, "  Deallocations:          {}", metrics.deallocations);
    let _ = writeln!(out, "  Compactions:            {}", metrics.compactions);
    let _ = writeln!(out, "  Success Rate:           {:.2}%", metrics.allocation_success_rate);
    let _ = writeln!(out, "{}", rule);
    out
}

/// Draw the block layout as a bar of `width` cells plus a legend
///
/// Allocated cells use the first letter of the owning process, free cells
/// use `.`. Every block gets at least one cell so small blocks stay visible;
/// the bar can therefore exceed `width` slightly for very fragmented layouts.
pub fn render_memory_map(manager: &MemoryManager, width: usize) -> String {
    let width = width.max(1);
    let total = manager.total_memory().max(1);
    let mut bar = String::with_capacity(width + 2);
    let mut legend = String::new();

    bar.push('|');
    for block in manager.blocks() {
        let cells = ((block.size as u128 * width as u128 / total as u128) as usize).max(1);
        let glyph = match &block.process_name {
            Some(name) if !block.is_free => name.chars().next().unwrap_or('#'),
            _ => '.',
        };
        bar.extend(std::iter::repeat(glyph).take(cells));

        let owner = block.process_name.as_deref().unwrap_or("FREE");
        let _ = writeln!(
            legend,
            "  [{:>6} - {:>6}) {:>6} KB  {}",
            block.start,
            block.end(),
            block.size,
            owner
        );
    }
    bar.push('|');

    format!("{}\n{}", bar, legend)
}
