/*!
 * Memory Manager Tests
 * Best-fit selection, failure atomicity and reporting
 */

use memsim_kernel::memory::{
    rounded_request_size, Allocator, MemoryEngine, MemoryError, MemoryInfo, MemoryManager,
    MemoryPressure,
};
use pretty_assertions::assert_eq;

/// Manager with free holes of the given sizes separated by 16-unit spacers
fn with_holes(holes: &[usize]) -> MemoryManager {
    let total: usize = holes.iter().map(|h| h + 16).sum();
    let mut mgr = MemoryManager::with_capacity(total).unwrap();
    for (i, hole) in holes.iter().enumerate() {
        mgr.allocate(&format!("hole{}", i), *hole, false).unwrap();
        mgr.allocate(&format!("spacer{}", i), 16, false).unwrap();
    }
    for i in 0..holes.len() {
        mgr.deallocate(&format!("hole{}", i)).unwrap();
    }
    mgr
}

#[test]
fn test_default_capacity() {
    let mgr = MemoryManager::new();
    assert_eq!(mgr.info(), (1024, 0, 1024));
    assert_eq!(mgr.blocks().len(), 1);
}

#[test]
fn test_zero_capacity_rejected() {
    assert_eq!(
        MemoryManager::with_capacity(0).unwrap_err(),
        MemoryError::InvalidCapacity(0)
    );
}

#[test]
fn test_rounding_rule() {
    assert_eq!(rounded_request_size(0, true), Some(1));
    assert_eq!(rounded_request_size(1, true), Some(1));
    assert_eq!(rounded_request_size(100, true), Some(128));
    assert_eq!(rounded_request_size(128, true), Some(128));
    assert_eq!(rounded_request_size(129, true), Some(256));
    assert_eq!(rounded_request_size(100, false), Some(100));
    assert_eq!(rounded_request_size(0, false), Some(0));
    assert_eq!(rounded_request_size(usize::MAX, true), None);
}

#[test]
fn test_best_fit_picks_smallest_hole() {
    let mut mgr = with_holes(&[300, 100, 200]);
    let expected = mgr.blocks().iter().find(|b| b.is_free && b.size == 200).unwrap().start;

    assert_eq!(mgr.allocate("X", 150, false), Ok(expected));
}

#[test]
fn test_best_fit_tie_goes_to_lowest_address() {
    let mut mgr = with_holes(&[64, 128, 64]);
    let first_small = mgr.blocks().iter().find(|b| b.is_free && b.size == 64).unwrap().start;

    assert_eq!(mgr.find_best_fit(64).map(|i| mgr.blocks()[i].start), Some(first_small));
    assert_eq!(mgr.allocate("X", 64, false), Ok(first_small));
    assert_eq!(first_small, 0);
}

#[test]
fn test_find_best_fit_none_when_too_large() {
    let mgr = with_holes(&[64, 64]);
    assert_eq!(mgr.find_best_fit(65), None);
}

#[test]
fn test_failed_calls_leave_state_unchanged() {
    let mut mgr = with_holes(&[64, 128]);
    mgr.allocate("A", 32, false).unwrap();
    let before = mgr.clone();
    let status_before = mgr.status();

    assert_eq!(
        mgr.allocate("A", 16, false),
        Err(MemoryError::DuplicateProcess("A".to_string()))
    );
    assert_eq!(mgr, before);

    assert_eq!(
        mgr.deallocate("ghost"),
        Err(MemoryError::ProcessNotFound("ghost".to_string()))
    );
    assert_eq!(mgr, before);

    assert!(mgr.allocate("B", 10_000, false).is_err());
    assert_eq!(mgr.allocate("", 16, false), Err(MemoryError::InvalidProcessName));
    assert_eq!(mgr.allocate("C", 0, false), Err(MemoryError::InvalidSize(0)));
    assert_eq!(mgr.reset(Some(0)), Err(MemoryError::InvalidCapacity(0)));
    assert_eq!(mgr, before);
    assert_eq!(mgr.status(), status_before);
}

#[test]
fn test_double_deallocate_fails_cleanly() {
    let mut mgr = MemoryManager::with_capacity(256).unwrap();
    mgr.allocate("A", 64, false).unwrap();
    mgr.deallocate("A").unwrap();
    let after_first = mgr.clone();

    assert!(matches!(mgr.deallocate("A"), Err(MemoryError::ProcessNotFound(_))));
    assert_eq!(mgr, after_first);
    assert_eq!(mgr.blocks().len(), 1);
}

#[test]
fn test_allocate_then_deallocate_restores_layout() {
    let mut mgr = with_holes(&[64, 256, 128]);
    let before = mgr.blocks().to_vec();

    mgr.allocate("tmp", 100, false).unwrap();
    mgr.deallocate("tmp").unwrap();

    assert_eq!(mgr.blocks(), before.as_slice());
    mgr.check_invariants().unwrap();
}

#[test]
fn test_coalesce_merges_both_neighbours() {
    let mut mgr = MemoryManager::with_capacity(300).unwrap();
    mgr.allocate("A", 100, false).unwrap();
    mgr.allocate("B", 100, false).unwrap();
    mgr.allocate("C", 100, false).unwrap();
    mgr.deallocate("A").unwrap();
    mgr.deallocate("C").unwrap();
    assert_eq!(mgr.blocks().len(), 3);

    mgr.deallocate("B").unwrap();
    assert_eq!(mgr.blocks().len(), 1);
    assert!(mgr.blocks()[0].is_free);
    assert_eq!(mgr.blocks()[0].size, 300);
}

#[test]
fn test_compact_preserves_process_order() {
    let mut mgr = MemoryManager::with_capacity(1024).unwrap();
    for name in ["A", "B", "C", "D"] {
        mgr.allocate(name, 100, false).unwrap();
    }
    mgr.deallocate("A").unwrap();
    mgr.deallocate("C").unwrap();

    assert_eq!(mgr.compact(), Ok(2));
    assert_eq!(mgr.processes(), vec!["B", "D"]);
    assert_eq!(mgr.block_of("B").unwrap().start, 0);
    assert_eq!(mgr.block_of("D").unwrap().start, 100);
    assert_eq!(mgr.free_block_count(), 1);
    assert_eq!(mgr.fragmentation_ratio(), 0.0);
}

#[test]
fn test_compact_on_empty_memory() {
    let mut mgr = MemoryManager::with_capacity(64).unwrap();
    assert_eq!(mgr.compact(), Err(MemoryError::NothingToCompact));
}

#[test]
fn test_compact_already_compact_layout_succeeds() {
    let mut mgr = MemoryManager::with_capacity(64).unwrap();
    mgr.allocate("A", 16, false).unwrap();
    let before = mgr.clone();
    assert_eq!(mgr.compact(), Ok(1));
    assert_eq!(mgr, before);
}

#[test]
fn test_fragmentation_formula() {
    // Blocks: free 64, spacer, free 128, spacer -> 4 blocks, 2 free
    let mgr = with_holes(&[64, 128]);
    assert_eq!(mgr.blocks().len(), 4);
    assert_eq!(mgr.fragmentation_ratio(), 0.25);
    assert_eq!(mgr.status().fragmentation, 25.0);
}

#[test]
fn test_status_snapshot() {
    let mut mgr = MemoryManager::with_capacity(1024).unwrap();
    mgr.allocate("shell", 64, false).unwrap();

    let status = mgr.status();
    assert_eq!(status.total_memory, 1024);
    assert_eq!(status.used_memory, 64);
    assert_eq!(status.free_memory, 960);
    assert_eq!(status.active_processes, 1);
    assert_eq!(status.blocks.len(), 2);
    assert_eq!(status.blocks[0].end, 64);
    assert_eq!(status.blocks[0].process_name.as_deref(), Some("shell"));
    assert!(status.blocks[1].is_free);
}

#[test]
fn test_stats_and_pressure() {
    let mut mgr = MemoryManager::with_capacity(128).unwrap();
    assert_eq!(mgr.stats().memory_pressure(), MemoryPressure::Low);

    mgr.allocate("A", 112, false).unwrap();
    let stats = mgr.stats();
    assert_eq!(stats.allocated_blocks, 1);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.largest_free_block, 16);
    assert_eq!(stats.usage_percentage, 87.5);
    assert_eq!(stats.memory_pressure(), MemoryPressure::High);
    assert_eq!(mgr.pressure(), MemoryPressure::High);
}

fn churn<E: MemoryEngine>(engine: &mut E) -> (usize, usize, usize) {
    engine.allocate("a", 100, true).unwrap();
    engine.allocate("b", 50, false).unwrap();
    engine.deallocate("a").unwrap();
    engine.compact().unwrap();
    engine.info()
}

#[test]
fn test_engine_traits() {
    let mut mgr = MemoryManager::with_capacity(512).unwrap();
    assert_eq!(churn(&mut mgr), (512, 50, 462));
    assert!(mgr.is_allocated("b"));
    assert_eq!(mgr.block_size("b"), Some(50));

    MemoryEngine::reset(&mut mgr, None).unwrap();
    assert_eq!(mgr.info(), (512, 0, 512));
}
