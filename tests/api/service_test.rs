/*!
 * Memory Service Tests
 * Request dispatch, validation and initialization preconditions
 */

use memsim_kernel::api::{ApiError, MemoryResponse, MemoryService, Reply, Request};
use pretty_assertions::assert_eq;

fn memory(reply: Reply) -> MemoryResponse {
    match reply {
        Reply::Memory(response) => response,
        other => panic!("expected memory reply, got {:?}", other),
    }
}

fn allocate(name: &str, size: usize, use_buddy: bool) -> Request {
    Request::Allocate {
        process_name: name.to_string(),
        size,
        use_buddy,
    }
}

#[test]
fn test_uninitialized_service_rejects_operations() {
    let service = MemoryService::new();
    assert!(!service.is_initialized());

    for request in [
        allocate("A", 64, true),
        Request::Deallocate {
            process_name: "A".to_string(),
        },
        Request::Compact,
        Request::Status,
        Request::Reset { total_memory: None },
    ] {
        let err = service.handle(request).unwrap_err();
        assert!(matches!(err, ApiError::FailedPrecondition(_)));
        assert_eq!(err.kind(), "failed_precondition");
    }

    // Nothing was created implicitly
    assert!(!service.is_initialized());
    assert!(service.snapshot().is_none());
}

#[test]
fn test_health_and_info_need_no_memory() {
    let service = MemoryService::new();

    match service.handle(Request::Health).unwrap() {
        Reply::Health(health) => {
            assert_eq!(health.status, "healthy");
            assert!(!health.memory_initialized);
        }
        other => panic!("expected health reply, got {:?}", other),
    }

    match service.handle(Request::Info).unwrap() {
        Reply::Info(info) => assert!(info.operations.contains(&"compact".to_string())),
        other => panic!("expected info reply, got {:?}", other),
    }
}

#[test]
fn test_full_session() {
    let service = MemoryService::new();

    let init = memory(service.handle(Request::Initialize { total_memory: 1024 }).unwrap());
    assert!(init.success);
    assert_eq!(init.message, "Memory initialized with 1024 KB");
    assert_eq!(init.status.free_memory, 1024);

    let a = memory(service.handle(allocate("A", 256, false)).unwrap());
    assert_eq!(a.start_address, Some(0));
    let b = memory(service.handle(allocate("B", 256, false)).unwrap());
    assert_eq!(b.start_address, Some(256));

    let freed = memory(
        service
            .handle(Request::Deallocate {
                process_name: "A".to_string(),
            })
            .unwrap(),
    );
    assert!(freed.success);
    assert_eq!(freed.status.used_memory, 256);

    let too_big = memory(service.handle(allocate("C", 800, false)).unwrap());
    assert!(!too_big.success);
    assert!(too_big.message.contains("Try compaction"));

    let compacted = memory(service.handle(Request::Compact).unwrap());
    assert!(compacted.success);
    assert_eq!(compacted.moved_processes, Some(1));
    assert_eq!(compacted.status.blocks[0].process_name.as_deref(), Some("B"));
    assert_eq!(compacted.status.fragmentation_ratio, 0.0);

    let reset = memory(
        service
            .handle(Request::Reset {
                total_memory: Some(4096),
            })
            .unwrap(),
    );
    assert!(reset.success);
    assert_eq!(reset.status.total_memory, 4096);
    assert_eq!(reset.status.active_processes, 0);
}

#[test]
fn test_validation_rejects_bad_requests() {
    let service = MemoryService::with_capacity(1024).unwrap();

    for request in [
        Request::Initialize { total_memory: 0 },
        Request::Reset {
            total_memory: Some(0),
        },
        allocate("A", 0, false),
        allocate("", 64, false),
        Request::Deallocate {
            process_name: String::new(),
        },
    ] {
        let err = service.handle(request).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)), "got {:?}", err);
    }

    assert_eq!(service.snapshot().unwrap().total_memory, 1024);
}

#[test]
fn test_whitespace_name_is_a_valid_process() {
    let service = MemoryService::with_capacity(256).unwrap();

    let response = memory(service.handle(allocate(" ", 32, false)).unwrap());
    assert!(response.success);
    assert_eq!(response.status.blocks[0].process_name.as_deref(), Some(" "));

    let freed = memory(
        service
            .handle(Request::Deallocate {
                process_name: " ".to_string(),
            })
            .unwrap(),
    );
    assert!(freed.success);
}

#[test]
fn test_clones_share_one_engine() {
    let service = MemoryService::with_capacity(512).unwrap();
    let other = service.clone();

    service.handle(allocate("shared", 128, true)).unwrap();
    assert_eq!(other.snapshot().unwrap().used_memory, 128);
}
