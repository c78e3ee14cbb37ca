//! Integration tests for the process memory handle.
//!
//! These drive the full open/validate/read/close lifecycle against the mock
//! backend; unit tests for the individual seams live next to the code.

use memlink_core::backend::mock::{MockBackend, MockProcess};
use memlink_core::{
    ConnectorConfig, Error, ProcessMemory, ProcessStatus, ReadMemory, WriteMemory,
};

const GAME_BASE: u64 = 0x140000000;

fn game_process() -> MockProcess {
    MockProcess::new()
        .module("game.exe", GAME_BASE, 0x1000)
        .image_with_signature(GAME_BASE, 0x1000)
}

fn live_backend() -> MockBackend {
    MockBackend::new().process("game.exe", game_process())
}

fn handle_for(backend: MockBackend) -> ProcessMemory<MockBackend> {
    ProcessMemory::new(backend, ConnectorConfig::default())
}

mod open_tests {
    use super::*;

    #[test]
    fn test_open_live_process() {
        let mut handle = handle_for(live_backend());

        handle.open("game.exe").unwrap();

        assert_eq!(handle.status(), ProcessStatus::FoundReady);
        assert_eq!(handle.base_address(), GAME_BASE);
        assert_eq!(handle.read_u16(GAME_BASE).unwrap(), 0x5A4D);
    }

    #[test]
    fn test_open_missing_process() {
        let mut handle = handle_for(live_backend());

        let result = handle.open("ghost.exe");

        assert!(matches!(result, Err(Error::ProcessNotFound(_))));
        assert_eq!(handle.status(), ProcessStatus::NotFound);
        assert_eq!(handle.base_address(), 0);
        assert!(matches!(handle.read_u16(GAME_BASE), Err(Error::NotReady)));
    }

    #[test]
    fn test_open_unreachable_backend() {
        let backend = MockBackend::new()
            .process("game.exe", game_process())
            .fail_connector();
        let mut handle = handle_for(backend);

        let result = handle.open("game.exe");

        assert!(matches!(result, Err(Error::BackendUnavailable(_))));
        assert_eq!(handle.status(), ProcessStatus::FoundNoAccess);
        // No partially-initialized state left behind
        assert_eq!(handle.base_address(), 0);
        assert!(matches!(handle.read_u16(GAME_BASE), Err(Error::NotReady)));
    }

    #[test]
    fn test_open_os_build_failure() {
        let backend = MockBackend::new()
            .process("game.exe", game_process())
            .fail_os();
        let mut handle = handle_for(backend);

        let result = handle.open("game.exe");

        assert!(matches!(result, Err(Error::OsInitFailed(_))));
        assert_eq!(handle.status(), ProcessStatus::FoundNoAccess);
    }

    #[test]
    fn test_open_clone_failure() {
        let backend = live_backend();
        let mut handle = handle_for(backend.clone());

        handle.open("game.exe").unwrap();
        backend.set_fail_clone(true);

        let result = handle.open("game.exe");

        assert!(matches!(result, Err(Error::OsCloneFailed(_))));
        assert_eq!(handle.status(), ProcessStatus::FoundNoAccess);
        assert_eq!(handle.base_address(), 0);
    }

    #[test]
    fn test_open_process_without_module() {
        // Running process whose module list does not contain its own name
        let backend = MockBackend::new().process(
            "game.exe",
            MockProcess::new()
                .module("other.dll", 0x7FF000000000, 0x1000)
                .image_with_signature(GAME_BASE, 0x1000),
        );
        let mut handle = handle_for(backend);

        let result = handle.open("game.exe");

        assert!(matches!(result, Err(Error::ModuleNotFound(_))));
        assert_eq!(handle.status(), ProcessStatus::FoundNoAccess);
        assert!(matches!(handle.read_u16(GAME_BASE), Err(Error::NotReady)));
    }

    #[test]
    fn test_open_accessor_failure() {
        let backend = MockBackend::new().process(
            "game.exe",
            MockProcess::new()
                .module("game.exe", GAME_BASE, 0x1000)
                .image_with_signature(GAME_BASE, 0x1000)
                .fail_virtual_memory(),
        );
        let mut handle = handle_for(backend);

        let result = handle.open("game.exe");

        assert!(matches!(result, Err(Error::MemoryAccessorFailed(_))));
        assert_eq!(handle.status(), ProcessStatus::FoundNoAccess);
        assert_eq!(handle.base_address(), 0);
    }

    #[test]
    fn test_reopen_after_process_restart() {
        let backend = live_backend();
        let mut handle = handle_for(backend.clone());

        handle.open("game.exe").unwrap();

        backend.remove_process("game.exe");
        handle.close();
        assert!(matches!(
            handle.open("game.exe"),
            Err(Error::ProcessNotFound(_))
        ));
        assert_eq!(handle.status(), ProcessStatus::NotFound);

        backend.add_process("game.exe", game_process());
        handle.open("game.exe").unwrap();
        assert_eq!(handle.status(), ProcessStatus::FoundReady);
        assert_eq!(handle.base_address(), GAME_BASE);
    }
}

mod close_tests {
    use super::*;

    #[test]
    fn test_close_resets_process_state() {
        let mut handle = handle_for(live_backend());
        handle.open("game.exe").unwrap();

        handle.close();

        assert_eq!(handle.base_address(), 0);
        assert!(matches!(handle.read_u16(GAME_BASE), Err(Error::NotReady)));
        // close() itself does not change the status
        assert_eq!(handle.status(), ProcessStatus::FoundReady);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut handle = handle_for(live_backend());
        handle.open("game.exe").unwrap();

        handle.close();
        handle.close();

        assert_eq!(handle.base_address(), 0);
    }

    #[test]
    fn test_close_before_open_is_noop() {
        let mut handle = handle_for(live_backend());
        handle.close();
        assert_eq!(handle.status(), ProcessStatus::NotFound);
        assert_eq!(handle.base_address(), 0);
    }
}

mod liveness_tests {
    use super::*;

    #[test]
    fn test_liveness_while_running() {
        let mut handle = handle_for(live_backend());
        handle.open("game.exe").unwrap();

        assert_eq!(handle.check_liveness(), ProcessStatus::FoundReady);
        assert_eq!(handle.base_address(), GAME_BASE);
    }

    #[test]
    fn test_liveness_detects_replaced_image() {
        let process = game_process();
        let image = process.image_handle();
        let backend = MockBackend::new().process("game.exe", process);
        let mut handle = handle_for(backend);

        handle.open("game.exe").unwrap();

        // Address space reused by something without the executable header
        image.lock().unwrap()[..2].copy_from_slice(&[0, 0]);

        assert_eq!(handle.check_liveness(), ProcessStatus::FoundNoAccess);
        assert_eq!(handle.status(), ProcessStatus::FoundNoAccess);
        // check_liveness performs close()'s reset
        assert_eq!(handle.base_address(), 0);
        assert!(matches!(handle.read_u16(GAME_BASE), Err(Error::NotReady)));
    }

    #[test]
    fn test_liveness_detects_unreadable_image() {
        let process = game_process();
        let image = process.image_handle();
        let backend = MockBackend::new().process("game.exe", process);
        let mut handle = handle_for(backend);

        handle.open("game.exe").unwrap();

        // Image unmapped entirely: the signature read fails
        image.lock().unwrap().clear();

        assert_eq!(handle.check_liveness(), ProcessStatus::FoundNoAccess);
        assert_eq!(handle.base_address(), 0);
    }

    #[test]
    fn test_liveness_noop_unless_ready() {
        let mut handle = handle_for(live_backend());

        assert_eq!(handle.check_liveness(), ProcessStatus::NotFound);

        let _ = handle.open("ghost.exe");
        assert_eq!(handle.check_liveness(), ProcessStatus::NotFound);
    }
}

mod module_address_tests {
    use super::*;

    fn backend_with_client() -> MockBackend {
        MockBackend::new()
            .process("game.exe", game_process())
            .process(
                "client.exe",
                MockProcess::new()
                    .module("client.exe", 0x150000000, 0x2000)
                    .module("engine.dll", 0x7FFA00000000, 0x4000),
            )
    }

    #[test]
    fn test_module_address_in_other_process() {
        let mut handle = handle_for(backend_with_client());
        handle.open("game.exe").unwrap();

        let address = handle.module_address("client.exe", "engine.dll").unwrap();
        assert_eq!(address, 0x7FFA00000000);

        // Primary state untouched
        assert_eq!(handle.status(), ProcessStatus::FoundReady);
        assert_eq!(handle.base_address(), GAME_BASE);
        assert_eq!(handle.read_u16(GAME_BASE).unwrap(), 0x5A4D);
    }

    #[test]
    fn test_module_address_without_prior_open() {
        let handle = handle_for(backend_with_client());

        let result = handle.module_address("client.exe", "engine.dll");
        assert!(matches!(result, Err(Error::OsInitFailed(_))));
    }

    #[test]
    fn test_module_address_missing_process_keeps_primary_state() {
        let mut handle = handle_for(backend_with_client());
        handle.open("game.exe").unwrap();

        let result = handle.module_address("ghost.exe", "engine.dll");

        assert!(matches!(result, Err(Error::ProcessNotFound(_))));
        assert_eq!(handle.status(), ProcessStatus::FoundReady);
        assert_eq!(handle.base_address(), GAME_BASE);
    }

    #[test]
    fn test_module_address_missing_module() {
        let mut handle = handle_for(backend_with_client());
        handle.open("game.exe").unwrap();

        let result = handle.module_address("client.exe", "missing.dll");

        assert!(matches!(result, Err(Error::ModuleNotFound(_))));
        assert_eq!(handle.status(), ProcessStatus::FoundReady);
    }

    #[test]
    fn test_module_address_clone_failure() {
        let backend = backend_with_client();
        let mut handle = handle_for(backend.clone());
        handle.open("game.exe").unwrap();

        backend.set_fail_clone(true);
        let result = handle.module_address("client.exe", "engine.dll");

        assert!(matches!(result, Err(Error::OsCloneFailed(_))));
        assert_eq!(handle.status(), ProcessStatus::FoundReady);
    }
}

mod memory_access_tests {
    use super::*;

    #[test]
    fn test_typed_reads_through_handle() {
        let process = game_process();
        let image = process.image_handle();
        {
            let mut image = image.lock().unwrap();
            image[0x10..0x14].copy_from_slice(&0x12345678u32.to_le_bytes());
            image[0x18..0x20].copy_from_slice(&(-99i64).to_le_bytes());
        }
        let backend = MockBackend::new().process("game.exe", process);
        let mut handle = handle_for(backend);
        handle.open("game.exe").unwrap();

        assert_eq!(handle.read_u32(GAME_BASE + 0x10).unwrap(), 0x12345678);
        assert_eq!(handle.read_i64(GAME_BASE + 0x18).unwrap(), -99);
    }

    #[test]
    fn test_write_then_read_back() {
        let mut handle = handle_for(live_backend());
        handle.open("game.exe").unwrap();

        handle.write_u32(GAME_BASE + 0x100, 0xCAFEBABE).unwrap();
        assert_eq!(handle.read_u32(GAME_BASE + 0x100).unwrap(), 0xCAFEBABE);
    }

    #[test]
    fn test_write_not_ready() {
        let mut handle = handle_for(live_backend());
        let result = handle.write_u32(GAME_BASE, 1);
        assert!(matches!(result, Err(Error::NotReady)));
    }

    #[test]
    fn test_read_out_of_image_bounds() {
        let mut handle = handle_for(live_backend());
        handle.open("game.exe").unwrap();

        let result = handle.read_u32(GAME_BASE + 0x10000);
        assert!(matches!(result, Err(Error::MemoryReadFailed { .. })));
        // A failed read is not a liveness decision; the handle stays ready
        assert_eq!(handle.status(), ProcessStatus::FoundReady);
    }
}
