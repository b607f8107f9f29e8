//! `ProcessGateway` against a provider that never answers.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::time::{Duration, Instant};

use daymark_core::provider::ProcessGateway;
use daymark_core::{CalendarGateway, DaymarkError};

#[tokio::test]
async fn slow_provider_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let stub = dir.path().join("daymark-provider-sleepy");
    std::fs::write(&stub, "#!/bin/sh\nsleep 30\n").unwrap();
    std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

    let path = std::env::var_os("PATH").unwrap_or_default();
    let search = std::iter::once(dir.path().to_path_buf()).chain(std::env::split_paths(&path));
    // SAFETY: the only test in this binary, set before anything is spawned
    unsafe { std::env::set_var("PATH", std::env::join_paths(search).unwrap()) };

    let gateway = ProcessGateway::from_name("sleepy").with_timeout(Duration::from_millis(300));
    let started = Instant::now();
    let result = gateway.request_access().await;

    match result {
        Err(DaymarkError::ProviderTimeout(after)) => assert_eq!(after, Duration::from_millis(300)),
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(10));
}
