mod common;

use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::time::Duration;

use common::{CONFIG_DIR, Harness, count, drain, router_properties, wait_until};
use routervisor::{
    Config, EngineError, EventKind, LifecycleState, NetworkState, Properties, SupervisorError,
};

#[tokio::test(start_paused = true)]
async fn start_is_idempotent() {
    let h = Harness::new();
    let mut rx = h.sup.subscribe();

    h.sup.start().unwrap();
    h.sup.start().unwrap();
    assert!(h.sup.is_started());
    assert_eq!(h.engines.created(), 1);

    h.engine().mark_alive();
    wait_until(|| h.sup.state() == LifecycleState::Running).await;

    let events = drain(&mut rx);
    assert_eq!(count(&events, EventKind::StartRequested, None), 1);
    assert_eq!(count(&events, EventKind::TaskStarting, Some("readiness")), 1);
    assert_eq!(count(&events, EventKind::TaskStarting, Some("engine-run")), 1);
    assert_eq!(h.proxies.created(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_start_creates_one_engine() {
    const CALLERS: usize = 8;

    for _ in 0..20 {
        let h = Harness::new();
        let barrier = Arc::new(Barrier::new(CALLERS));
        let results: Vec<_> = std::thread::scope(|s| {
            let callers: Vec<_> = (0..CALLERS)
                .map(|_| {
                    let barrier = Arc::clone(&barrier);
                    let sup = &h.sup;
                    s.spawn(move || {
                        barrier.wait();
                        sup.start()
                    })
                })
                .collect();
            callers.into_iter().map(|c| c.join().unwrap()).collect()
        });

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(h.engines.created(), 1);
        assert!(h.sup.is_started());
        h.sup.stop();
    }
}

#[tokio::test(start_paused = true)]
async fn stop_before_start_is_a_noop() {
    let h = Harness::new();
    let mut rx = h.sup.subscribe();

    h.sup.stop();

    assert!(!h.sup.is_started());
    assert_eq!(h.sup.state(), LifecycleState::Stopped);
    assert_eq!(h.engines.created(), 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn full_lifecycle() {
    let h = Harness::new();
    h.sup.start().unwrap();
    assert_eq!(h.sup.state(), LifecycleState::Starting);

    h.engine().mark_alive();
    wait_until(|| h.sup.state() == LifecycleState::Running).await;
    assert_eq!(
        h.proxies.dirs(),
        vec![PathBuf::from(CONFIG_DIR).join("tunnel")]
    );
    assert!(h.sup.tunnel_proxy().is_some());

    h.sup.stop();
    assert!(!h.sup.is_started());
    assert!(h.proxies.proxy().is_stopped());
    assert!(h.engine().shutdown_requested());
    assert!(h.sup.tunnel_proxy().is_none());

    wait_until(|| h.sup.state() == LifecycleState::Stopped).await;

    h.sup.stop();
    assert!(matches!(h.sup.start(), Err(SupervisorError::AlreadyStopped)));
    assert_eq!(h.engines.created(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_supervisor_stops_the_engine() {
    let Harness {
        sup,
        engines,
        proxies,
    } = Harness::new();
    sup.start().unwrap();
    engines.engine().mark_alive();
    wait_until(|| sup.state() == LifecycleState::Running).await;

    drop(sup);
    assert!(proxies.proxy().is_stopped());
    assert!(engines.engine().shutdown_requested());
}

#[tokio::test(start_paused = true)]
async fn finished_tasks_leave_the_active_list() {
    let cfg = Config {
        stop_on_signal: false,
        debounce_window: Duration::from_millis(200),
        bus_capacity: 16,
        ..Config::default()
    };
    let h = Harness::with_config(cfg, router_properties());
    h.sup.start().unwrap();
    h.engine().mark_alive();
    wait_until(|| h.sup.state() == LifecycleState::Running).await;

    for kbps in 1..=3000 {
        h.sup.request_bandwidth_update(kbps).unwrap();
    }
    assert_eq!(h.sup.active_tasks().len(), 3002);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.sup.active_tasks(), vec!["engine-run", "tunnel-proxy"]);
    assert_eq!(h.engine().saves().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn readiness_logs_each_pending_check() {
    let h = Harness::new();
    let mut rx = h.sup.subscribe();
    h.sup.start().unwrap();

    tokio::time::sleep(Duration::from_millis(3500)).await;
    let pending = count(&drain(&mut rx), EventKind::ReadinessPending, None);
    assert_eq!(pending, 4);
    assert_eq!(h.sup.state(), LifecycleState::Starting);
    assert_eq!(h.proxies.created(), 0);

    // the alive signal ends the wait before the next tick
    h.engine().mark_alive();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.sup.state(), LifecycleState::Running);
    assert_eq!(count(&drain(&mut rx), EventKind::ReadinessPending, None), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_config_dir_leaves_engine_running() {
    let h = Harness::with_properties(Properties::new());
    let mut rx = h.sup.subscribe();
    h.sup.start().unwrap();
    h.engine().mark_alive();

    wait_until(|| {
        let tasks = h.sup.active_tasks();
        tasks.contains(&"engine-run".to_string()) && !tasks.contains(&"readiness".to_string())
    })
    .await;

    let events = drain(&mut rx);
    let failed = events
        .iter()
        .find(|e| e.kind == EventKind::TaskFailed && e.task.as_deref() == Some("readiness"))
        .expect("readiness should fail");
    assert!(failed.reason.as_deref().unwrap_or_default().contains("i2p.dir.config"));

    assert_eq!(h.sup.state(), LifecycleState::Starting);
    assert_eq!(h.proxies.created(), 0);
    assert!(h.sup.is_started());
}

#[tokio::test(start_paused = true)]
async fn proxy_failure_is_contained() {
    let h = Harness::new();
    h.proxies.set_fail(true);
    let mut rx = h.sup.subscribe();
    h.sup.start().unwrap();
    h.engine().mark_alive();

    tokio::time::sleep(Duration::from_millis(100)).await;
    let events = drain(&mut rx);
    assert_eq!(count(&events, EventKind::TaskFailed, Some("readiness")), 1);
    assert_eq!(count(&events, EventKind::ProxyStarted, None), 0);
    assert_eq!(h.sup.state(), LifecycleState::Starting);
    assert!(!h.engine().shutdown_requested());
}

#[tokio::test(start_paused = true)]
async fn stop_while_starting_skips_proxy() {
    let h = Harness::new();
    h.sup.start().unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    h.sup.stop();
    assert_eq!(h.sup.state(), LifecycleState::Stopping);
    h.engine().mark_alive();

    wait_until(|| h.sup.state() == LifecycleState::Stopped).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.proxies.created(), 0);
}

#[tokio::test(start_paused = true)]
async fn engine_create_failure_resets_state() {
    let h = Harness::new();
    h.engines.set_fail(true);

    let err = h.sup.start().unwrap_err();
    assert!(matches!(err, SupervisorError::EngineCreate(_)));
    assert_eq!(err.as_label(), "supervisor_engine_create");
    assert!(!h.sup.is_started());
    assert_eq!(h.sup.state(), LifecycleState::Stopped);

    h.engines.set_fail(false);
    h.sup.start().unwrap();
    assert_eq!(h.engines.created(), 1);
}

#[tokio::test(start_paused = true)]
async fn rate_getters_degrade_to_zero() {
    let h = Harness::new();
    assert_eq!(h.sup.receive_rate_1s(), 0.0);
    assert_eq!(h.sup.total_sent_mb(), 0.0);

    h.sup.start().unwrap();
    let engine = h.engine();

    engine.set_rate(Ok(2048.0));
    engine.set_allocated(Ok(3 * 1024 * 1024));
    assert_eq!(h.sup.receive_rate_1s(), 2.0);
    assert_eq!(h.sup.send_rate_5m(), 2.0);
    assert_eq!(h.sup.send_rate_lifetime_avg(), 2.0);
    assert_eq!(h.sup.total_received_mb(), 3.0);

    engine.set_rate(Err(EngineError::new("stat manager not ready")));
    engine.set_allocated(Err(EngineError::new("limiter not ready")));
    assert_eq!(h.sup.send_rate_1s(), 0.0);
    assert_eq!(h.sup.receive_rate_5m(), 0.0);
    assert_eq!(h.sup.receive_rate_lifetime_avg(), 0.0);
    assert_eq!(h.sup.total_sent_mb(), 0.0);

    engine.set_rate(Ok(f64::NAN));
    assert_eq!(h.sup.receive_rate_1s(), 0.0);

    engine.set_rate(Ok(2048.0));
    engine.set_allocated(Ok(1024 * 1024));
    engine.set_panic_reads(true);
    assert_eq!(h.sup.receive_rate_1s(), 0.0);
    assert_eq!(h.sup.send_rate_lifetime_avg(), 0.0);
    assert_eq!(h.sup.total_received_mb(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn reachability_before_and_after_start() {
    let h = Harness::new();
    let msg = h.sup.classify_reachability();
    assert_eq!(msg.state(), NetworkState::Testing);
    assert_eq!(msg.text(), "Not started");

    h.sup.start().unwrap();
    assert_eq!(h.sup.classify_reachability().state(), NetworkState::Testing);

    h.engine().publish(
        routervisor::CommStatus::Ok,
        routervisor::RouterInfo::new().with_address(
            routervisor::Transport::Primary,
            routervisor::PublishedAddress::resolved("93.184.216.34".parse().unwrap(), 12345),
        ),
    );
    let msg = h.sup.classify_reachability();
    assert_eq!(msg.state(), NetworkState::Running);
    assert_eq!(msg.to_string(), "(RUNNING; OK)");
}
