//! End-to-end injection tests against the sample module.
//!
//! These load a real cdylib, so they are unix-only and serialised: a module
//! stays mapped for the process lifetime, and its load-time hook can fire at
//! most once per process no matter how many tests inject it.

#![cfg(unix)]

use std::{
    env, fs,
    io::{BufRead, BufReader},
    net::{SocketAddr, TcpListener},
    path::{Path, PathBuf},
    process::Command,
    sync::{Arc, mpsc},
    thread,
    time::Duration,
};

use once_cell::sync::Lazy;
use serial_test::serial;

use hookline::{ConsoleLogger, InjectError, Logger, NetLogger, SharedLogger, inject};

/// Build the workspace artifacts the tests load and return the target dir.
static ARTIFACTS: Lazy<PathBuf> = Lazy::new(|| {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".into());
    let status = Command::new(cargo)
        .args(["build", "-p", "hookline", "-p", "injected-sample"])
        .current_dir(manifest_dir)
        .status()
        .expect("run cargo build for test artifacts");
    assert!(status.success(), "test artifacts failed to build");
    env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| manifest_dir.join("target"))
        .join("debug")
});

fn artifact(stem: &str) -> PathBuf {
    let name = format!(
        "{}{stem}{}",
        env::consts::DLL_PREFIX,
        env::consts::DLL_SUFFIX
    );
    let path = ARTIFACTS.join(name);
    assert!(path.exists(), "expected artifact at {}", path.display());
    path
}

fn sample_module() -> PathBuf {
    artifact("injected_sample")
}

/// Accept one connection and forward each received line to the test thread.
fn spawn_line_server(listener: TcpListener) -> (SocketAddr, mpsc::Receiver<String>) {
    let addr = listener.local_addr().expect("listener has address");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept connection");
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    (addr, rx)
}

fn recv_lines(rx: &mpsc::Receiver<String>, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            rx.recv_timeout(Duration::from_secs(2))
                .unwrap_or_else(|_| panic!("line {i} should arrive"))
        })
        .collect()
}

fn bridge_logger(addr: SocketAddr) -> SharedLogger {
    Arc::new(NetLogger::connect(
        "bridge",
        addr.ip().to_string(),
        addr.port(),
    ))
}

fn console_logger() -> SharedLogger {
    Arc::new(ConsoleLogger::stderr("bridge"))
}

fn sample_init_count() -> u32 {
    let library = unsafe { libloading::Library::new(sample_module()) }.expect("reopen sample");
    let count = unsafe {
        let counter = library
            .get::<unsafe extern "C" fn() -> u32>(b"injected_sample_init_count")
            .expect("counter symbol");
        counter()
    };
    // Keep the refcount balanced for this extra open.
    drop(library);
    count
}

#[test]
#[serial]
fn injects_and_streams_module_logs() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
    let (addr, rx) = spawn_line_server(listener);
    let logger = bridge_logger(addr);

    logger.emit("host ready");
    inject(sample_module(), &logger).expect("injection succeeds");

    assert_eq!(
        recv_lines(&rx, 3),
        vec![
            "bridge: host ready",
            "bridge: module `sample` attached",
            "bridge: sample patch armed",
        ]
    );
    assert_eq!(
        sample_init_count(),
        1,
        "the load hook and the entry call must converge on one init"
    );
}

#[test]
#[serial]
fn sequential_injections_share_one_connection() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
    let (addr, rx) = spawn_line_server(listener);
    let logger = bridge_logger(addr);

    // A copy under a different path loads as an independent module.
    let dir = tempfile::tempdir().expect("create tempdir");
    let copy = dir.path().join(format!(
        "{}injected_other{}",
        env::consts::DLL_PREFIX,
        env::consts::DLL_SUFFIX
    ));
    fs::copy(sample_module(), &copy).expect("copy sample module");

    inject(sample_module(), &logger).expect("first injection succeeds");
    inject(&copy, &logger).expect("second injection succeeds");

    // One accepted connection carries both modules' frames, unmixed and in
    // injection order.
    assert_eq!(
        recv_lines(&rx, 4),
        vec![
            "bridge: module `sample` attached",
            "bridge: sample patch armed",
            "bridge: module `sample` attached",
            "bridge: sample patch armed",
        ]
    );
}

#[test]
#[serial]
fn unreachable_controller_still_injects() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
    let addr = listener.local_addr().expect("listener has address");
    drop(listener);

    let net = NetLogger::with_config(
        "bridge",
        hookline::NetLoggerConfig::new(addr.ip().to_string(), addr.port())
            .with_connect_timeout(Duration::from_millis(250)),
    );
    assert!(!net.is_connected());
    let logger: SharedLogger = Arc::new(net);

    // Logging is best-effort, never a precondition for injection.
    inject(sample_module(), &logger).expect("injection succeeds while degraded");
}

#[test]
fn missing_path_reports_load_failure() {
    let logger = console_logger();
    let err = inject("/nonexistent/libmissing.so", &logger).expect_err("load must fail");
    match err {
        InjectError::Load { path, .. } => {
            assert_eq!(path, Path::new("/nonexistent/libmissing.so"));
        }
        other => panic!("expected a load failure, got {other}"),
    }
}

#[test]
fn garbage_file_reports_load_failure() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let path = dir.path().join("libgarbage.so");
    fs::write(&path, b"not a loadable module").expect("write garbage");

    let logger = console_logger();
    let err = inject(&path, &logger).expect_err("load must fail");
    assert!(matches!(err, InjectError::Load { .. }), "got {err}");
}

#[test]
#[serial]
fn library_without_entry_reports_missing_symbol() {
    // The bridge's own cdylib is a valid module that exports no entry symbol.
    let path = artifact("hookline");
    let logger = console_logger();
    let err = inject(&path, &logger).expect_err("resolution must fail");
    match err {
        InjectError::MissingEntry { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected a missing-entry failure, got {other}"),
    }
}
