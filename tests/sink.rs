//! End-to-end behavior of the process-wide sink.
//!
//! The logger is a process-wide singleton, so every test here takes the
//! `GLOBAL` lock before touching it.

use std::{
    fs::{self, File},
    io::Read,
    os::unix::io::FromRawFd,
    sync::{Arc, Mutex, MutexGuard},
};

use regex::Regex;
use relog::{
    alert, always, crit, debug, emerg, error, info, log_hexdump, log_stderr, notice, pverb, verb,
    warn, Level, LogError, Logger, LoggerBackend,
};

static GLOBAL: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    match GLOBAL.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn memory_sink(level: Level) -> Arc<Mutex<Vec<u8>>> {
    let sink = Arc::new(Mutex::new(Vec::new()));
    Logger::init_with_backend(level, LoggerBackend::Memory(sink.clone())).unwrap();
    sink
}

fn drain(sink: &Arc<Mutex<Vec<u8>>>) -> String {
    let mut sink = sink.lock().unwrap();
    let out = String::from_utf8(sink.clone()).unwrap();
    sink.clear();
    out
}

#[test]
fn records_above_the_threshold_are_filtered_out() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.log");

    Logger::init(Level::Info, Some(&path)).unwrap();
    if relog::loggable(Level::Debug) {
        relog::logger::log("a.c", 10, false, format_args!("hello"));
    }
    Logger::teardown();

    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn emitted_lines_carry_timestamp_source_and_payload() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.log");

    Logger::init(Level::Info, Some(&path)).unwrap();
    relog::logger::log("a.c", 10, false, format_args!("hello"));
    Logger::teardown();

    let contents = fs::read_to_string(&path).unwrap();
    let re = Regex::new(r"^\[.{24}\] a\.c:10 hello\n$").unwrap();
    assert!(re.is_match(&contents), "unexpected line: {contents:?}");
}

#[test]
fn formatted_payloads_reach_the_sink() {
    let _guard = lock();
    let sink = memory_sink(Level::Err);

    crit!("boom {}", 7);

    let out = drain(&sink);
    assert!(out.ends_with("boom 7\n"), "unexpected line: {out:?}");
}

#[test]
fn macros_capture_the_call_site() {
    let _guard = lock();
    let sink = memory_sink(Level::Info);

    info!("listening");

    let out = drain(&sink);
    assert!(out.contains("tests/sink.rs:"), "unexpected line: {out:?}");
    assert!(out.ends_with(" listening\n"));
}

#[test]
fn failed_writes_preserve_errno_and_bump_the_counter() {
    let _guard = lock();

    // a pipe with the read end closed makes write(2) fail with EPIPE
    let mut fds = [0i32; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
    unsafe { libc::close(fds[0]) };
    let broken = unsafe { File::from_raw_fd(fds[1]) };
    Logger::init_with_backend(Level::Pverb, LoggerBackend::File(broken)).unwrap();

    let errors_before = relog::error_count();

    // plant a known errno before the emitter call
    unsafe { libc::close(-1) };
    let errno_before = std::io::Error::last_os_error().raw_os_error();

    relog::logger::log("a.c", 10, false, format_args!("lost"));

    let errno_after = std::io::Error::last_os_error().raw_os_error();
    assert_eq!(errno_before, errno_after);
    assert_eq!(relog::error_count(), errors_before + 1);

    Logger::teardown();
}

#[test]
fn emergency_path_works_while_the_sink_is_disabled() {
    let _guard = lock();
    Logger::teardown();

    // capture stderr through a pipe for the duration of the call
    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    assert!(saved >= 0);
    let mut fds = [0i32; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
    unsafe { libc::dup2(fds[1], libc::STDERR_FILENO) };
    unsafe { libc::close(fds[1]) };

    log_stderr!("boom {}", 7);

    unsafe { libc::dup2(saved, libc::STDERR_FILENO) };
    unsafe { libc::close(saved) };

    let mut out = Vec::new();
    let mut reader = unsafe { File::from_raw_fd(fds[0]) };
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "boom 7\n");
}

#[test]
fn hexdump_rows_follow_a_caption_record() {
    let _guard = lock();
    let sink = memory_sink(Level::Crit);
    let data: Vec<u8> = (0u8..17).collect();

    log_hexdump!(Level::Crit, &data, "frame {}", 1);

    let out = drain(&sink);
    let lines: Vec<&str> = out.split_terminator('\n').collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(" frame 1"));
    assert!(lines[1].starts_with("00000000  00 01"));
    assert_eq!(
        lines[2],
        "00000010  10                                                 |.|"
    );
}

#[test]
fn hexdump_above_the_threshold_emits_nothing() {
    let _guard = lock();
    let sink = memory_sink(Level::Err);
    let data = [0u8; 4];

    log_hexdump!(Level::Debug, &data);

    assert_eq!(drain(&sink), "");
}

#[test]
fn the_macro_family_respects_the_threshold() {
    let _guard = lock();
    let sink = memory_sink(Level::Warn);

    emerg!("m0");
    alert!("m1 {}", 1);
    crit!("m2");
    error!("m3");
    warn!("m4");
    notice!("m5");
    info!("m6");
    debug!("m7");
    verb!("m8");
    pverb!("m9");

    let out = drain(&sink);
    for kept in ["m0", "m1 1", "m2", "m3", "m4"] {
        assert!(out.contains(kept), "missing {kept}: {out:?}");
    }
    for filtered in ["m5", "m6", "m7", "m8", "m9"] {
        assert!(!out.contains(filtered), "unexpected {filtered}: {out:?}");
    }
}

#[test]
fn always_bypasses_the_threshold() {
    let _guard = lock();
    let sink = memory_sink(Level::Emerg);

    always!("heartbeat {}", 1);

    assert!(drain(&sink).contains("heartbeat 1"));
}

#[test]
fn loggable_is_a_ceiling_on_importance() {
    let _guard = lock();
    let _sink = memory_sink(Level::Warn);

    assert!(relog::loggable(Level::Emerg));
    assert!(relog::loggable(Level::Err));
    assert!(relog::loggable(Level::Warn));
    assert!(!relog::loggable(Level::Notice));
    assert!(!relog::loggable(Level::Pverb));
}

#[test]
fn threshold_moves_are_recorded_and_round_trip() {
    let _guard = lock();
    let sink = memory_sink(Level::Info);

    relog::level_up();
    assert_eq!(relog::threshold(), Level::Debug);
    relog::level_down();
    assert_eq!(relog::threshold(), Level::Info);

    let out = drain(&sink);
    assert!(out.contains("up log level to 7"), "unexpected: {out:?}");
    assert!(out.contains("down log level to 6"), "unexpected: {out:?}");
}

#[test]
fn threshold_is_pinned_at_the_scale_ends() {
    let _guard = lock();
    let sink = memory_sink(Level::Pverb);

    relog::level_up();
    assert_eq!(relog::threshold(), Level::Pverb);
    // no record for a refused move
    assert_eq!(drain(&sink), "");

    relog::level_set(Level::Emerg);
    relog::level_down();
    assert_eq!(relog::threshold(), Level::Emerg);
}

#[test]
fn reopen_on_a_stderr_sink_is_a_no_op() {
    let _guard = lock();
    Logger::init::<&str>(Level::Info, None).unwrap();
    assert_eq!(Logger::backend_name(), "stderr");

    Logger::reopen();

    assert_eq!(Logger::backend_name(), "stderr");
}

#[test]
fn reopen_recreates_a_rotated_file() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("y.log");
    let rotated = dir.path().join("y.log.1");

    Logger::init(Level::Pverb, Some(&path)).unwrap();
    relog::logger::log("a.c", 1, false, format_args!("before rotation"));

    fs::rename(&path, &rotated).unwrap();
    Logger::reopen();
    relog::logger::log("a.c", 2, false, format_args!("after rotation"));
    Logger::teardown();

    let old = fs::read_to_string(&rotated).unwrap();
    let new = fs::read_to_string(&path).unwrap();
    assert!(old.contains("before rotation"));
    assert!(!old.contains("after rotation"));
    assert!(new.contains("after rotation"));
    assert!(!new.contains("before rotation"));
}

#[test]
fn unopenable_destination_surfaces_sink_unavailable() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("z.log");

    match Logger::init(Level::Info, Some(&path)) {
        Err(LogError::SinkUnavailable { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected SinkUnavailable, got {other:?}"),
    }
    assert_eq!(Logger::backend_name(), "disabled");

    // records are dropped silently while disabled
    let errors_before = relog::error_count();
    relog::logger::log("a.c", 1, false, format_args!("dropped"));
    assert_eq!(relog::error_count(), errors_before);
}

#[test]
fn teardown_is_idempotent() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.log");

    Logger::init(Level::Info, Some(&path)).unwrap();
    Logger::teardown();
    Logger::teardown();
    assert_eq!(Logger::backend_name(), "disabled");
}

#[test]
fn setup_logging_wires_a_config_block_to_the_sink() {
    let _guard = lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.log");

    let config: relog::LogConfig = toml::from_str(&format!(
        "log_level = \"info\"\nlog_target = \"{}\"",
        path.display()
    ))
    .unwrap();
    relog::setup_logging(&config).unwrap();
    assert_eq!(relog::threshold(), Level::Info);

    info!("configured");
    Logger::teardown();

    assert!(fs::read_to_string(&path).unwrap().contains("configured"));
}

#[test]
fn facade_records_land_in_the_sink() {
    let _guard = lock();
    let sink = memory_sink(Level::Info);

    log::error!("facade says {}", 41 + 1);

    let out = drain(&sink);
    assert!(out.ends_with("facade says 42\n"), "unexpected: {out:?}");
}
