//! The process-wide sink: state, lifecycle, threshold controls, emitters.
//!
//! Every subsystem checks [`loggable`] on its fast path, then formats and
//! writes synchronously through one of the emitters. Emitter failures are
//! swallowed and counted; `errno` observed by the caller is identical before
//! and after any emitter call. The only error surfaced to callers is
//! [`LogError::SinkUnavailable`] out of [`Logger::init`].

use std::{
    fmt::{Arguments, Write as FmtWrite},
    fs::{File, OpenOptions},
    io,
    os::unix::{fs::OpenOptionsExt, io::AsRawFd},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};

use time::UtcOffset;

use crate::{
    buffer::{LineBuffer, LOG_MAX_LEN},
    compat::CompatLogger,
    display::Asctime,
    hexdump,
    level::Level,
};

lazy_static! {
    static ref LOGGER: RwLock<Logger> = RwLock::new(Logger::disabled());
}

/// Severity ceiling, read on every `loggable` call. Kept outside the lock so
/// the fast path is a single atomic load.
static THRESHOLD: AtomicUsize = AtomicUsize::new(Level::Notice as usize);

/// Write failures since process start. Monotonic, never reset.
static WRITE_ERRORS: AtomicUsize = AtomicUsize::new(0);

static COMPAT_LOGGER: CompatLogger = CompatLogger;

#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("opening log file '{}' failed: {source}", path.display())]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("installing the rotation signal handler failed: {0}")]
    RotateHandler(#[from] nix::errno::Errno),
}

/// Destination of log records.
///
/// `File` is the only variant owning a descriptor that teardown and reopen
/// manage; `Stderr` borrows the process-wide handle and is never closed.
/// `Memory` lets tests observe emitter output without touching the
/// filesystem. `Disabled` is the invalid sentinel: emitters drop records
/// silently while it is in place.
pub enum LoggerBackend {
    Stderr,
    File(File),
    Memory(Arc<Mutex<Vec<u8>>>),
    Disabled,
}

impl AsRef<str> for LoggerBackend {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

impl LoggerBackend {
    pub const fn name(&self) -> &'static str {
        match self {
            LoggerBackend::Stderr => "stderr",
            LoggerBackend::File(_) => "file",
            LoggerBackend::Memory(_) => "memory",
            LoggerBackend::Disabled => "disabled",
        }
    }

    /// One write call, no retry. Returns a negative value on failure, like
    /// the underlying `write(2)`.
    fn write_once(&self, bytes: &[u8]) -> isize {
        match self {
            LoggerBackend::Stderr => unsafe {
                libc::write(
                    libc::STDERR_FILENO,
                    bytes.as_ptr() as *const libc::c_void,
                    bytes.len(),
                )
            },
            LoggerBackend::File(file) => unsafe {
                libc::write(
                    file.as_raw_fd(),
                    bytes.as_ptr() as *const libc::c_void,
                    bytes.len(),
                )
            },
            LoggerBackend::Memory(sink) => {
                if let Ok(mut sink) = sink.lock() {
                    sink.extend_from_slice(bytes);
                }
                bytes.len() as isize
            }
            LoggerBackend::Disabled => 0,
        }
    }
}

pub struct Logger {
    backend: LoggerBackend,
    /// Destination path; `None` when bound to stderr or a memory sink.
    path: Option<PathBuf>,
    /// UTC offset of local civil time, resolved once at init.
    utc_offset: UtcOffset,
}

impl Logger {
    fn disabled() -> Logger {
        Logger {
            backend: LoggerBackend::Disabled,
            path: None,
            utc_offset: UtcOffset::UTC,
        }
    }

    /// Binds the sink and sets the severity ceiling. An absent or empty
    /// `name` binds to stderr; otherwise `name` is opened write-only,
    /// append, created `0644` if missing.
    ///
    /// On open failure the sink is left disabled, a diagnostic goes out
    /// through the emergency path, and the error is returned. This is the
    /// only emitter-adjacent call that surfaces an error.
    pub fn init<P: AsRef<Path>>(level: Level, name: Option<P>) -> Result<(), LogError> {
        THRESHOLD.store(level as usize, Ordering::SeqCst);

        let path = name
            .as_ref()
            .map(|p| p.as_ref())
            .filter(|p| !p.as_os_str().is_empty());
        let (backend, path) = match path {
            None => (LoggerBackend::Stderr, None),
            Some(path) => match open_sink(path) {
                Ok(file) => (LoggerBackend::File(file), Some(path.to_path_buf())),
                Err(e) => {
                    let mut logger = write_lock();
                    logger.backend = LoggerBackend::Disabled;
                    logger.path = None;
                    drop(logger);
                    log_stderr(format_args!(
                        "opening log file '{}' failed: {}",
                        path.display(),
                        e
                    ));
                    return Err(LogError::SinkUnavailable {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            },
        };

        let mut logger = write_lock();
        logger.backend = backend;
        logger.path = path;
        logger.utc_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        drop(logger);

        register_compat_logger(level);
        Ok(())
    }

    /// Binds the sink to a caller-supplied backend. Used by hosts embedding
    /// the logger in tests, with [`LoggerBackend::Memory`].
    pub fn init_with_backend(level: Level, backend: LoggerBackend) -> Result<(), LogError> {
        THRESHOLD.store(level as usize, Ordering::SeqCst);

        let mut logger = write_lock();
        logger.backend = backend;
        logger.path = None;
        logger.utc_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        drop(logger);

        register_compat_logger(level);
        Ok(())
    }

    /// Closes the descriptor if the sink owns one and invalidates it.
    /// Stderr is never closed. Safe to call repeatedly.
    pub fn teardown() {
        let mut logger = write_lock();
        // dropping the File variant closes the descriptor
        logger.backend = LoggerBackend::Disabled;
        logger.path = None;
    }

    /// Closes then reopens the current destination, for cooperation with
    /// external log rotation. A no-op unless the sink is file-backed. On
    /// reopen failure the sink stays disabled and records are dropped until
    /// a later reopen succeeds.
    pub fn reopen() {
        let mut logger = write_lock();
        let path = match &logger.path {
            Some(path) => path.clone(),
            None => return,
        };

        // close first so the kernel file-table slot is released before the
        // new open
        logger.backend = LoggerBackend::Disabled;
        match open_sink(&path) {
            Ok(file) => logger.backend = LoggerBackend::File(file),
            Err(e) => {
                drop(logger);
                log_stderr(format_args!(
                    "reopening log file '{}' failed, ignored: {}",
                    path.display(),
                    e
                ));
            }
        }
    }

    /// Name of the current backend, for diagnostics.
    pub fn backend_name() -> &'static str {
        read_lock().backend.name()
    }
}

fn open_sink(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .mode(0o644)
        .open(path)
}

fn read_lock() -> RwLockReadGuard<'static, Logger> {
    match LOGGER.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock() -> RwLockWriteGuard<'static, Logger> {
    match LOGGER.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn register_compat_logger(level: Level) {
    // set_logger fails on the second call, which is fine
    let _ = log::set_logger(&COMPAT_LOGGER);
    log::set_max_level(crate::compat::max_level_for(level));
}

/// The fast-path predicate: true iff `level` is within the current ceiling.
#[inline]
pub fn loggable(level: Level) -> bool {
    level as usize <= THRESHOLD.load(Ordering::Relaxed)
}

/// Current severity ceiling.
pub fn threshold() -> Level {
    Level::from_usize(THRESHOLD.load(Ordering::Relaxed)).unwrap_or(Level::Pverb)
}

/// Write failures since process start.
pub fn error_count() -> usize {
    WRITE_ERRORS.load(Ordering::Relaxed)
}

/// Raises the ceiling one rank toward `pverb`, admitting more records.
pub fn level_up() {
    let raised = THRESHOLD.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
        if v < Level::Pverb as usize {
            Some(v + 1)
        } else {
            None
        }
    });
    if let Ok(previous) = raised {
        log(
            file!(),
            line!(),
            false,
            format_args!("up log level to {}", previous + 1),
        );
    }
}

/// Lowers the ceiling one rank toward `emerg`, admitting fewer records.
pub fn level_down() {
    let lowered = THRESHOLD.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
        if v > Level::Emerg as usize {
            Some(v - 1)
        } else {
            None
        }
    });
    if let Ok(previous) = lowered {
        log(
            file!(),
            line!(),
            false,
            format_args!("down log level to {}", previous - 1),
        );
    }
}

/// Sets the ceiling outright.
pub fn level_set(level: Level) {
    THRESHOLD.store(level as usize, Ordering::SeqCst);
    log(
        file!(),
        line!(),
        false,
        format_args!("set log level to {}", level as usize),
    );
}

fn errno() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

#[cfg(target_os = "linux")]
fn set_errno(value: i32) {
    unsafe { *libc::__errno_location() = value }
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
fn set_errno(value: i32) {
    unsafe { *libc::__error() = value }
}

/// Formats one record and appends it to the sink.
///
/// The record is assembled in a stack buffer of [`LOG_MAX_LEN`] bytes and
/// written with a single `write(2)`; concurrent records do not interleave at
/// the byte level. A short write is tolerated, a failed write is counted,
/// `errno` is restored either way. With `panic` set the process aborts once
/// the write completed, so the record is the operator's postmortem.
pub fn log(file: &str, line: u32, panic: bool, args: Arguments) {
    let logger = read_lock();
    if let LoggerBackend::Disabled = logger.backend {
        return;
    }

    let errno_saved = errno();

    let mut buf: LineBuffer<LOG_MAX_LEN> = LineBuffer::new();
    let now = Asctime::now(logger.utc_offset);
    let _ = write!(buf, "[{now}] {file}:{line} ");
    let _ = buf.write_fmt(args);
    buf.push_newline();

    if logger.backend.write_once(buf.as_bytes()) < 0 {
        WRITE_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    set_errno(errno_saved);

    if panic {
        drop(logger);
        unsafe { libc::abort() }
    }
}

/// The emergency path: writes directly to stderr, bypassing the sink.
///
/// Never reads the descriptor or the threshold, so it works before `init`
/// and while the sink is disabled. Uses a buffer four times the standard
/// length.
pub fn log_stderr(args: Arguments) {
    let errno_saved = errno();

    let mut buf: LineBuffer<{ 4 * LOG_MAX_LEN }> = LineBuffer::new();
    let _ = buf.write_fmt(args);
    buf.push_newline();

    let n = unsafe {
        libc::write(
            libc::STDERR_FILENO,
            buf.as_bytes().as_ptr() as *const libc::c_void,
            buf.len(),
        )
    };
    if n < 0 {
        WRITE_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    set_errno(errno_saved);
}

/// Appends a canonical hex + ASCII dump of `data` to the sink, in one write.
///
/// Rendering stops when the input is exhausted or one byte of headroom
/// remains in the 8x buffer. Failure handling matches [`log`].
pub fn log_hexdump(data: &[u8]) {
    let logger = read_lock();
    if let LoggerBackend::Disabled = logger.backend {
        return;
    }

    let errno_saved = errno();

    let mut buf: LineBuffer<{ 8 * LOG_MAX_LEN }> = LineBuffer::new();
    hexdump::write_rows(&mut buf, data);

    if logger.backend.write_once(buf.as_bytes()) < 0 {
        WRITE_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    set_errno(errno_saved);
}

/// Emits a record if `$lvl` passes the threshold. Source location is
/// captured at the call site.
#[macro_export]
macro_rules! log {
    ($lvl:expr, $format:expr $(, $args:expr)* $(,)?) => {{
        if $crate::logger::loggable($lvl) {
            $crate::logger::log(file!(), line!(), false, format_args!($format $(, $args)*));
        }
    }};
}

/// Emits a record unconditionally, skipping the threshold check.
#[macro_export]
macro_rules! always {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::logger::log(file!(), line!(), false, format_args!($format $(, $args)*))
    };
}

/// Emits a record unconditionally, then aborts the process. The write
/// completes before termination.
#[macro_export]
macro_rules! fatal {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::logger::log(file!(), line!(), true, format_args!($format $(, $args)*))
    };
}

/// Writes directly to stderr, bypassing the sink and the threshold.
#[macro_export]
macro_rules! log_stderr {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::logger::log_stderr(format_args!($format $(, $args)*))
    };
}

/// Emits an optional caption record followed by a hex + ASCII dump of
/// `$data` if `$lvl` passes the threshold.
#[macro_export]
macro_rules! log_hexdump {
    ($lvl:expr, $data:expr) => {{
        if $crate::logger::loggable($lvl) {
            $crate::logger::log_hexdump($data);
        }
    }};
    ($lvl:expr, $data:expr, $format:expr $(, $args:expr)* $(,)?) => {{
        if $crate::logger::loggable($lvl) {
            $crate::logger::log(file!(), line!(), false, format_args!($format $(, $args)*));
            $crate::logger::log_hexdump($data);
        }
    }};
}

#[macro_export]
macro_rules! emerg {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::log!($crate::Level::Emerg, $format $(, $args)*)
    };
}

#[macro_export]
macro_rules! alert {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::log!($crate::Level::Alert, $format $(, $args)*)
    };
}

#[macro_export]
macro_rules! crit {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::log!($crate::Level::Crit, $format $(, $args)*)
    };
}

#[macro_export]
macro_rules! error {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::log!($crate::Level::Err, $format $(, $args)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::log!($crate::Level::Warn, $format $(, $args)*)
    };
}

#[macro_export]
macro_rules! notice {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::log!($crate::Level::Notice, $format $(, $args)*)
    };
}

#[macro_export]
macro_rules! info {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::log!($crate::Level::Info, $format $(, $args)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($format:expr $(, $args:expr)* $(,)?) => {
        $crate::log!($crate::Level::Debug, $format $(, $args)*)
    };
}

/// Compiled out unless `debug_assertions` or the `logs-verb` feature is on.
#[macro_export]
macro_rules! verb {
    ($format:expr $(, $args:expr)* $(,)?) => {{
        #[cfg(any(debug_assertions, feature = "logs-verb"))]
        $crate::log!($crate::Level::Verb, $format $(, $args)*);
        #[cfg(not(any(debug_assertions, feature = "logs-verb")))]
        { $( let _ = &$args; )* }
    }};
}

/// Compiled out unless `debug_assertions` or the `logs-pverb` feature is on.
#[macro_export]
macro_rules! pverb {
    ($format:expr $(, $args:expr)* $(,)?) => {{
        #[cfg(any(debug_assertions, feature = "logs-pverb"))]
        $crate::log!($crate::Level::Pverb, $format $(, $args)*);
        #[cfg(not(any(debug_assertions, feature = "logs-pverb")))]
        { $( let _ = &$args; )* }
    }};
}
