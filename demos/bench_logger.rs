//! Benches the sink by logging random lines. The number of logs, the log
//! target and the severity ceiling are set with env variables.

use std::time::Instant;

use rand::{rngs::StdRng, RngCore, SeedableRng};

use relog::{info, verb, Level, Logger};

struct LogLine {
    arg0: u32,
    arg1: u32,
    arg2: u32,
}

fn random_log_line(rng: &mut StdRng) -> LogLine {
    LogLine {
        arg0: rng.next_u32(),
        arg1: rng.next_u32(),
        arg2: rng.next_u32(),
    }
}

fn main() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(54321);

    let n: usize = std::env::var("BENCH_LOG_ITERS")
        .ok()
        .and_then(|n| n.parse().ok())
        .unwrap_or(1000);
    let target = std::env::var("BENCH_LOG_TARGET").unwrap_or("stderr".to_string());
    let level: Level = std::env::var("BENCH_LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(Level::Info);

    eprintln!("n={n}, target={target}, level={level}");
    if target == "stderr" {
        Logger::init::<&str>(level, None).expect("logger setup");
    } else {
        Logger::init(level, Some(&target)).expect("logger setup");
    }

    let start = Instant::now();
    for _ in 0..n {
        let line = random_log_line(&mut rng);
        info!("emitted a burst: {} {} {}", line.arg0, line.arg1, line.arg2);
        verb!("burst detail: {}", line.arg2);
    }
    let elapsed = start.elapsed();

    eprintln!(
        "wrote {} records in {:?} ({:?} per record), {} write errors",
        n,
        elapsed,
        elapsed / n as u32,
        relog::error_count()
    );
}
