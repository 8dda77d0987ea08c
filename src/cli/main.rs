/*!
The `aigbmc` binary.

```sh
aigbmc [-h] [-v] [-x] [-n] [-p] [-O[LEVEL]] [--no-clone] [--backend=NAME] [maxk] [file]
```

Prints the verdict digit, the property line `b0`, on a violation the
witness trace, and a closing `.`; per-bound `u{k}` acknowledgements are
flushed while the search runs. The exit code mirrors the verdict: 10 when
the property is violated, 20 when it is unreachable, 30 when the bound was
exhausted.

A termination signal posts into a flag the search polls between solver
calls; `s UNKNOWN` goes to stderr and the run winds down with the
inconclusive verdict.
*/

use std::alloc::{GlobalAlloc, Layout, System};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;

use aigbmc::{
    aig::parse::read_aiger,
    config::{BackendKind, Config},
    reports::Verdict,
    session::BmcSession,
    types::err::ErrorKind,
};

mod args;

/// Wraps the system allocator to track peak live bytes for the statistics
/// report. Allocation failure falls through to the standard error path,
/// which terminates the process.
struct TrackingAllocator;

static CURRENT_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            let now = CURRENT_BYTES.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
            PEAK_BYTES.fetch_max(now, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        CURRENT_BYTES.fetch_sub(layout.size(), Ordering::Relaxed);
        System.dealloc(ptr, layout);
    }
}

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

fn die(message: impl std::fmt::Display) -> ! {
    eprintln!("*** aigbmc: {message}");
    std::process::exit(1);
}

fn stats(session: &BmcSession) {
    let counters = session.counters();
    log::info!("reached k = {}", counters.bound_reached);
    log::info!(
        "escalated {} times over {} solver calls",
        counters.escalations,
        counters.solver_calls
    );
    log::info!(
        "max {:.1} MB",
        PEAK_BYTES.load(Ordering::Relaxed) as f64 / f64::from(1 << 20)
    );
}

fn main() {
    // A bare `-O` means effort 1; normalise it up front so the parser
    // never mistakes a following positional for the level.
    let argv = std::env::args().map(|arg| {
        if arg == "-O" {
            "-O1".to_owned()
        } else {
            arg
        }
    });
    let args = args::Args::parse_from(argv);

    let filter = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .init();

    let backend: BackendKind = match args.backend.parse() {
        Ok(backend) => backend,
        Err(e) => die(ErrorKind::from(e)),
    };
    let (max_k, input) = match args::classify_positionals(&args.positional) {
        Ok(split) => split,
        Err(message) => die(message),
    };

    let config = Config {
        stimulus_x: args.x_stimulus,
        witness: !args.no_witness,
        plain: args.plain,
        simplify_effort: args.simplify,
        clone_escalation: !args.no_clone,
        backend,
        ..Config::default()
    };

    log::info!("reading {}", input.as_deref().unwrap_or("<stdin>"));
    let bytes = match &input {
        Some(path) => match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => die(format!("can not read '{path}': {e}")),
        },
        None => {
            let mut bytes = Vec::new();
            if let Err(e) = std::io::stdin().read_to_end(&mut bytes) {
                die(format!("can not read <stdin>: {e}"));
            }
            bytes
        }
    };

    let circuit = match read_aiger(&bytes) {
        Ok(circuit) => circuit,
        Err(e) => die(format!(
            "'{}': {e}",
            input.as_deref().unwrap_or("<stdin>")
        )),
    };

    let mut session = match BmcSession::new(circuit, config) {
        Ok(session) => session,
        Err(e) => die(e),
    };
    log::info!("maxk {max_k}");

    let interrupt = session.interrupt();
    if let Err(e) = ctrlc::set_handler(move || {
        if interrupt.is_set() {
            // A second signal aborts without winding down.
            std::process::exit(1);
        }
        interrupt.set();
        eprintln!("s UNKNOWN");
    }) {
        log::warn!("could not install signal handler: {e}");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = session.run(max_k, &mut out);
    drop(out);

    let code = match result {
        Ok(outcome) => {
            stats(&session);
            log::info!("exit {}", outcome.verdict.exit_code());
            outcome.verdict.exit_code()
        }
        Err(ErrorKind::Interrupted) => {
            let mut out = std::io::stdout();
            let _ = write!(out, "2\nb0\n.\n");
            let _ = out.flush();
            stats(&session);
            Verdict::Unknown.exit_code()
        }
        Err(e) => die(e),
    };
    std::process::exit(code);
}
