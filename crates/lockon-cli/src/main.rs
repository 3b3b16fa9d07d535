//! `lockon-cli` – interactive demo of the target lock-on session.
//!
//! This binary wires a full [`ArSession`] to a scripted camera simulation
//! and narrates what the session publishes:
//!
//! 1. Checks for `~/.lockon/config.toml`; runs a **First-Run Wizard** when
//!    the file is absent.
//! 2. Builds a synthetic target inventory and a [`sim::SimulatedEngine`]
//!    that finds one scripted target, streams jittered poses, and drops
//!    tracking transiently mid-stream.
//! 3. Drives the session on a single-threaded tokio runtime at the
//!    configured poll interval, printing lock/unlock, visibility, and
//!    smoothed-pose events as they arrive.
//! 4. Intercepts **Ctrl-C** to stop the session and print a summary.

mod config;
mod sim;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use lockon_session::{ArSession, Lane, LaneReceiver};
use lockon_types::SessionEvent;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set LOCKON_LOG_FORMAT=json to emit newline-delimited JSON logs for
    // log aggregators.  User-facing output still uses println! for UX.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("LOCKON_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!(
            "{}",
            "⚠  Ctrl-C received – stopping the session …".yellow().bold()
        );
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => run_first_run_wizard(),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };

    run_session(cfg, shutdown);
}

// ─────────────────────────────────────────────────────────────────────────────
// Session loop
// ─────────────────────────────────────────────────────────────────────────────

fn run_session(cfg: config::Config, shutdown: Arc<AtomicBool>) {
    let inventory = sim::synthetic_inventory(cfg.sim.target_count);
    let mut session = match ArSession::new(inventory.clone(), cfg.session.clone()) {
        Ok(session) => session,
        Err(e) => {
            println!("{}: {}", "Session error".red(), e);
            return;
        }
    };
    let mut lifecycle_rx = session.bus().subscribe_to(Lane::Lifecycle);
    let mut pose_rx = session.bus().subscribe_to(Lane::Pose);
    let mut engine = sim::SimulatedEngine::new(cfg.sim.clone(), inventory);

    println!();
    println!(
        "  Scanning {} synthetic target(s), poll every {} ms.  Ctrl-C to stop.\n",
        cfg.sim.target_count.to_string().bold(),
        cfg.session.poll_interval_ms
    );
    session.start(&mut engine);

    // The whole session is cooperative and single-threaded; a
    // current-thread runtime is all the loop needs.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            println!("{}: {}", "Runtime error".red(), e);
            return;
        }
    };

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(cfg.session.poll_interval());
        while !shutdown.load(Ordering::SeqCst) {
            ticker.tick().await;
            engine.step();
            session.tick(&mut engine);
            narrate(&mut lifecycle_rx, &session);
            narrate(&mut pose_rx, &session);
        }
    });

    session.stop();
    narrate(&mut pose_rx, &session);
    print_summary(&session);
}

/// Print every event waiting on a lane.
fn narrate(rx: &mut LaneReceiver, session: &ArSession) {
    while let Ok(notice) = rx.try_recv() {
        match notice.event {
            SessionEvent::Locked { target } => println!(
                "  {} {} ({})",
                "◉ Locked".green().bold(),
                target.tracking_data_url.bold(),
                target.id.to_string().dimmed()
            ),
            SessionEvent::Unlocked => {
                println!("  {}", "◌ Unlocked – tracking dropped".yellow())
            }
            SessionEvent::VisibilityChanged { visible: true } => {
                println!("  {}", "▣ Content shown".green())
            }
            SessionEvent::VisibilityChanged { visible: false } => {
                println!("  {}", "□ Content hidden".yellow())
            }
            SessionEvent::SmoothedPose { pose } => println!(
                "  {} pos ({:+.4}, {:+.4}, {:+.4})  rot ({:+6.1}°, {:+6.1}°, {:+6.1}°)  stability {:.2}",
                "·".dimmed(),
                pose.position.x,
                pose.position.y,
                pose.position.z,
                pose.rotation_deg.x,
                pose.rotation_deg.y,
                pose.rotation_deg.z,
                session.stability()
            ),
        }
    }
}

fn print_summary(session: &ArSession) {
    let snapshot = session.scanner_state();
    println!();
    println!("  {}", "Session summary".bold());
    println!("    candidate switches : {}", snapshot.total_switches);
    println!("    locks acquired     : {}", snapshot.total_locks);
    println!("    final stability    : {:.2}", session.stability());
    println!("  {}", "✓ Session stopped.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() -> config::Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║       lockon First-Run Wizard        ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's set up the demo.\n");

    let mut cfg = config::Config::default();

    let count_str = prompt_line(
        &format!("  Synthetic target count [{}]: ", cfg.sim.target_count),
        &cfg.sim.target_count.to_string(),
    );
    if let Ok(n) = count_str.trim().parse::<usize>() {
        cfg.sim.target_count = n.max(1);
    }

    let poll_str = prompt_line(
        &format!("  Poll interval in ms [{}]: ", cfg.session.poll_interval_ms),
        &cfg.session.poll_interval_ms.to_string(),
    );
    if let Ok(ms) = poll_str.trim().parse::<u64>() {
        cfg.session.poll_interval_ms = ms.max(1);
    }

    let hide_str = prompt_line(
        &format!("  Hide delay in ms [{}]: ", cfg.session.hide_delay_ms),
        &cfg.session.hide_delay_ms.to_string(),
    );
    if let Ok(ms) = hide_str.trim().parse::<u64>() {
        cfg.session.hide_delay_ms = ms;
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __         __            "#.bold().cyan());
    println!("{}", r#"  / /__  ____/ /_____  ___  "#.bold().cyan());
    println!("{}", r#" / / _ \/ __/  '_/ _ \/ _ \ "#.bold().cyan());
    println!("{}", r#"/_/\___/\__/_/\_\\___/_//_/ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "lockon".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  AR target lock-on session demo");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
