//! Tether Monitor - demonstrates generation-gated listening
//!
//! A publisher thread emits upstream-change events continuously while the main
//! thread toggles the listener on and off. Only events published while the
//! listener is started are printed; everything in flight across a toggle is
//! dropped by the generation check.
//!
//! Run with: TETHER_LOG_MODE=development cargo run -p tether-versioned-listener --example tether_monitor

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use versioned_listener::logging;
use versioned_listener::prelude::*;

const UPSTREAM_CHANGED: &str = "tether.upstream_changed";

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    println!("=== Tether Monitor ===\n");

    let worker = WorkerThread::named("tether-monitor")?;
    let source = Arc::new(LocalEventSource::new());

    let listener = VersionedListener::new(
        "upstream",
        worker.context(),
        source.clone(),
        EventFilter::for_action(UPSTREAM_CHANGED),
        |event| {
            println!(
                "[{}] upstream -> {}",
                event.sent_at().format("%H:%M:%S%.3f"),
                String::from_utf8_lossy(event.payload())
            );
        },
    );

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    // Publisher thread standing in for the platform's network monitor
    let published = Arc::new(AtomicU64::new(0));
    let publisher = {
        let source = source.clone();
        let running = Arc::clone(&running);
        let published = Arc::clone(&published);
        thread::spawn(move || {
            let interfaces = ["rmnet0", "wlan0", "eth0"];
            let mut i = 0;
            while running.load(Ordering::SeqCst) {
                let upstream = interfaces[i % interfaces.len()];
                source.publish(Event::new(UPSTREAM_CHANGED).with_payload(upstream));
                published.fetch_add(1, Ordering::SeqCst);
                i += 1;
                thread::sleep(Duration::from_millis(200));
            }
        })
    };

    println!("Toggling the listener every second (Ctrl+C to quit)...\n");

    while running.load(Ordering::SeqCst) {
        if listener.is_listening() {
            listener.stop();
            println!("-- stopped (generation {})", listener.generation());
        } else {
            listener.start()?;
            println!("-- started (generation {})", listener.generation());
        }
        thread::sleep(Duration::from_secs(1));
    }

    println!("\nShutting down gracefully...");
    listener.stop();
    let _ = publisher.join();
    worker.quit_safely()?;

    println!(
        "Published {} events, final generation {}",
        published.load(Ordering::SeqCst),
        listener.generation()
    );

    Ok(())
}
