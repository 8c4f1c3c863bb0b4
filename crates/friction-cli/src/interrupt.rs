//! Ctrl-C handling.

use friction_core::traits::{Cancellable, CancellationToken};

/// Exit status after a second interrupt.
const FORCED_EXIT: i32 = 130;

/// Cancel `token` on the first Ctrl-C; exit on the second.
///
/// The signal is awaited on a current-thread runtime in its own thread so
/// the pipeline itself stays synchronous.
pub fn install(token: CancellationToken) {
    let spawned = std::thread::Builder::new()
        .name("friction-interrupt".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::warn!(error = %e, "interrupt handler unavailable");
                    return;
                }
            };
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                tracing::warn!("interrupt received, stopping after the current game");
                token.cancel();
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(FORCED_EXIT);
                }
            });
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "could not spawn interrupt thread");
    }
}
