use std::process;

use kassa::{cli::run_cli, init};

fn main() {
    init();
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(%info, "kassa panicked");
        eprintln!("Error: kassa stopped unexpectedly: {info}");
    }));
    if let Err(err) = run_cli() {
        tracing::error!(error = %err, "kassa exited with an error");
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
