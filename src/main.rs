use clap::Parser;
use lease_lens::cli::{run, Cli};

#[tokio::main]
async fn main() {
    // Restore default SIGPIPE handling so `lease-lens history | head` exits quietly.
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("lease-lens: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
