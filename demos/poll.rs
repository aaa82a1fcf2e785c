//! Poll the selected game controller and log every change.
//!
//! ```text
//! RUST_LOG=info cargo run --example poll -- [config.toml]
//! ```

#[cfg(windows)]
fn main() -> dijoy::Result<()> {
    use dijoy::{Config, ControllerService, DirectInput, EventFilter, LogListener};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut svc = ControllerService::new(DirectInput::new()?, config)?;

    println!("Controllers:");
    for c in svc.controllers()? {
        let mark = if c.current { "*" } else { " " };
        println!("{mark} {} ({})", c.identity.instance_name, c.identity.instance);
    }
    if svc.identity().is_none() {
        println!("No game controller attached.");
        return Ok(());
    }

    svc.bus_mut()
        .add_listener(LogListener::new(), EventFilter::All, None);
    svc.run(|_| true);
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("DirectInput is only available on Windows; try `cargo run --example virtual_demo`.");
}
