//! Integration test crate for Framecast.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the framecast crates to verify they work together.


#[cfg(test)]
mod session;


#[cfg(test)]
mod endtoend;

/// Route library logs through a subscriber when RUST_LOG is set.
#[cfg(test)]
pub(crate) fn init_logs() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
