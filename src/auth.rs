// Mock login gate backed by a storage flag
//
// There is no credential check: logging in only sets the flag.

use crate::storage::{AUTH_KEY, Storage, TASKS_KEY};
use eyre::{Context, Result, eyre};
use tracing::info;

const AUTHENTICATED: &str = "true";

/// True when the login flag is set
pub fn is_authenticated<S: Storage + ?Sized>(storage: &S) -> Result<bool> {
    let flag = storage.get(AUTH_KEY).context("Failed to read login flag")?;
    Ok(flag.as_deref() == Some(AUTHENTICATED))
}

/// Set the login flag
pub fn login<S: Storage + ?Sized>(storage: &mut S) -> Result<()> {
    storage
        .set(AUTH_KEY, AUTHENTICATED)
        .context("Failed to write login flag")?;
    info!("Logged in");
    Ok(())
}

/// Clear the login flag and the stored tasks
pub fn logout<S: Storage + ?Sized>(storage: &mut S) -> Result<()> {
    storage.remove(AUTH_KEY).context("Failed to clear login flag")?;
    storage.remove(TASKS_KEY).context("Failed to clear stored tasks")?;
    info!("Logged out");
    Ok(())
}

/// Fail unless logged in, when login is required
pub fn ensure_logged_in<S: Storage + ?Sized>(storage: &S, required: bool) -> Result<()> {
    if required && !is_authenticated(storage)? {
        return Err(eyre!("Not logged in, run `tasklist login` first"));
    }
    Ok(())
}
