pub mod cells;
pub mod recurrence;
pub mod verify;

use anyhow::Result;
use serde::Serialize;

/// Pretty-print a JSON document on stdout. Logs go to stderr.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
