//! Required-program lookup on the execution search path.
//!
//! Pure queries: nothing here spawns a process.

use std::ffi::OsStr;
use std::path::PathBuf;

/// Returns the entries of `required` that cannot be found on the process `PATH`,
/// in input order.
pub fn missing_programs(required: &[&str]) -> Vec<String> {
    let search_path = std::env::var_os("PATH").unwrap_or_default();
    missing_programs_in(required, &search_path)
}

/// Returns the entries of `required` that cannot be found on `search_path`
/// (a `PATH`-style list of directories), in input order.
pub fn missing_programs_in(required: &[&str], search_path: &OsStr) -> Vec<String> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    required
        .iter()
        .filter(|name| which::which_in(name, Some(search_path), &cwd).is_err())
        .map(|name| (*name).to_string())
        .collect()
}
