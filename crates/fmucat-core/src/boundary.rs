//! External collaborator call boundary.
//!
//! Model inspection and remote calls can fail in ways that are not known in
//! advance. A single bad input must never abort a batch, so calls into those
//! collaborators go through [`call_boundary`], which turns both returned
//! errors and panics into a diagnostic string.

use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Run `f`, converting `Err` and panics into a message.
///
/// Errors are formatted with `{:#}` so anyhow context chains are kept.
///
/// Panics are caught with `catch_unwind`; the default panic hook still
/// prints the panic once to stderr.
pub fn call_boundary<T, E: Display>(f: impl FnOnce() -> Result<T, E>) -> Result<T, String> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{e:#}")),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: <non-string payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_passes_through() {
        let r = call_boundary(|| Ok::<_, String>(42));
        assert_eq!(r, Ok(42));
    }

    #[test]
    fn error_becomes_message() {
        let r: Result<(), String> = call_boundary(|| Err(std::fmt::Error));
        assert_eq!(r, Err("an error occurred when formatting an argument".to_string()));
    }

    #[test]
    fn panic_becomes_message() {
        let r: Result<(), String> = call_boundary(|| -> Result<(), String> {
            panic!("corrupt archive");
        });
        assert_eq!(r, Err("panic: corrupt archive".to_string()));
    }

    #[test]
    fn formatted_panic_becomes_message() {
        let n = 3;
        let r: Result<(), String> = call_boundary(|| -> Result<(), String> {
            panic!("bad entry {n}");
        });
        assert_eq!(r, Err("panic: bad entry 3".to_string()));
    }
}
