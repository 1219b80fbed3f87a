//! Panic-to-result boundary around individual cases.
//!
//! A constructor that panics must fail its own case, not abort the run. The
//! runner evaluates every case through [`catch_panic`] and records the
//! payload message as an unknown failure.

use std::any::Any;
use std::fmt;
use std::panic::{self, UnwindSafe};

/// A caught panic, with its payload reduced to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicError {
    message: String,
}

impl PanicError {
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

impl std::error::Error for PanicError {}

/// Run `f`, converting a panic into `Err(PanicError)`.
pub fn catch_panic<T>(f: impl FnOnce() -> T + UnwindSafe) -> Result<T, PanicError> {
    panic::catch_unwind(f).map_err(PanicError::from_payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_values_through() {
        assert_eq!(catch_panic(|| 7), Ok(7));
    }

    #[test]
    fn captures_str_payload() {
        let err = catch_panic(|| -> u8 { panic!("boom") }).unwrap_err();
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "panic: boom");
    }

    #[test]
    fn captures_formatted_payload() {
        let width = "u64";
        let err = catch_panic(|| -> u8 { panic!("bad width {}", width) }).unwrap_err();
        assert_eq!(err.message(), "bad width u64");
    }

    #[test]
    fn opaque_payload() {
        let err = catch_panic(|| -> u8 { panic::panic_any(3_u32) }).unwrap_err();
        assert_eq!(err.message(), "unknown panic payload");
    }
}
