//! Internal logging shim.
//!
//! With the `log` feature enabled these forward to the [`log`] crate;
//! otherwise they expand to a no-op that still marks the arguments used.

#[cfg(feature = "log")]
macro_rules! trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            let _ = ($( & $x ),*);
        }
    };
}

#[cfg(feature = "log")]
macro_rules! debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            let _ = ($( & $x ),*);
        }
    };
}
