//! Logging macros that compile away unless the `tracing` feature is enabled.
//!
//! Tests always get real tracing output (`facet_testhelpers` installs a
//! subscriber per test).

#[cfg(any(test, feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! trace {
    ($($tt:tt)*) => {
        ::tracing::trace!($($tt)*)
    };
}

#[cfg(not(any(test, feature = "tracing")))]
#[macro_export]
#[doc(hidden)]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

#[cfg(any(test, feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! debug {
    ($($tt:tt)*) => {
        ::tracing::debug!($($tt)*)
    };
}

#[cfg(not(any(test, feature = "tracing")))]
#[macro_export]
#[doc(hidden)]
macro_rules! debug {
    ($($tt:tt)*) => {};
}
