//! Instrumentation-point macros
//!
//! Statement-level interception is not an ambient capability in compiled
//! code, so the traced body marks its own boundaries. These macros keep the
//! marks terse: `step!(s, x, y)` is one statement reporting the current line
//! and the named bindings.

/// Capture named bindings into a [`Locals`](crate::value::Locals) list.
///
/// Each binding must implement `serde::Serialize`; anything that does not is
/// captured as an opaque placeholder by wrapping it beforehand.
#[macro_export]
macro_rules! locals {
    () => {
        ::std::vec::Vec::new()
    };
    ($($name:ident),+ $(,)?) => {
        ::std::vec![$((stringify!($name), $crate::value::CapturedValue::capture(&$name))),+]
    };
}

/// Report a statement boundary: current line plus the named bindings.
#[macro_export]
macro_rules! step {
    ($session:expr) => {
        $session.line(line!(), $crate::locals![])
    };
    ($session:expr, $($name:ident),+ $(,)?) => {
        $session.line(line!(), $crate::locals![$($name),+])
    };
}

/// Source coordinate of the call site.
#[macro_export]
macro_rules! here {
    () => {
        $crate::domain::SourceLocation::new(file!(), line!())
    };
}

/// Record `expr` as the call's return value, then evaluate to it.
///
/// `return ret!(session, y);` inside a [`trace_scope`](crate::Tracer::trace_scope)
/// body surfaces the value the RETURN event reports.
#[macro_export]
macro_rules! ret {
    ($session:expr, $value:expr) => {{
        let value = $value;
        $session.returning(&value);
        value
    }};
}

/// Announce one formatted entry at info level through the default sink.
#[macro_export]
macro_rules! show {
    ($($arg:tt)*) => {
        $crate::announce::announce($crate::domain::Level::Info, None, format_args!($($arg)*))
    };
}

/// Announce one formatted entry with an explicit level and prefix.
///
/// Pass `None::<&str>` (or a prefix string) as the second argument.
#[macro_export]
macro_rules! show_at {
    ($level:expr, $prefix:expr, $($arg:tt)*) => {
        $crate::announce::announce($level, $prefix.into(), format_args!($($arg)*))
    };
}
