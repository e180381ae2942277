//! Math functions required by the distance expression.
//!
//! SQLite only ships `acos`, `cos`, `sin` and `radians` when compiled with
//! `SQLITE_ENABLE_MATH_FUNCTIONS`. Connections opened against a build
//! without them get Rust implementations registered instead.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Scalar functions the distance expression calls, with their host fallbacks
const MATH_FUNCTIONS: [(&str, fn(f64) -> f64); 4] = [
    ("acos", f64::acos),
    ("cos", f64::cos),
    ("sin", f64::sin),
    ("radians", f64::to_radians),
];

/// Outcome of [`register_math_functions`] for one connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MathFunctions {
    /// Functions that had to be registered on this connection
    pub registered: Vec<&'static str>,
}

impl MathFunctions {
    /// True when the engine already provided every function
    pub fn is_native(&self) -> bool {
        self.registered.is_empty()
    }
}

/// Make `acos`, `cos`, `sin` and `radians` callable on `conn`.
///
/// Only functions the engine cannot already resolve are registered, so
/// calling this again on the same connection is a no-op.
pub fn register_math_functions(conn: &Connection) -> Result<MathFunctions> {
    let mut outcome = MathFunctions::default();

    for (name, func) in MATH_FUNCTIONS {
        if has_function(conn, name) {
            continue;
        }

        conn.create_scalar_function(
            name,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            move |ctx| {
                // NULL in, NULL out, like the built-ins
                let value: Option<f64> = ctx.get(0)?;
                Ok(value.map(func))
            },
        )?;
        outcome.registered.push(name);
    }

    if outcome.is_native() {
        debug!("SQLite provides math functions natively");
    } else {
        debug!("Registered math functions: {:?}", outcome.registered);
    }

    Ok(outcome)
}

/// Probe for a unary function by preparing a call to it
fn has_function(conn: &Connection, name: &str) -> bool {
    conn.prepare(&format!("SELECT {}(0.0)", name)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functions_callable_after_registration() {
        let conn = Connection::open_in_memory().unwrap();
        register_math_functions(&conn).unwrap();

        let (acos, cos, sin, radians): (f64, f64, f64, f64) = conn
            .query_row(
                "SELECT acos(1.0), cos(0.0), sin(0.0), radians(180.0)",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();

        assert_eq!(acos, 0.0);
        assert_eq!(cos, 1.0);
        assert_eq!(sin, 0.0);
        assert!((radians - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        register_math_functions(&conn).unwrap();

        let second = register_math_functions(&conn).unwrap();
        assert!(second.is_native());
    }

    #[test]
    fn test_null_passes_through() {
        let conn = Connection::open_in_memory().unwrap();
        register_math_functions(&conn).unwrap();

        let value: Option<f64> = conn
            .query_row("SELECT radians(NULL)", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, None);
    }
}
