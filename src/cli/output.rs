//! Shared output helpers for CLI commands.
//!
//! Global flags are mirrored into `PROSPECT_*` env vars by `main` so every
//! module can check them without threading a struct through.

/// Whether `--quiet` was passed.
pub fn is_quiet() -> bool {
    std::env::var("PROSPECT_QUIET").is_ok()
}

/// Whether `--json` was passed.
pub fn is_json() -> bool {
    std::env::var("PROSPECT_JSON").is_ok()
}

/// Print a machine-readable result to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Terminal symbols, degraded when color is off.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self {
            color: std::env::var("PROSPECT_NO_COLOR").is_err(),
        }
    }

    pub fn ok_sym(&self) -> &'static str {
        if self.color {
            "\x1b[32m✓\x1b[0m"
        } else {
            "[OK]"
        }
    }

    pub fn warn_sym(&self) -> &'static str {
        if self.color {
            "\x1b[33m!\x1b[0m"
        } else {
            "[!!]"
        }
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}
