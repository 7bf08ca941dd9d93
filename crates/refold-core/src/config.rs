/// Configuration for which simplification passes the renderer applies.
///
/// Both passes are enabled by default. Disable individual passes by setting
/// their fields to `false`, or use `from_skip_list` with pass name strings;
/// `disabled()` gives the literal 1:1 rendering.
#[derive(Debug, Clone)]
pub struct PassConfig {
    /// Elide bindings whose value is never read again.
    pub dead_store_elision: bool,
    /// Inline literal-only bindings at their use sites.
    pub constant_inlining: bool,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            dead_store_elision: true,
            constant_inlining: true,
        }
    }
}

impl PassConfig {
    /// A config with every pass disabled — the literal rendering.
    pub fn disabled() -> Self {
        Self {
            dead_store_elision: false,
            constant_inlining: false,
        }
    }

    /// Create a config with all passes enabled except those in the skip
    /// list. Pass names:
    /// - `"dead-store-elision"`
    /// - `"constant-inlining"`
    pub fn from_skip_list(skip: &[&str]) -> Self {
        let mut config = Self::default();
        for name in skip {
            match *name {
                "dead-store-elision" => config.dead_store_elision = false,
                "constant-inlining" => config.constant_inlining = false,
                _ => {}
            }
        }
        config
    }
}
