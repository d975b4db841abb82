use std::collections::HashMap;

/// Flags the front-end consults.
pub const ENHANCED_NAVIGATION: &str = "enhanced-navigation";
pub const ENHANCED_UPLOAD: &str = "enhanced-upload";
pub const USER_DASHBOARD: &str = "user-dashboard";
pub const ANALYSIS_EXPORT: &str = "analysis-export";
pub const DRAG_DROP_UPLOAD: &str = "drag-drop-upload";

pub const KNOWN_FLAGS: &[&str] = &[
    ENHANCED_NAVIGATION,
    ENHANCED_UPLOAD,
    USER_DASHBOARD,
    ANALYSIS_EXPORT,
    DRAG_DROP_UPLOAD,
];

/// Boolean flag lookup. `default` is returned when the flag is unset or the
/// backing service is unavailable.
pub trait FlagSource: Send + Sync {
    fn is_enabled(&self, flag: &str, default: bool) -> bool;
}

/// Flags resolved once from configuration and environment.
#[derive(Debug, Clone, Default)]
pub struct StaticFlags {
    values: HashMap<String, bool>,
}

impl StaticFlags {
    pub fn new(values: HashMap<String, bool>) -> Self {
        Self { values }
    }

    /// Apply `LEASE_LENS_FLAG_<NAME>` overrides on top of the configured values.
    pub fn with_env_overrides(mut self) -> Self {
        for flag in KNOWN_FLAGS {
            if let Ok(raw) = std::env::var(env_var_name(flag)) {
                match parse_bool(&raw) {
                    Some(value) => {
                        self.values.insert((*flag).to_string(), value);
                    }
                    None => tracing::warn!("ignoring non-boolean value '{raw}' for flag {flag}"),
                }
            }
        }
        self
    }
}

impl FlagSource for StaticFlags {
    fn is_enabled(&self, flag: &str, default: bool) -> bool {
        self.values.get(flag).copied().unwrap_or(default)
    }
}

pub fn env_var_name(flag: &str) -> String {
    format!("LEASE_LENS_FLAG_{}", flag.to_uppercase().replace('-', "_"))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Presentation variant, chosen once when a view is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiVariant {
    Classic,
    Enhanced,
}

impl UiVariant {
    pub fn select(flags: &dyn FlagSource) -> Self {
        if flags.is_enabled(USER_DASHBOARD, false) {
            UiVariant::Enhanced
        } else {
            UiVariant::Classic
        }
    }
}

impl std::fmt::Display for UiVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiVariant::Classic => write!(f, "classic"),
            UiVariant::Enhanced => write!(f, "enhanced"),
        }
    }
}
