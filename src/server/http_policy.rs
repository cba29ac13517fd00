use std::collections::HashSet;

/// Shape of the http-only cookie carrying the refresh token.
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    pub name: String,
    pub max_age_secs: u64,
}

impl RefreshCookie {
    pub fn set(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
            self.name, token, self.max_age_secs
        )
    }

    pub fn clear(&self) -> String {
        format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", self.name)
    }

    /// Pick our cookie out of a raw `Cookie` header.
    pub fn read(&self, header: &str) -> Option<String> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Read-only mode for public demos: everything but GET/OPTIONS is refused unless
/// the `"METHOD /path"` pair is excluded.
#[derive(Debug, Clone, Default)]
pub struct DemoGuard {
    enabled: bool,
    exclude: HashSet<String>,
}

impl DemoGuard {
    pub fn new(enabled: bool, exclude: &[String]) -> Self {
        DemoGuard {
            enabled,
            exclude: exclude.iter().map(|e| e.trim().to_string()).collect(),
        }
    }

    pub fn allows(&self, method: &str, path: &str) -> bool {
        if !self.enabled || method == "GET" || method == "OPTIONS" {
            return true;
        }
        self.exclude.contains(&format!("{method} {path}"))
    }
}
