use sonarpipe_core::Config;

fn env_non_empty(k: &str) -> Option<String> {
    std::env::var(k).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn has_env(k: &str) -> bool {
    env_non_empty(k).is_some()
}

/// `SONARPIPE_PERPLEXITY_API_KEY` wins over `PERPLEXITY_API_KEY`.
pub(crate) fn api_key_from_env() -> Option<String> {
    env_non_empty("SONARPIPE_PERPLEXITY_API_KEY").or_else(|| env_non_empty("PERPLEXITY_API_KEY"))
}

#[derive(clap::Args, Debug, Clone, Default)]
pub(crate) struct ConfigArgs {
    /// Perplexity API key. Prefer the env var (PERPLEXITY_API_KEY or
    /// SONARPIPE_PERPLEXITY_API_KEY) so the key stays out of process listings.
    #[arg(long, global = true)]
    pub api_key: Option<String>,
    /// Chat-completions endpoint URL, e.g. https://api.perplexity.ai/chat/completions
    #[arg(long, global = true, env = "BASE_URL")]
    pub base_url: Option<String>,
    /// Upstream request timeout (ms). Unset or 0 keeps the HTTP client default.
    #[arg(long, global = true, env = "SONARPIPE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

impl ConfigArgs {
    /// Flag first, then environment. Fails when either required value is missing.
    pub fn load(&self) -> sonarpipe_core::Result<Config> {
        let key = self
            .api_key
            .clone()
            .filter(|v| !v.trim().is_empty())
            .or_else(api_key_from_env);
        Config::new(key.as_deref(), self.base_url.as_deref(), self.timeout_ms)
    }
}

/// Opt-in `KEY=VALUE` file named by `SONARPIPE_ENV_FILE`.
///
/// MCP hosts often launch servers outside an interactive shell, so this gives
/// one place to keep keys. Existing process env is never overridden and values
/// are never logged. Returns the keys that were set.
pub(crate) fn load_env_file() -> Vec<String> {
    let Some(p) = env_non_empty("SONARPIPE_ENV_FILE") else {
        return Vec::new();
    };
    let Ok(txt) = std::fs::read_to_string(p.trim()) else {
        return Vec::new();
    };
    let mut set = Vec::new();
    for (k, v) in parse_env_lines(&txt) {
        if std::env::var_os(&k).is_none() {
            std::env::set_var(&k, v);
            set.push(k);
        }
    }
    set
}

fn parse_env_lines(txt: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in txt.lines() {
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let s = s.strip_prefix("export ").unwrap_or(s);
        let Some((k, v)) = s.split_once('=') else {
            continue;
        };
        let k = k.trim();
        if k.is_empty() {
            continue;
        }
        let v = v.trim();
        let v = v
            .strip_prefix('"')
            .and_then(|x| x.strip_suffix('"'))
            .unwrap_or(v);
        out.push((k.to_string(), v.to_string()));
    }
    out
}
