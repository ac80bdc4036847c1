use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKey {
    ServerPort,
    WebhookSecret,
    WebhookTimeoutSecs,
    WebhookMaxAttempts,
    WorkerConcurrency,
    RenderSteps,
    RenderStepDelayMs,
    RenderResultUrl,
    ShutdownGraceSecs,
    LogFormat,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::WebhookSecret => "WEBHOOK_SECRET",
            EnvKey::WebhookTimeoutSecs => "WEBHOOK_TIMEOUT_SECS",
            EnvKey::WebhookMaxAttempts => "WEBHOOK_MAX_ATTEMPTS",
            EnvKey::WorkerConcurrency => "WORKER_CONCURRENCY",
            EnvKey::RenderSteps => "RENDER_STEPS",
            EnvKey::RenderStepDelayMs => "RENDER_STEP_DELAY_MS",
            EnvKey::RenderResultUrl => "RENDER_RESULT_URL",
            EnvKey::ShutdownGraceSecs => "SHUTDOWN_GRACE_SECS",
            EnvKey::LogFormat => "LOG_FORMAT",
        }
    }
}

/// Look a key up in the process environment.
pub fn process(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok()
}

/// Typed access to `EnvKey`s over any lookup function.
pub struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(EnvKey) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    pub fn get(&self, key: EnvKey) -> Option<String> {
        (self.lookup)(key)
    }

    pub fn get_or(&self, key: EnvKey, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse the trimmed value; missing or unparseable values yield `default`.
    pub fn get_parsed<T: FromStr>(&self, key: EnvKey, default: T) -> T {
        self.get(key)
            .and_then(|val| val.trim().parse::<T>().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(value: Option<&'static str>) -> EnvReader<impl Fn(EnvKey) -> Option<String>> {
        EnvReader::new(move |key| match key {
            EnvKey::WorkerConcurrency => value.map(str::to_string),
            _ => None,
        })
    }

    #[test]
    fn test_get_parsed_trims_whitespace() {
        assert_eq!(reader(Some(" 12 ")).get_parsed(EnvKey::WorkerConcurrency, 8usize), 12);
    }

    #[test]
    fn test_get_parsed_falls_back_on_garbage_or_absence() {
        assert_eq!(reader(Some("lots")).get_parsed(EnvKey::WorkerConcurrency, 8usize), 8);
        assert_eq!(reader(Some("-3")).get_parsed(EnvKey::WorkerConcurrency, 8usize), 8);
        assert_eq!(reader(None).get_parsed(EnvKey::WorkerConcurrency, 8usize), 8);
    }

    #[test]
    fn test_get_or_only_defaults_missing_keys() {
        assert_eq!(reader(Some("")).get_or(EnvKey::WorkerConcurrency, "x"), "");
        assert_eq!(reader(None).get_or(EnvKey::LogFormat, "text"), "text");
    }
}
