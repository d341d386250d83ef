//! Yahoo Finance chart endpoint settings

#[derive(Debug, Clone)]
pub struct YahooApiConfig {
    pub base_url: &'static str,
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
    /// Yahoo rejects requests without a browser-ish agent string.
    pub user_agent: &'static str,
}

impl Default for YahooApiConfig {
    fn default() -> Self {
        Self {
            base_url: YAHOO.base_url,
            timeout_ms: YAHOO.timeout_ms,
            retries: YAHOO.retries,
            backoff_ms: YAHOO.backoff_ms,
            user_agent: YAHOO.user_agent,
        }
    }
}

pub const YAHOO: YahooApiConfig = YahooApiConfig {
    base_url: "https://query1.finance.yahoo.com/v8/finance/chart",
    timeout_ms: 10_000,
    retries: 3,
    backoff_ms: 2_000,
    user_agent: "Mozilla/5.0 (X11; Linux x86_64) sma-sweep/0.1",
};
