/// Pi Network platform API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.minepi.com/v2";

/// User-facing OAuth2 authorization page.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://minepi.com/oauth";

/// Redirect target registered with the Pi developer portal.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/callback";

/// OAuth2 scope requested during authorization.
pub const DEFAULT_OAUTH_SCOPE: &str = "payments";

/// Per-request timeout for every outbound call.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Env file that holds OAuth credentials and receives refreshed tokens.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// JSON array of transfer outcomes.
pub const DEFAULT_LEDGER_PATH: &str = "logs/transaction_log.json";

/// Key under which refreshed access tokens are appended to the env file.
pub const ACCESS_TOKEN_KEY: &str = "PI_ACCESS_TOKEN";

/// Token exchange endpoint, relative to the API base URL.
pub const TOKEN_PATH: &str = "/oauth/token";

/// Prefix of the memo attached to prepared payments.
pub const MEMO_PREFIX: &str = "Transfer via pi-transfer";
