//! The person on the other end of a transfer.
//!
//! - [`UserInteraction`] — supplies OAuth authorization codes and confirmations
//! - [`ConsoleInteraction`] — reads answers from stdin
//! - [`NonInteractive`] — declines everything; used where nobody can answer

use std::future::Future;
use std::io::{BufRead, Write};

/// Source of answers that only a human can give.
pub trait UserInteraction: Send + Sync {
    /// Show `authorization_url` and return the code the provider redirected
    /// back with, or `None` if the user did not supply one.
    fn authorization_code(
        &self,
        authorization_url: &str,
    ) -> impl Future<Output = Option<String>> + Send;

    /// Ask a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&self, question: &str) -> impl Future<Output = bool> + Send;
}

/// Prompts on stdout and reads answers from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleInteraction {
    /// Also try to open the authorization page in the default browser.
    pub open_browser: bool,
}

impl ConsoleInteraction {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

impl UserInteraction for ConsoleInteraction {
    async fn authorization_code(&self, authorization_url: &str) -> Option<String> {
        println!("Please visit this URL to authorize the application:\n  {authorization_url}");
        if self.open_browser {
            open_in_browser(authorization_url).await;
        }
        prompt("Enter the authorization code received: ")
            .await
            .filter(|code| !code.is_empty())
    }

    async fn confirm(&self, question: &str) -> bool {
        prompt(&format!("{question} (y/n): "))
            .await
            .map(|answer| is_yes(&answer))
            .unwrap_or(false)
    }
}

/// Never has an answer. A token refresh through this surface always fails,
/// which turns an expired token into an authentication error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl UserInteraction for NonInteractive {
    async fn authorization_code(&self, _authorization_url: &str) -> Option<String> {
        tracing::warn!("Authorization code requested but no user is available to supply one");
        None
    }

    async fn confirm(&self, _question: &str) -> bool {
        false
    }
}

/// Best effort; the URL has already been printed.
async fn open_in_browser(url: &str) {
    let url = url.to_string();
    match tokio::task::spawn_blocking(move || webbrowser::open(&url)).await {
        Ok(Ok(())) => tracing::debug!("Opened authorization page in browser"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Could not open browser"),
        Err(e) => tracing::warn!(error = %e, "Browser task failed"),
    }
}

/// Print `message` and read one trimmed line from stdin off the async runtime.
///
/// Returns `None` on EOF or read failure.
pub async fn prompt(message: &str) -> Option<String> {
    let message = message.to_string();
    tokio::task::spawn_blocking(move || prompt_blocking(&message))
        .await
        .ok()
        .flatten()
}

/// Blocking variant of [`prompt`] for code that runs before the runtime matters.
pub fn prompt_blocking(message: &str) -> Option<String> {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "{message}");
    let _ = stdout.flush();

    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read from stdin");
            None
        }
    }
}

/// `y` / `yes` in any case.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
