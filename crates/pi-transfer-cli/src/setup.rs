//! First-run bootstrapping of the env file that holds OAuth credentials.

use std::io;
use std::path::Path;

use pi_transfer::constants::DEFAULT_REDIRECT_URI;
use pi_transfer::interaction::{is_yes, prompt_blocking};

const TEMPLATE_HEADER: &str = "# Pi Network OAuth Credentials";

const SETUP_GUIDE: &str = "\
To set up Pi Network API access:
1. Go to https://developers.minepi.com/ and create a developer account
2. Create a new app and get your Client ID and Client Secret
3. Set the redirect URI to http://localhost:8000/callback
4. Add these credentials to the env file
";

/// Create a credential template at `path` if nothing is there yet.
///
/// Returns `true` when a new file was written.
pub fn ensure_env_file(path: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(
        path,
        format!(
            "{TEMPLATE_HEADER}\nPI_CLIENT_ID=\nPI_CLIENT_SECRET=\nPI_REDIRECT_URI={DEFAULT_REDIRECT_URI}\n"
        ),
    )?;
    tracing::info!(path = %path.display(), "Created env file, fill in your Pi Network OAuth credentials");
    Ok(true)
}

/// Rewrite `KEY=` lines in place; keys that are not present are appended.
pub fn set_env_values(path: &Path, values: &[(&str, &str)]) -> io::Result<()> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    let mut seen = vec![false; values.len()];

    let mut lines: Vec<String> = content
        .lines()
        .map(|line| {
            for (i, (key, value)) in values.iter().enumerate() {
                if line.starts_with(&format!("{key}=")) {
                    seen[i] = true;
                    return format!("{key}={value}");
                }
            }
            line.to_string()
        })
        .collect();

    for (i, (key, value)) in values.iter().enumerate() {
        if !seen[i] {
            lines.push(format!("{key}={value}"));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    std::fs::write(path, out)
}

/// Offer to collect missing client credentials on the console.
///
/// Returns `true` if credentials were written to `path` and loaded into the
/// process environment.
pub fn prompt_for_credentials(path: &Path) -> io::Result<bool> {
    tracing::warn!("Pi Network OAuth credentials not set, please update the env file");
    println!("\n{SETUP_GUIDE}");

    let answer = prompt_blocking("Would you like to enter credentials now? (y/n): ");
    if !answer.as_deref().map(is_yes).unwrap_or(false) {
        tracing::info!(path = %path.display(), "Update the env file with your credentials before transferring");
        return Ok(false);
    }

    let client_id = prompt_blocking("Enter Pi Network Client ID: ").unwrap_or_default();
    let client_secret = prompt_blocking("Enter Pi Network Client Secret: ").unwrap_or_default();
    if client_id.is_empty() || client_secret.is_empty() {
        tracing::warn!("Credentials left blank, nothing saved");
        return Ok(false);
    }

    set_env_values(
        path,
        &[
            ("PI_CLIENT_ID", client_id.as_str()),
            ("PI_CLIENT_SECRET", client_secret.as_str()),
        ],
    )?;
    dotenvy::from_path_override(path).map_err(io::Error::other)?;
    tracing::info!("Credentials updated successfully");
    Ok(true)
}
