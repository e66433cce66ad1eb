use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::LoginBoundary;
use crate::client::AdminClient;
use crate::config::ClientConfig;
use crate::session::storage::FileStorage;

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("OPTIMA_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("optima").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Prints the login prompt the first time the session is forcibly ended
#[derive(Debug, Default)]
pub struct CliBoundary {
    fired: AtomicBool,
}

impl CliBoundary {
    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl LoginBoundary for CliBoundary {
    fn redirect_to_login(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            eprintln!("Session expired. Run 'optima auth login <email>' to sign in again.");
        }
    }
}

/// Build a client over the CLI's storage directory and restore any saved session
pub async fn connect() -> anyhow::Result<AdminClient> {
    let storage = Arc::new(FileStorage::new(get_config_dir()?));
    let client = AdminClient::new(ClientConfig::from_env(), storage, Arc::new(CliBoundary::default()))?;
    client.auth.rehydrate().await?;
    Ok(client)
}

/// Like `connect`, but fails unless a session was restored
pub async fn connect_signed_in() -> anyhow::Result<AdminClient> {
    let client = connect().await?;
    if !client.session().is_logged_in() {
        return Err(anyhow::anyhow!("Not logged in. Run 'optima auth login <email>' first"));
    }
    Ok(client)
}

/// Use the provided password, else `OPTIMA_PASSWORD`, else read one line from stdin
pub fn resolve_password(provided: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }
    if let Ok(password) = std::env::var("OPTIMA_PASSWORD") {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
