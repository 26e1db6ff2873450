//! Secret backends for reading the Dead Man's Snitch API key.
//!
//! Each backend shells out to the vendor CLI (`op`, `bw`, `keepassxc-cli`) and is
//! configured through `SNITCH_*` environment variables; see [`SecretBackend::command`].

use std::process::{Command, Stdio};

/// Secret manager able to hand over the API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBackend {
    OnePassword,
    Bitwarden,
    Keepassxc,
}

/// A fully resolved backend invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretCommand {
    pub program: &'static str,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl SecretBackend {
    /// Lookup order used by [`crate::helpers::get_api_key`].
    pub const ALL: [SecretBackend; 3] = [
        SecretBackend::OnePassword,
        SecretBackend::Bitwarden,
        SecretBackend::Keepassxc,
    ];

    /// Build the command for this backend from configuration looked up through `var`.
    ///
    /// - 1Password: `SNITCH_OP_ENTRY_PATH` (`op://Vault/Item`) or `SNITCH_OP_VAULT` +
    ///   `SNITCH_OP_ITEM`; field from `SNITCH_OP_FIELD` (default `API_KEY`).
    /// - Bitwarden: `SNITCH_BW_ITEM_ID`; optional `SNITCH_BW_SESSION` passed as `BW_SESSION`.
    /// - KeePassXC: `SNITCH_KPXC_DB` + `SNITCH_KPXC_ENTRY`; attribute from
    ///   `SNITCH_KPXC_ATTRIBUTE` (default `Password`).
    ///
    /// Returns `None` when the backend is not configured.
    pub fn command<F>(&self, var: F) -> Option<SecretCommand>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            var(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        match self {
            SecretBackend::OnePassword => {
                let field = var("SNITCH_OP_FIELD").unwrap_or_else(|| "API_KEY".to_string());
                let uri = match var("SNITCH_OP_ENTRY_PATH") {
                    Some(path) => format!("{}/{}", path.trim_end_matches('/'), field),
                    None => {
                        let vault = var("SNITCH_OP_VAULT")?;
                        let item = var("SNITCH_OP_ITEM")?;
                        format!("op://{}/{}/{}", vault, item, field)
                    }
                };
                Some(SecretCommand {
                    program: "op",
                    args: vec!["read".to_string(), uri],
                    env: vec![],
                })
            }
            SecretBackend::Bitwarden => {
                let id = var("SNITCH_BW_ITEM_ID")?;
                let env = var("SNITCH_BW_SESSION")
                    .map(|s| ("BW_SESSION".to_string(), s))
                    .into_iter()
                    .collect();
                Some(SecretCommand {
                    program: "bw",
                    args: vec!["get".to_string(), "password".to_string(), id],
                    env,
                })
            }
            SecretBackend::Keepassxc => {
                let db = var("SNITCH_KPXC_DB")?;
                let entry = var("SNITCH_KPXC_ENTRY")?;
                let attr = var("SNITCH_KPXC_ATTRIBUTE").unwrap_or_else(|| "Password".to_string());
                Some(SecretCommand {
                    program: "keepassxc-cli",
                    args: vec!["show".to_string(), "-a".to_string(), attr, db, entry],
                    env: vec![],
                })
            }
        }
    }

    /// Read the key from this backend using the process environment.
    pub fn read(&self) -> Option<String> {
        let cmd = self.command(|name| std::env::var(name).ok())?;
        tracing::debug!(backend = ?self, program = cmd.program, "reading API key");
        cmd.run()
    }
}

impl SecretCommand {
    /// Run the command; stderr is discarded so secrets never leak into output.
    pub fn run(&self) -> Option<String> {
        let out = Command::new(self.program)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !out.status.success() {
            return None;
        }
        String::from_utf8(out.stdout)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
