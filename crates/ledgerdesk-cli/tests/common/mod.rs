use std::path::Path;
use std::process::{Command, Output};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ledgerdesk_core::{AccessToken, RefreshToken, Session, SessionStore, StorageNamespace};
use ledgerdesk_file::FileSessionStore;
use serde_json::Value;

/// Build an unsigned JWT with the given claims.
pub fn jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

/// Open the store the CLI uses for `namespace` under `home`.
pub fn store(home: &Path, namespace: &str) -> FileSessionStore {
    FileSessionStore::new(
        home.join("sessions"),
        StorageNamespace::new(namespace).unwrap(),
    )
}

/// Persist a session where the CLI will find it.
pub async fn seed_session(home: &Path, namespace: &str, access: &str, refresh: &str) {
    let session = Session::new(AccessToken::new(access), RefreshToken::new(refresh));
    store(home, namespace).save(&session).await.unwrap();
}

/// Run the CLI with an isolated HOME, config dir and session store.
pub async fn run_cli(args: &[&str], home: &Path, api_url: &str) -> Output {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let home = home.to_path_buf();
    let api_url = api_url.to_string();

    tokio::task::spawn_blocking(move || {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ledgerdesk"));
        cmd.args(&args);
        cmd.env("HOME", &home);
        cmd.env("XDG_CONFIG_HOME", home.join("config"));
        cmd.env("XDG_DATA_HOME", home.join("data"));
        cmd.env("LEDGERDESK_STORE_DIR", home.join("sessions"));
        cmd.env("LEDGERDESK_API_URL", &api_url);
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("LEDGERDESK_KIND");
        cmd.env_remove("RUST_LOG");
        cmd.output().expect("Failed to execute CLI")
    })
    .await
    .unwrap()
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run_cli(args, home, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}
