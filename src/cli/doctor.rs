//! Environment readiness check.

use crate::browser::chromium::find_chromium;
use crate::config::AppConfig;
use anyhow::Result;

/// Check Chromium availability, store path, and credentials.
pub async fn run() -> Result<()> {
    println!("Prospect Doctor");
    println!("===============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Chromium
    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome/Chromium or set PROSPECT_CHROMIUM_PATH."
        ),
    }

    // Store path
    let config = AppConfig::from_env();
    let store_dir = config
        .db_path
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| config.db_path.clone());
    if store_dir.exists() || std::fs::create_dir_all(&store_dir).is_ok() {
        println!("[OK] Store path {} is writable", config.db_path.display());
    } else {
        println!("[!!] Cannot create store directory: {}", store_dir.display());
    }

    // Credentials
    if config.credentials.is_some() {
        println!("[OK] Login credentials configured");
    } else {
        println!(
            "[!!] No login credentials (PROSPECT_LOGIN_USER / PROSPECT_LOGIN_PASSWORD). \
             Scrapes will only work against an already-authenticated profile."
        );
    }

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
