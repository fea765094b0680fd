//! Print the OCR audit log.

use console::style;

use crate::config::Settings;
use crate::storage::{AuditStore, FsAuditStore};

pub async fn cmd_logs(settings: &Settings) -> anyhow::Result<()> {
    let store = FsAuditStore::from_settings(settings);

    match store.read_log().await? {
        Some(contents) => print!("{}", contents),
        None => println!("{} No logs yet.", style("!").yellow()),
    }

    Ok(())
}
