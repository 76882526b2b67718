//! Shared helpers for the `bordereau` command-line client.

use anyhow::Context;
use bordereau_core::models::{DocumentType, ScanQueueItem};
use bordereau_scan::RejectedBordereau;
use serde::Serialize;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Parse a comma-separated list of document types, e.g. `BULLETIN_SOIN,reclamation`.
pub fn parse_types(list: &str) -> anyhow::Result<Vec<DocumentType>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<DocumentType>())
        .collect()
}

pub fn print_queue_table(items: &[ScanQueueItem]) {
    println!("\n=== Scan Queue ===\n");
    if items.is_empty() {
        println!("No bordereau waiting for scan.");
        return;
    }

    println!(
        "{:<26} {:<20} {:<24} {:>6} {:>6} {:<8} {:>12}",
        "ID", "Reference", "Client", "BS", "Docs", "Priority", "Received"
    );
    println!("{}", "-".repeat(110));

    for item in items {
        println!(
            "{:<26} {:<20} {:<24} {:>6} {:>6} {:<8} {:>12}",
            truncate_string(&item.id, 26),
            truncate_string(&item.reference, 20),
            truncate_string(item.client_name.as_deref().unwrap_or("-"), 24),
            item.nombre_bs,
            item.documents_count,
            item.priority
                .map(|p| format!("{:?}", p).to_uppercase())
                .unwrap_or_else(|| "-".to_string()),
            item.date_reception
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!();
}

pub fn print_rejected_table(rejected: &[RejectedBordereau]) {
    println!("\n=== Returned to Scan ===\n");
    if rejected.is_empty() {
        println!("No bordereau returned to scan.");
        return;
    }

    for entry in rejected {
        let b = &entry.bordereau;
        println!(
            "{} ({}) client: {}",
            b.reference,
            b.id,
            b.client_name().unwrap_or("-")
        );
        if let Some(err) = &entry.detail_error {
            println!("    documents unavailable: {}", err);
            continue;
        }
        if b.documents.is_empty() {
            println!("    no documents");
        }
        for doc in &b.documents {
            println!(
                "    {:<40} {:<24} {}",
                truncate_string(&doc.name, 40),
                doc.doc_type.map(|t| t.label()).unwrap_or("-"),
                doc.status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
    }
    println!();
}
