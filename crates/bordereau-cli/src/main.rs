//! Bordereau CLI: manual scan workflow from the command line.
//!
//! Set BORDEREAU_API_URL (or API_URL) and BORDEREAU_API_TOKEN (Bearer) or
//! BORDEREAU_API_KEY (X-API-Key).

use anyhow::Context;
use bordereau_api_client::ApiClient;
use bordereau_cli::{init_tracing, parse_types, print_json, print_queue_table, print_rejected_table};
use bordereau_core::models::{DocumentType, ScanFile, ScanQueueItem};
use bordereau_core::{ClientConfig, ErrorMetadata, ScanError};
use bordereau_scan::{
    CorrectionDesk, DocumentUploader, FileSelection, Poller, QueryClient, RejectedSource,
    ScanQueueSource, ScanSession,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bordereau", about = "Manual scan workflow client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List bordereaux waiting for manual scan
    Queue {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Start scanning a bordereau
    Start {
        /// Bordereau ID
        id: String,
    },
    /// Upload documents; the endpoint follows the bordereau's current status
    Upload {
        /// Bordereau ID
        id: String,
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Type applied to every file, e.g. BULLETIN_SOIN
        #[arg(long = "type")]
        bulk_type: Option<DocumentType>,
        /// Per-file types, comma separated, overriding --type by position
        #[arg(long)]
        types: Option<String>,
        /// Notes attached to the upload
        #[arg(long)]
        notes: Option<String>,
    },
    /// Run a full session: start, upload, then validate
    Scan {
        /// Bordereau ID (must be in the scan queue)
        id: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long = "type")]
        bulk_type: Option<DocumentType>,
        #[arg(long)]
        types: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark a scan complete
    Validate {
        id: String,
    },
    /// Abort a scan
    Cancel {
        id: String,
        /// Why the scan is cancelled (required)
        #[arg(long)]
        reason: String,
    },
    /// List bordereaux returned to scan, with their documents
    Rejected {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Replace an existing document of a returned bordereau
    Replace {
        id: String,
        /// Name of the document to replace
        #[arg(long)]
        document: String,
        /// New file
        file: PathBuf,
    },
    /// Add a document missing from a returned bordereau
    AddMissing {
        id: String,
        file: PathBuf,
        #[arg(long = "type")]
        doc_type: Option<DocumentType>,
    },
    /// Correct reference and/or client of a returned bordereau
    Modify {
        id: String,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        client_id: Option<String>,
    },
    /// Finish the correction pass of a returned bordereau
    Complete {
        id: String,
    },
    /// Scan counters for the current operator
    Stats,
    /// Whether another scan pass is allowed on a bordereau
    Capability {
        id: String,
    },
    /// Document counts per type and status
    DocStats,
    /// Poll the scan queue and the returned bordereaux until Ctrl-C
    Watch,
}

fn load_selection(
    files: &[PathBuf],
    bulk_type: Option<DocumentType>,
    types: Option<&str>,
) -> anyhow::Result<FileSelection> {
    let mut selection = FileSelection::new();
    selection.set_bulk_type(bulk_type);
    for path in files {
        let file = ScanFile::from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        selection.add(file, None);
    }
    if let Some(types) = types {
        for (index, doc_type) in parse_types(types)?.into_iter().enumerate() {
            selection.set_type(index, Some(doc_type))?;
        }
    }
    for warning in selection.warnings() {
        eprintln!("warning: {}", warning);
    }
    Ok(selection)
}

fn read_file(path: &Path) -> anyhow::Result<ScanFile> {
    ScanFile::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Print the user-facing message and keep the full error for the exit status.
fn report(err: ScanError) -> anyhow::Error {
    eprintln!("error: {}", err.user_message());
    anyhow::Error::new(err)
}

async fn find_in_queue(client: &ApiClient, id: &str) -> anyhow::Result<ScanQueueItem> {
    client
        .scan_queue()
        .await
        .map_err(report)?
        .into_iter()
        .find(|item| item.id == id)
        .with_context(|| format!("Bordereau {} is not in the scan queue", id))
}

async fn watch(client: Arc<ApiClient>, config: &ClientConfig) -> anyhow::Result<()> {
    let queries = QueryClient::new();
    let queue = Poller::spawn(
        ScanQueueSource::new(Arc::clone(&client)),
        config.queue_poll_interval(),
        &queries,
    );
    let rejected = Poller::spawn(
        RejectedSource::new(Arc::clone(&client)),
        config.rejected_poll_interval(),
        &queries,
    );
    let mut queue_rx = queue.subscribe();
    let mut rejected_rx = rejected.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = queue_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = queue_rx.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    print_queue_table(&snapshot.data);
                }
            }
            changed = rejected_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = rejected_rx.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    print_rejected_table(&snapshot.data);
                }
            }
        }
    }

    tracing::info!("Stopping pollers");
    queue.shutdown().await;
    rejected.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::from_env()?;
    let client = Arc::new(ApiClient::from_config(&config).context(
        "Failed to create API client. Set BORDEREAU_API_TOKEN or BORDEREAU_API_KEY",
    )?);

    let cli = Cli::parse();

    match cli.command {
        Commands::Queue { format } => {
            let items = client.scan_queue().await.map_err(report)?;
            match format {
                OutputFormat::Table => print_queue_table(&items),
                OutputFormat::Json => print_json(&items)?,
            }
        }
        Commands::Start { id } => {
            let response = client.start_scan(&id).await.map_err(report)?;
            print_json(&response)?;
        }
        Commands::Upload {
            id,
            files,
            bulk_type,
            types,
            notes,
        } => {
            let selection = load_selection(&files, bulk_type, types.as_deref())?;
            let outcome = DocumentUploader::new(Arc::clone(&client))
                .upload(&id, &selection, notes.as_deref())
                .await
                .map_err(report)?;
            print_json(&serde_json::json!({
                "bordereauId": outcome.bordereau_id,
                "target": format!("{:?}", outcome.target),
                "documentIds": outcome.document_ids,
                "message": outcome.message,
                "errors": outcome.file_errors,
            }))?;
        }
        Commands::Scan {
            id,
            files,
            bulk_type,
            types,
            notes,
        } => {
            let item = find_in_queue(&client, &id).await?;
            let mut session = ScanSession::new(Arc::clone(&client), QueryClient::new());
            *session.selection_mut() = load_selection(&files, bulk_type, types.as_deref())?;
            if let Some(notes) = notes {
                session.set_notes(notes);
            }

            session.start_scan(item).await.map_err(report)?;
            let outcome = session.upload().await.map_err(report)?;
            println!("{} document(s) uploaded", outcome.document_ids.len());
            session.validate().await.map_err(report)?;
            if let Some(notice) = session.take_notice() {
                println!("{}", notice);
            }
        }
        Commands::Validate { id } => {
            let response = client.validate_scan(&id).await.map_err(report)?;
            print_json(&response)?;
        }
        Commands::Cancel { id, reason } => {
            let reason = reason.trim();
            if reason.is_empty() {
                return Err(report(ScanError::MissingCancelReason));
            }
            let response = client.cancel_scan(&id, reason).await.map_err(report)?;
            print_json(&response)?;
        }
        Commands::Rejected { format } => {
            let mut desk = CorrectionDesk::new(Arc::clone(&client), QueryClient::new());
            let rejected = desk.reload().await.map_err(report)?;
            match format {
                OutputFormat::Table => print_rejected_table(rejected),
                OutputFormat::Json => {
                    let bordereaux: Vec<_> = rejected.iter().map(|r| &r.bordereau).collect();
                    print_json(&bordereaux)?
                }
            }
        }
        Commands::Replace { id, document, file } => {
            let file = read_file(&file)?;
            let mut desk = CorrectionDesk::new(Arc::clone(&client), QueryClient::new());
            desk.replace_document(&id, &document, &file)
                .await
                .map_err(report)?;
            if let Some(notice) = desk.take_notice() {
                println!("{}", notice);
            }
        }
        Commands::AddMissing { id, file, doc_type } => {
            let file = read_file(&file)?;
            let mut desk = CorrectionDesk::new(Arc::clone(&client), QueryClient::new());
            desk.select_missing_type(doc_type);
            desk.add_missing_document(&id, &file)
                .await
                .map_err(report)?;
            if let Some(notice) = desk.take_notice() {
                println!("{}", notice);
            }
        }
        Commands::Modify {
            id,
            reference,
            client_id,
        } => {
            let mut desk = CorrectionDesk::new(Arc::clone(&client), QueryClient::new());
            let changes = desk
                .modify_bordereau(&id, reference.as_deref(), client_id.as_deref())
                .await
                .map_err(report)?;
            print_json(&changes)?;
        }
        Commands::Complete { id } => {
            let mut desk = CorrectionDesk::new(Arc::clone(&client), QueryClient::new());
            desk.complete_corrections(&id).await.map_err(report)?;
            if let Some(notice) = desk.take_notice() {
                println!("{}", notice);
            }
        }
        Commands::Stats => {
            let stats = client.scan_statistics().await.map_err(report)?;
            print_json(&stats)?;
        }
        Commands::Capability { id } => {
            let capability = client.multi_scan_capability(&id).await.map_err(report)?;
            print_json(&capability)?;
        }
        Commands::DocStats => {
            let stats = client.document_type_stats().await.map_err(report)?;
            print_json(&stats)?;
        }
        Commands::Watch => watch(client, &config).await?,
    }

    Ok(())
}
