use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use sentinela::client::{LogSource, StagingApi};
use sentinela::config::{validate_config, ConsoleConfig};
use sentinela::model::{ClassificationBranch, DocType};
use sentinela::monitor::MonitorPhase;
use sentinela::registry::DEFAULT_LIST_LIMIT;
use sentinela::staging::{ClassifierState, Field};
use sentinela::{
    init_tracing, load_or_default, BatchProcessor, DocumentRegistry, HttpBackend, JobMonitor,
    LogTailFeed, MonitorSettings, Pacer, ScanSelection, StagingReview, UploadRequest,
};

mod render;

#[derive(Parser, Debug)]
#[command(name = "sentinela", version, about = "Sentinela document console")]
struct Cli {
    /// Config file (YAML or JSON)
    #[arg(long, short, env = "SENTINELA_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Backend API root, e.g. http://localhost:8000/api
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Registry documents
    #[command(subcommand)]
    Docs(DocsCommand),
    /// Documents waiting for review
    #[command(subcommand)]
    Staging(StagingCommand),
    /// Classify a staging document and approve it into the queue
    Review(ReviewArgs),
    /// Activation queue
    #[command(subcommand)]
    Queue(QueueCommand),
    /// Backend local-scan folder
    #[command(subcommand)]
    Scan(ScanCommand),
    /// Upload a file into staging
    Upload(UploadArgs),
    /// Backend log
    #[command(subcommand)]
    Logs(LogsCommand),
}

#[derive(Subcommand, Debug)]
enum DocsCommand {
    List {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    Stats,
    /// Delete documents by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum StagingCommand {
    List,
    Queued,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Branch {
    Legislation,
    Generic,
}

impl From<Branch> for ClassificationBranch {
    fn from(value: Branch) -> Self {
        match value {
            Branch::Legislation => ClassificationBranch::Legislation,
            Branch::Generic => ClassificationBranch::Generic,
        }
    }
}

#[derive(Args, Debug)]
struct ReviewArgs {
    /// Staging document id
    id: String,
    /// Override the inferred classification
    #[arg(long, value_enum)]
    branch: Option<Branch>,
    #[arg(long)]
    sphere: Option<String>,
    #[arg(long)]
    doc_type: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    publication_date: Option<String>,
    #[arg(long)]
    ementa: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,
    /// Print the extracted text before submitting
    #[arg(long)]
    show_text: bool,
}

impl ReviewArgs {
    fn fields(&self) -> Vec<(Field, &str)> {
        [
            (Field::Sphere, &self.sphere),
            (Field::DocType, &self.doc_type),
            (Field::PublicationDate, &self.publication_date),
            (Field::Ementa, &self.ementa),
            (Field::Description, &self.description),
            (Field::CustomTags, &self.tags),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

#[derive(Subcommand, Debug)]
enum QueueCommand {
    /// Activate every queued document, one at a time
    Run {
        /// Delay between activations; overrides the config
        #[arg(long)]
        pacing_ms: Option<u64>,
        /// Skip log-based progress for each item
        #[arg(long)]
        no_monitor: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ScanCommand {
    List,
    /// Send scan files for processing
    Process {
        /// Type for every selected file
        #[arg(long)]
        doc_type: Option<String>,
        /// Per-file type, FILE=TYPE
        #[arg(long = "type", value_name = "FILE=TYPE")]
        types: Vec<String>,
        /// Leave a file out
        #[arg(long)]
        exclude: Vec<String>,
        #[arg(long, default_value = "")]
        tags: String,
    },
}

#[derive(Args, Debug)]
struct UploadArgs {
    path: PathBuf,
    #[arg(long, default_value = "documento")]
    doc_type: String,
    #[arg(long, default_value = "")]
    tags: String,
    /// Store under a different filename
    #[arg(long)]
    name: Option<String>,
}

#[derive(Subcommand, Debug)]
enum LogsCommand {
    /// Print the last lines of the backend log
    Tail {
        #[arg(long, short = 'n')]
        lines: Option<usize>,
    },
    /// Follow a job's progress until it finishes
    Watch {
        /// Filename or id to focus the display on
        #[arg(long)]
        token: Option<String>,
    },
}

fn load_settings(cli: &Cli) -> anyhow::Result<ConsoleConfig> {
    let mut config = load_or_default(cli.config.as_deref()).context("loading configuration")?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
        validate_config(&config)?;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_settings(&cli)?;
    init_tracing(&config.logging)?;
    debug!(command = ?cli.command, "starting");

    let backend = Arc::new(HttpBackend::new(&config.api)?);

    match cli.command {
        Command::Docs(cmd) => docs(cmd, backend).await,
        Command::Staging(cmd) => staging(cmd, &backend).await,
        Command::Review(args) => review(args, &backend).await,
        Command::Queue(QueueCommand::Run {
            pacing_ms,
            no_monitor,
        }) => queue_run(&config, backend, pacing_ms, !no_monitor).await,
        Command::Scan(cmd) => scan(cmd, &backend).await,
        Command::Upload(args) => upload(args, &backend).await,
        Command::Logs(cmd) => logs(cmd, &config, backend).await,
    }
}

async fn docs(cmd: DocsCommand, backend: Arc<HttpBackend>) -> anyhow::Result<()> {
    let registry = DocumentRegistry::new(backend);
    match cmd {
        DocsCommand::List { limit, json } => {
            let docs = registry.list_documents(limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else {
                render::print_documents(&docs);
            }
        }
        DocsCommand::Stats => render::print_stats(&registry.get_stats().await?),
        DocsCommand::Delete { ids } => {
            let report = registry.delete_documents(ids.as_slice()).await;
            render::print_delete_report(&report);
            if report.deleted_count() < ids.len() {
                bail!("{} of {} deletions failed", ids.len() - report.deleted_count(), ids.len());
            }
        }
    }
    Ok(())
}

async fn staging(cmd: StagingCommand, backend: &HttpBackend) -> anyhow::Result<()> {
    match cmd {
        StagingCommand::List => render::print_staging(&backend.list_staging().await?),
        StagingCommand::Queued => render::print_queued(&backend.list_queued().await?),
    }
    Ok(())
}

async fn review(args: ReviewArgs, backend: &HttpBackend) -> anyhow::Result<()> {
    let doc = backend
        .list_staging()
        .await?
        .into_iter()
        .find(|d| d.id == args.id)
        .ok_or_else(|| anyhow!("no staging document with id '{}'", args.id))?;

    let mut review = StagingReview::open(backend, &doc).await;
    if args.show_text {
        println!("{}\n", review.preview().text());
    }

    let classifier = review.classifier_mut();
    if let Some(branch) = args.branch.map(ClassificationBranch::from) {
        if classifier.branch() != Some(branch) {
            if classifier.state() != ClassifierState::Unclassified {
                classifier.reclassify()?;
            }
            classifier.classify(branch)?;
        }
    } else if classifier.state() == ClassifierState::Unclassified {
        bail!("'{}' has no usable suggested type; pass --branch", doc.filename);
    }

    for (field, value) in args.fields() {
        classifier.set_field(field, value)?;
    }

    let queued = review.submit().await?;
    println!("queued {} as {} ({})", queued.filename, queued.doc_type, queued.branch());
    Ok(())
}

async fn queue_run(
    config: &ConsoleConfig,
    backend: Arc<HttpBackend>,
    pacing_ms: Option<u64>,
    with_monitor: bool,
) -> anyhow::Result<()> {
    let pacer = match pacing_ms {
        Some(ms) => Pacer::from_millis(ms),
        None => Pacer::from(&config.batch),
    };
    let processor = BatchProcessor::new(pacer);

    let cancel = processor.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancelling after the current item...");
            cancel.cancel();
        }
    });

    let monitor = with_monitor.then(|| job_monitor(config, &backend));
    let monitor_renderer = monitor
        .as_ref()
        .map(|m| render::spawn_monitor_renderer(m.broadcaster().subscribe(), false));
    let batch_renderer =
        render::spawn_batch_renderer(processor.broadcaster().subscribe(), monitor);

    let outcome = processor.run_queue(backend.as_ref()).await?;
    let _ = batch_renderer.await;
    if let Some(renderer) = monitor_renderer {
        renderer.abort();
    }

    render::print_outcome(&outcome);
    info!(outcome = %outcome, "queue run finished");
    if outcome.error_count > 0 {
        bail!("{} documents failed to activate", outcome.error_count);
    }
    Ok(())
}

fn job_monitor(config: &ConsoleConfig, backend: &Arc<HttpBackend>) -> JobMonitor {
    let feed = LogTailFeed::new(backend.clone(), config.monitor.log_lines);
    JobMonitor::new(Arc::new(feed), MonitorSettings::from(&config.monitor))
}

fn parse_type_override(raw: &str) -> anyhow::Result<(&str, DocType)> {
    let (file, doc_type) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FILE=TYPE, got '{}'", raw))?;
    Ok((file.trim(), DocType::from(doc_type)))
}

async fn scan(cmd: ScanCommand, backend: &HttpBackend) -> anyhow::Result<()> {
    let mut selection = ScanSelection::load(backend).await?;
    match cmd {
        ScanCommand::List => render::print_scan(&selection),
        ScanCommand::Process {
            doc_type,
            types,
            exclude,
            tags,
        } => {
            for file in &exclude {
                selection.set_selected(file, false)?;
            }
            if let Some(doc_type) = doc_type {
                selection.apply_type_to_selected(&DocType::from(doc_type));
            }
            for raw in &types {
                let (file, doc_type) = parse_type_override(raw)?;
                selection.set_doc_type(file, doc_type)?;
            }

            let receipt = selection.process(backend, &tags).await?;
            println!(
                "{} files sent: {}",
                selection.selected_count(),
                receipt
                    .detail
                    .or(receipt.status)
                    .unwrap_or_else(|| "accepted".to_string())
            );
        }
    }
    Ok(())
}

async fn upload(args: UploadArgs, backend: &HttpBackend) -> anyhow::Result<()> {
    let mut request = UploadRequest::new(&args.path)
        .with_doc_type(DocType::from(args.doc_type))
        .with_tags(args.tags);
    if let Some(name) = args.name {
        request = request.with_custom_filename(name);
    }

    let receipt = request.send(backend).await?;
    println!(
        "uploaded {} (id {})",
        sentinela::sanitize::redact_path(&args.path),
        receipt.doc_id.as_deref().unwrap_or("-")
    );
    Ok(())
}

async fn logs(
    cmd: LogsCommand,
    config: &ConsoleConfig,
    backend: Arc<HttpBackend>,
) -> anyhow::Result<()> {
    match cmd {
        LogsCommand::Tail { lines } => {
            let lines = lines.unwrap_or(config.monitor.log_lines);
            for line in backend.tail_logs(lines).await? {
                println!("{}", line);
            }
        }
        LogsCommand::Watch { token } => {
            let monitor = job_monitor(config, &backend);
            let renderer = render::spawn_monitor_renderer(monitor.broadcaster().subscribe(), true);
            let handle = monitor.start(token);
            let mut status = handle.watch();

            tokio::select! {
                _ = tokio::signal::ctrl_c() => handle.shutdown().await,
                _ = status.wait_for(|s| matches!(s.phase, MonitorPhase::Resolved | MonitorPhase::Stopped)) => {}
            }
            let _ = renderer.await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_review_fields_skip_unset() {
        let cli = Cli::parse_from([
            "sentinela",
            "review",
            "abc",
            "--branch",
            "legislation",
            "--ementa",
            "Dispõe sobre",
            "--publication-date",
            "2024-01-10",
        ]);
        let Command::Review(args) = cli.command else {
            panic!("expected review");
        };
        assert_eq!(
            args.fields(),
            vec![
                (Field::PublicationDate, "2024-01-10"),
                (Field::Ementa, "Dispõe sobre")
            ]
        );
    }

    #[test]
    fn test_parse_type_override() {
        let (file, doc_type) = parse_type_override("lei.pdf=lei_ordinaria").unwrap();
        assert_eq!(file, "lei.pdf");
        assert_eq!(doc_type, DocType::LeiOrdinaria);
        assert!(parse_type_override("lei.pdf").is_err());
    }
}
