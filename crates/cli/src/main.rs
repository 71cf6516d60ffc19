use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;

use faceloop_core::detection::domain::face_detector::FaceDetector;
use faceloop_core::detection::infrastructure::sidecar_face_detector::SidecarFaceDetector;
use faceloop_core::imaging::domain::image_mutator::ImageMutator;
use faceloop_core::imaging::infrastructure::gif_animator::GifAnimator;
use faceloop_core::imaging::infrastructure::raster_mutator::RasterMutator;
use faceloop_core::messaging::infrastructure::channel_publisher::ChannelPublisher;
use faceloop_core::pipeline::infrastructure::process_worker_pool::ProcessWorkerPool;
use faceloop_core::pipeline::merge_session_use_case::MergeSessionUseCase;
use faceloop_core::pipeline::process_upload_use_case::ProcessUploadUseCase;
use faceloop_core::session::session_service::SessionService;
use faceloop_core::session::ticket_session::TicketSession;
use faceloop_core::shared::alignment_target::AlignmentTarget;
use faceloop_core::shared::ticket::Ticket;
use faceloop_core::storage::domain::object_store::{ObjectStore, StorageArea};
use faceloop_core::storage::infrastructure::fs_object_store::FsObjectStore;

/// Face alignment sessions over a local object store.
///
/// Local stand-in for the deployed pipeline: uploads land in the store's
/// input area, `process` normalizes them into the interim area, and
/// `merge` turns a ready ticket into a looping GIF in the output area.
#[derive(Parser)]
#[command(name = "faceloop")]
struct Cli {
    /// Root directory of the local object store.
    #[arg(long, default_value = "./faceloop-store")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mint a new session ticket.
    NewTicket,

    /// Upload images into a ticket's input area.
    Upload {
        #[arg(long)]
        ticket: String,

        /// Content-aware shrink percentage (1-200) for detection accuracy.
        #[arg(long)]
        shrink: Option<String>,

        /// Image files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Normalize all pending uploads of a ticket.
    Process {
        #[arg(long)]
        ticket: String,

        /// Worker threads.
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Directory holding `<file>.landmarks.json` sidecars for the
        /// local detector (typically the upload source directory).
        #[arg(long)]
        landmarks_dir: PathBuf,

        /// Scratch directory for work images.
        #[arg(long)]
        scratch: Option<PathBuf>,
    },

    /// Show a ticket's derived counts and state.
    Status {
        #[arg(long)]
        ticket: String,
    },

    /// Request a merge and run the local merge worker.
    Merge {
        #[arg(long)]
        ticket: String,

        /// Scratch directory for downloaded frames.
        #[arg(long)]
        scratch: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&cli.store));

    match cli.command {
        Command::NewTicket => {
            println!("{}", Ticket::generate());
            Ok(())
        }
        Command::Upload {
            ticket,
            shrink,
            files,
        } => run_upload(store, &ticket, shrink.as_deref(), &files),
        Command::Process {
            ticket,
            workers,
            landmarks_dir,
            scratch,
        } => run_process(store, &ticket, workers, &landmarks_dir, scratch),
        Command::Status { ticket } => run_status(store, &ticket),
        Command::Merge { ticket, scratch } => run_merge(store, &ticket, scratch),
    }
}

fn run_upload(
    store: Arc<dyn ObjectStore>,
    ticket: &str,
    shrink: Option<&str>,
    files: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let ticket = Ticket::parse(ticket)?;
    let (publisher, _rx) = ChannelPublisher::bounded(1);
    let service = SessionService::new(store, Arc::new(publisher));

    for file in files {
        let bytes = fs::read(file)?;
        let filename = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| format!("bad filename: {}", file.display()))?;
        service.upload(&ticket, &ticket, filename, &bytes, shrink)?;
        println!("uploaded {filename}");
    }
    Ok(())
}

fn run_process(
    store: Arc<dyn ObjectStore>,
    ticket: &str,
    workers: usize,
    landmarks_dir: &Path,
    scratch: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ticket = Ticket::parse(ticket)?;
    let scratch = scratch_dir(scratch)?;

    let keys = store
        .list(StorageArea::Input, &format!("{ticket}/"))
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    if keys.is_empty() {
        println!("nothing to process for ticket {ticket}");
        return Ok(());
    }

    // The local detector reads landmark sidecars; seed them beside the
    // deterministic scratch paths before the workers start.
    for key in &keys {
        let basename = key.rsplit('/').next().unwrap_or(key);
        let source = landmarks_dir.join(format!("{basename}.landmarks.json"));
        if source.exists() {
            let scratch_file = ProcessUploadUseCase::scratch_path(&scratch, key);
            if let Some(parent) = scratch_file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&source, SidecarFaceDetector::sidecar_path(&scratch_file))?;
        }
    }

    info!("processing {} uploads with {workers} workers", keys.len());
    let report = ProcessWorkerPool::new(workers).run(
        store,
        AlignmentTarget::default(),
        &scratch,
        keys,
        &|| -> Box<dyn FaceDetector> { Box::new(SidecarFaceDetector::new()) },
        &|| -> Box<dyn ImageMutator> { Box::new(RasterMutator::new()) },
    );
    println!("processed {}, failed {}", report.processed, report.failed);
    Ok(())
}

fn run_status(
    store: Arc<dyn ObjectStore>,
    ticket: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ticket = Ticket::parse(ticket)?;
    let session = TicketSession::new(ticket);

    let counts = session.counts(store.as_ref())?;
    let state = session.state(store.as_ref())?;
    println!(
        "input: {}, interim: {}, output: {} ({state:?})",
        counts.input, counts.interim, counts.output
    );
    Ok(())
}

fn run_merge(
    store: Arc<dyn ObjectStore>,
    ticket: &str,
    scratch: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ticket = Ticket::parse(ticket)?;
    let scratch = scratch_dir(scratch)?;

    // Publish the merge request, then act as the local merge worker
    // consuming it, following the same message flow as the deployed queue.
    let (publisher, receiver) = ChannelPublisher::bounded(1);
    let service = SessionService::new(store.clone(), Arc::new(publisher));
    service.request_merge(&ticket, &ticket)?;

    let message = receiver.recv()?;
    let requested = Ticket::parse(std::str::from_utf8(&message.payload)?)?;
    let worker = MergeSessionUseCase::new(store, Box::new(GifAnimator::new()), &scratch);
    let url = worker.execute(&requested)?;
    println!("{url}");
    Ok(())
}

fn scratch_dir(explicit: Option<PathBuf>) -> Result<PathBuf, std::io::Error> {
    let dir = explicit.unwrap_or_else(|| std::env::temp_dir().join("faceloop"));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
