//! Headless stream viewer
//!
//! Connects to a stream service, subscribes to one or more channels and
//! keeps the latest frame of each channel on disk as a PNG.
//!
//! Run with: cargo run --example viewer PORT OUT_DIR ROOM/PARTICIPANT...
//!
//! Examples:
//!   cargo run --example viewer 8765 /tmp/frames AB12/alice
//!   cargo run --example viewer 8765 . AB12/alice AB12/bob
//!
//! Stop with Ctrl-C; every session is closed before exit.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;

use flux_rs::render::{DisplayedResource, ResourceContent};
use flux_rs::{DisplayTarget, PixelDecoder, SessionRegistry, StreamConfig};

/// Keeps the latest presented frame of one channel in a PNG file.
///
/// `present` only publishes the frame; a writer task encodes it on the
/// blocking pool. Frames presented while a write is running collapse into
/// the newest one.
struct SnapshotTarget {
    descriptor: String,
    latest: watch::Sender<Option<Arc<DisplayedResource>>>,
}

impl SnapshotTarget {
    /// Must be called from within a tokio runtime.
    fn new(descriptor: String, out_dir: &Path) -> Self {
        let file_name = format!("{}.png", descriptor.replace('/', "_"));
        let path = out_dir.join(file_name);
        let (latest, rx) = watch::channel(None);

        tokio::spawn(write_frames(descriptor.clone(), path, rx));

        Self { descriptor, latest }
    }
}

async fn write_frames(
    descriptor: String,
    path: PathBuf,
    mut rx: watch::Receiver<Option<Arc<DisplayedResource>>>,
) {
    // Ends once the target, and with it the sender, is dropped
    while rx.changed().await.is_ok() {
        let Some(resource) = rx.borrow_and_update().clone() else {
            continue;
        };

        let target_path = path.clone();
        let written = tokio::task::spawn_blocking(move || write_png(&target_path, &resource)).await;

        match written {
            Ok(Ok(sequence)) => {
                tracing::debug!(channel = %descriptor, sequence = sequence, "Frame written");
            }
            Ok(Err(e)) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to write frame");
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Writer task failed");
            }
        }
    }
}

fn write_png(path: &Path, resource: &DisplayedResource) -> image::ImageResult<u64> {
    if let ResourceContent::Pixels {
        width,
        height,
        rgba,
    } = &resource.content
    {
        image::save_buffer(path, rgba, *width, *height, image::ExtendedColorType::Rgba8)?;
    }
    Ok(resource.sequence)
}

impl DisplayTarget for SnapshotTarget {
    fn descriptor(&self) -> Option<String> {
        Some(self.descriptor.clone())
    }

    fn present(&self, resource: Arc<DisplayedResource>) {
        self.latest.send_replace(Some(resource));
    }

    fn release(&self, resource: &DisplayedResource) {
        tracing::trace!(channel = %self.descriptor, resource = %resource.id, "Frame released");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flux_rs=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| "8765".to_string());
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let channels: Vec<String> = args.collect();

    if channels.is_empty() {
        eprintln!("usage: viewer PORT OUT_DIR ROOM/PARTICIPANT...");
        std::process::exit(2);
    }

    std::fs::create_dir_all(&out_dir)?;

    let config = StreamConfig::from_attributes([("data-port", port.as_str()), ("data-actif", "1")])?;
    println!("Connecting to {}", config.url());

    let targets: Vec<Arc<dyn DisplayTarget>> = channels
        .into_iter()
        .map(|channel| Arc::new(SnapshotTarget::new(channel, &out_dir)) as Arc<dyn DisplayTarget>)
        .collect();

    let registry = SessionRegistry::start_with_decoder(config, targets, Arc::new(PixelDecoder));

    let mut service = registry.watch_service_status();
    tokio::spawn(async move {
        if let Ok(status) = service
            .wait_for(|s| *s != flux_rs::ChannelStatus::Pending)
            .await
        {
            println!("Stream service: {:?}", *status);
        }
    });

    registry
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    println!("All sessions closed");
    Ok(())
}
