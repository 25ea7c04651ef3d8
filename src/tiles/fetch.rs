//! reqwest-backed tile transport.
//!
//! Fetches run as detached tokio tasks; decoded tiles land in a completion
//! queue that the host drains into [`TileCacheManager::on_tile`] from its own
//! event loop. The cache itself is therefore never touched off-thread, which
//! preserves the exclusive-write discipline on the composite raster. A failed
//! fetch or decode is logged and queued as a blank completion so the slot
//! still counts toward `pending`.
//!
//! [`TileCacheManager::on_tile`]: crate::tiles::TileCacheManager::on_tile

use std::sync::{Arc, Mutex};

use image::RgbaImage;
use log::warn;
use tokio::runtime::Handle;

use crate::nightshade_errors::NightshadeError;
use crate::tiles::{TileCompletion, TileFetcher, TileRequest};

/// Fire-and-forget HTTP tile fetcher with an internal completion queue.
pub struct HttpTileFetcher {
    client: reqwest::Client,
    runtime: Handle,
    completions: Arc<Mutex<Vec<TileCompletion>>>,
}

impl HttpTileFetcher {
    /// Create a fetcher spawning onto the given tokio runtime.
    pub fn new(runtime: Handle) -> HttpTileFetcher {
        HttpTileFetcher {
            client: reqwest::Client::new(),
            runtime,
            completions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drain every completion that has arrived since the last call.
    ///
    /// The host calls this from its frame/timer loop and feeds the results to
    /// the cache manager; order of arrival is not meaningful.
    pub fn drain(&mut self) -> Vec<TileCompletion> {
        match self.completions.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

impl TileFetcher for HttpTileFetcher {
    fn fetch(&mut self, request: TileRequest) {
        let client = self.client.clone();
        let sink = Arc::clone(&self.completions);
        self.runtime.spawn(async move {
            let image = match fetch_tile(&client, &request.url).await {
                Ok(tile) => Some(tile),
                Err(error) => {
                    warn!("tile fetch failed for {}: {error}", request.url);
                    None
                }
            };
            if let Ok(mut queue) = sink.lock() {
                queue.push(TileCompletion {
                    ticket: request.ticket,
                    image,
                });
            }
        });
    }
}

/// Download and decode one tile. No retry: the caller treats any error as a
/// blank slot.
async fn fetch_tile(client: &reqwest::Client, url: &str) -> Result<RgbaImage, NightshadeError> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let decoded = image::load_from_memory(&bytes)?;
    Ok(decoded.to_rgba8())
}
