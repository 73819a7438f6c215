use crate::api::{self, Error};
use crate::cycle;
use crate::settings::Settings;
use crate::state::{Publisher, StateStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};

/// Period between two polling cycles.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Running poller. Dropping the handle stops the timer as well.
pub struct PollerHandle {
    stop: oneshot::Sender<()>,
    timer: JoinHandle<()>,
}

impl PollerHandle {
    /// Cancel the recurring timer and wait until every cycle already running has finished.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.timer.await {
            log::warn!("Poller timer task ended abnormally: {}", e);
        }
    }
}

/// Validate credentials, run a cycle right away and then one every `period`.
///
/// Each cycle runs in its own task owned by the timer. A cycle taking longer than `period`
/// overlaps with the next one; nothing prevents that.
pub fn start<S: StateStore + 'static>(
    api_url: String,
    settings: &Settings,
    publisher: Arc<Publisher<S>>,
    period: Duration,
) -> Result<PollerHandle, Error> {
    let (username, password) = settings.credentials()?;
    let api = Arc::new(api::api(
        api_url,
        username.to_owned(),
        password.to_owned(),
    )?);
    let station_index = settings.station_index;

    let (stop, mut stopped) = oneshot::channel::<()>();
    let timer = tokio::spawn(async move {
        /* the first tick completes immediately */
        let mut ticker = tokio::time::interval(period);
        let mut cycles = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let api = api.clone();
                    let publisher = publisher.clone();
                    cycles.spawn(async move {
                        cycle::run(&api, station_index, &publisher).await;
                    });
                }
                Some(result) = cycles.join_next(), if !cycles.is_empty() => {
                    if let Err(e) = result {
                        log::warn!("Polling cycle ended abnormally: {}", e);
                    }
                }
                _ = &mut stopped => break,
            }
        }

        if !cycles.is_empty() {
            log::info!("Waiting for {} running cycle(s) to finish", cycles.len());
        }
        while let Some(result) = cycles.join_next().await {
            if let Err(e) = result {
                log::warn!("Polling cycle ended abnormally: {}", e);
            }
        }
        log::info!("Poller stopped");
    });

    log::info!(
        "Poller started for station index {}, polling every {}s",
        station_index,
        period.as_secs()
    );

    Ok(PollerHandle { stop, timer })
}
