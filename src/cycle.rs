use crate::api::{self, Error};
use crate::model::{Api, Collector, InverterReading, LoggedInApi, Metric, Station};
use crate::state::{key_segment, Publisher, StateStore, StateValue};
use futures::future::join_all;

/// Outcome of one polling cycle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleSummary {
    /// `powerId` of the station whose totals were published.
    pub station: Option<String>,
    pub collectors: usize,
    pub inverters_published: usize,
    pub keys_published: usize,
}

pub fn station_key(station: &Station, leaf: &str) -> String {
    format!("station.{}.{}", key_segment(&station.power_id), leaf)
}

pub fn inverter_key(reading: &InverterReading, leaf: &str) -> String {
    format!(
        "inv.{}.{}.{}",
        key_segment(&reading.power_id),
        key_segment(&reading.inverter_id),
        leaf
    )
}

fn publish_station<S: StateStore>(publisher: &Publisher<S>, station: &Station) -> usize {
    publisher.publish_all(vec![
        (
            station_key(station, "dailyPower"),
            StateValue::Number(station.daily_energy),
            Some("kWh"),
        ),
        (
            station_key(station, "totalPower"),
            StateValue::Number(station.total_energy),
            Some("kWh"),
        ),
        (
            station_key(station, "name"),
            StateValue::Text(station.name.to_owned()),
            None,
        ),
    ])
}

fn publish_inverter<S: StateStore>(
    publisher: &Publisher<S>,
    collector: &Collector,
    reading: &InverterReading,
) -> usize {
    let metrics = Metric::ALL.iter().map(|metric| {
        (
            inverter_key(reading, metric.name()),
            StateValue::Number(reading.value(*metric)),
            Some(metric.unit()),
        )
    });
    let name = (
        inverter_key(reading, "name"),
        StateValue::Text(collector.name.to_owned()),
        None,
    );

    publisher.publish_all(metrics.chain(std::iter::once(name)))
}

/// Fetch the newest reading of one collector. Failures stay local to that collector.
async fn latest_reading(
    api: &LoggedInApi,
    station: &Station,
    collector: &Collector,
) -> Option<InverterReading> {
    match api::inverter_readings(api, station, collector).await {
        Ok(readings) => {
            let latest = readings.into_iter().next();
            if latest.is_none() {
                log::warn!("No inverter data found for {}", collector.name);
            }
            latest
        }
        Err(e) => {
            log::warn!(
                "Error fetching inverter data for {} ({}): {}",
                collector.name,
                collector.inverter_id,
                e
            );
            None
        }
    }
}

async fn collect<S: StateStore>(
    api: &Api,
    station_index: usize,
    publisher: &Publisher<S>,
    summary: &mut CycleSummary,
) -> Result<(), Error> {
    let logged_in_api = api::login(api).await?;
    let stations = api::stations(&logged_in_api).await?;

    if stations.is_empty() {
        log::warn!("No stations found");
        return Ok(());
    }

    let station = stations
        .get(station_index)
        .ok_or(Error::StationIndexOutOfRange(station_index, stations.len()))?;

    /* Station totals go out before the collector fan-out so they survive its failures */
    summary.station = Some(station.power_id.to_owned());
    summary.keys_published += publish_station(publisher, station);

    let collectors = match api::collectors(&logged_in_api, station).await {
        Ok(collectors) if !collectors.is_empty() => collectors,
        Ok(_) => {
            log::warn!("No collectors found for station {}", station.name);
            return Ok(());
        }
        Err(e) => {
            log::warn!(
                "Error fetching collectors for station {}: {}",
                station.name,
                e
            );
            return Ok(());
        }
    };
    summary.collectors = collectors.len();

    let fetches: Vec<_> = collectors
        .iter()
        .map(|collector| latest_reading(&logged_in_api, station, collector))
        .collect();
    let readings = join_all(fetches).await;

    for (collector, reading) in collectors.iter().zip(readings) {
        if let Some(reading) = reading {
            summary.keys_published += publish_inverter(publisher, collector, &reading);
            summary.inverters_published += 1;
        }
    }

    Ok(())
}

/// Run one fetch-and-publish cycle: login, stations, the configured station's collectors and
/// their inverter readings. Never fails; every error ends up in the log.
pub async fn run<S: StateStore>(
    api: &Api,
    station_index: usize,
    publisher: &Publisher<S>,
) -> CycleSummary {
    let mut summary = CycleSummary::default();

    if let Err(e) = collect(api, station_index, publisher, &mut summary).await {
        log::error!("Polling cycle aborted: {}", e);
    }

    log::info!(
        "Polling cycle finished: station {:?}, {} collectors, {} inverters, {} keys published",
        summary.station,
        summary.collectors,
        summary.inverters_published,
        summary.keys_published
    );

    summary
}
