use absaar_cloud_rs::state::{Entry, MemoryStore, State, StateObject, StateStore, StateValue};
use absaar_cloud_rs::Error;
use prometheus::{Encoder, GaugeVec, TextEncoder};
use std::collections::BTreeMap;

lazy_static! {
    static ref STATE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "absaar_state",
            "latest numeric value published to the state store",
        ),
        &["key", "unit"],
    )
    .unwrap();
}

/// State store kept in memory whose numeric values are mirrored to Prometheus gauges.
#[derive(Default)]
pub struct ExportedStore {
    inner: MemoryStore,
}

impl ExportedStore {
    pub fn snapshot(&self) -> Result<BTreeMap<String, Entry>, Error> {
        self.inner.snapshot()
    }
}

impl StateStore for ExportedStore {
    fn set_object_not_exists(&self, key: &str, object: StateObject) -> Result<bool, Error> {
        self.inner.set_object_not_exists(key, object)
    }

    fn set_state(&self, key: &str, state: State) -> Result<(), Error> {
        let value = match state.val {
            StateValue::Number(value) => Some(value),
            StateValue::Text(_) => None,
        };
        self.inner.set_state(key, state)?;

        if let Some(value) = value {
            let unit = self
                .inner
                .object(key)?
                .and_then(|object| object.unit)
                .unwrap_or_default();
            STATE_GAUGE.with_label_values(&[key, unit.as_str()]).set(value);
        }
        Ok(())
    }
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> Result<String, Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode(&metric_families, &mut buffer)
        .or(Err(Error::FormatError))?;
    String::from_utf8(buffer).or(Err(Error::FormatError))
}
