use std::collections::HashMap;

type KWh = f64;

/// Credentials plus the HTTP client shared by every call, within and across cycles.
#[derive(Debug, Clone)]
pub struct Api {
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub client: reqwest::Client,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub account_id: String,
}

/// Result of a successful login. Lives for one cycle only.
#[derive(Debug)]
pub struct LoggedInApi {
    pub api_url: String,
    pub session: Session,
    pub client: reqwest::Client,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub power_id: String,
    pub name: String,
    pub daily_energy: KWh,
    pub total_energy: KWh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collector {
    pub inverter_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AcPower,
    AcVoltage,
    AcFrequency,
    Pv1Power,
    Pv2Power,
    Temperature,
    Pv1Voltage,
    Pv1Electric,
    Pv2Voltage,
    Pv2Electric,
    AcElectric,
    InPower,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::AcPower,
        Metric::AcVoltage,
        Metric::AcFrequency,
        Metric::Pv1Power,
        Metric::Pv2Power,
        Metric::Temperature,
        Metric::Pv1Voltage,
        Metric::Pv1Electric,
        Metric::Pv2Voltage,
        Metric::Pv2Electric,
        Metric::AcElectric,
        Metric::InPower,
    ];

    /// Field name used both in API responses and in published keys.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::AcPower => "acPower",
            Metric::AcVoltage => "acVoltage",
            Metric::AcFrequency => "acFrequency",
            Metric::Pv1Power => "pv1Power",
            Metric::Pv2Power => "pv2Power",
            Metric::Temperature => "temperature",
            Metric::Pv1Voltage => "pv1Voltage",
            Metric::Pv1Electric => "pv1Electric",
            Metric::Pv2Voltage => "pv2Voltage",
            Metric::Pv2Electric => "pv2Electric",
            Metric::AcElectric => "acElectric",
            Metric::InPower => "inPower",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::AcPower | Metric::Pv1Power | Metric::Pv2Power | Metric::InPower => "W",
            Metric::AcVoltage | Metric::Pv1Voltage | Metric::Pv2Voltage => "V",
            Metric::Pv1Electric | Metric::Pv2Electric | Metric::AcElectric => "A",
            Metric::AcFrequency => "Hz",
            Metric::Temperature => "°C",
        }
    }
}

/// Latest snapshot reported by one inverter. Only fields present in the response are stored.
#[derive(Debug, Clone)]
pub struct InverterReading {
    pub power_id: String,
    pub inverter_id: String,
    pub fields: HashMap<Metric, f64>,
}

impl InverterReading {
    pub fn value(&self, metric: Metric) -> f64 {
        self.fields.get(&metric).copied().unwrap_or(0.0)
    }
}
