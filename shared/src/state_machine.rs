//! Thermostat State Machine
//!
//! The directive name selects a transition over [`DeviceState`]; the handler
//! layer turns the [`TransitionResult`] into hardware callbacks and a reply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Directive;

/// Operating mode of the thermostat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThermostatMode {
    #[default]
    Off,
    Heat,
    Cool,
    Auto,
}

impl ThermostatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThermostatMode::Off => "OFF",
            ThermostatMode::Heat => "HEAT",
            ThermostatMode::Cool => "COOL",
            ThermostatMode::Auto => "AUTO",
        }
    }
}

impl fmt::Display for ThermostatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported thermostat mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for ThermostatMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OFF" => Ok(ThermostatMode::Off),
            "HEAT" => Ok(ThermostatMode::Heat),
            "COOL" => Ok(ThermostatMode::Cool),
            "AUTO" => Ok(ThermostatMode::Auto),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// Mutable state of the single thermostat endpoint
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceState {
    pub current_mode: ThermostatMode,
    /// Last temperature read from the sensor
    pub current_temperature: f64,
    pub target_temperature: f64,
}

/// A directive decoded into the transition it requests
#[derive(Debug, Clone, PartialEq)]
pub enum ThermostatDirective {
    ReportState,
    SetTargetTemperature(f64),
    SetThermostatMode(ThermostatMode),
    /// A known directive whose payload could not be used
    Invalid { name: String, reason: String },
    /// A directive name the thermostat does not implement
    Unhandled { name: String },
}

impl ThermostatDirective {
    /// Decode a directive by name, extracting the payload value it needs
    pub fn from_directive(directive: &Directive) -> Self {
        let name = directive.header.name.as_str();
        let payload = &directive.payload;

        match name {
            "ReportState" => ThermostatDirective::ReportState,
            "SetTargetTemperature" => match payload["targetSetpoint"]["value"].as_f64() {
                Some(value) => ThermostatDirective::SetTargetTemperature(value),
                None => ThermostatDirective::Invalid {
                    name: name.into(),
                    reason: "targetSetpoint.value missing or not a number".into(),
                },
            },
            "SetThermostatMode" => match payload["thermostatMode"]["value"].as_str() {
                Some(raw) => match raw.parse() {
                    Ok(mode) => ThermostatDirective::SetThermostatMode(mode),
                    Err(e) => ThermostatDirective::Invalid {
                        name: name.into(),
                        reason: format!("{}", e),
                    },
                },
                None => ThermostatDirective::Invalid {
                    name: name.into(),
                    reason: "thermostatMode.value missing or not a string".into(),
                },
            },
            other => ThermostatDirective::Unhandled { name: other.into() },
        }
    }
}

/// Change originating at the device itself (e.g. someone turned the dial)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalChange {
    TargetTemperature(f64),
    Mode(ThermostatMode),
}

/// Result of applying a directive
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionResult {
    /// State untouched (state query)
    Unchanged,
    TargetChanged(f64),
    ModeChanged(ThermostatMode),
    /// Known directive with an unusable payload; state untouched
    Rejected { name: String, reason: String },
    /// Unknown directive name; state untouched
    Unhandled { name: String },
}

impl DeviceState {
    /// Apply a directive and report what changed
    pub fn apply(&mut self, directive: &ThermostatDirective) -> TransitionResult {
        match directive {
            ThermostatDirective::ReportState => TransitionResult::Unchanged,
            ThermostatDirective::SetTargetTemperature(value) => {
                self.target_temperature = *value;
                TransitionResult::TargetChanged(*value)
            }
            ThermostatDirective::SetThermostatMode(mode) => {
                self.current_mode = *mode;
                TransitionResult::ModeChanged(*mode)
            }
            ThermostatDirective::Invalid { name, reason } => TransitionResult::Rejected {
                name: name.clone(),
                reason: reason.clone(),
            },
            ThermostatDirective::Unhandled { name } => {
                TransitionResult::Unhandled { name: name.clone() }
            }
        }
    }

    /// Apply a local change; returns `false` when the value was already current
    pub fn apply_local(&mut self, change: LocalChange) -> bool {
        match change {
            LocalChange::TargetTemperature(value) => {
                let changed = self.target_temperature != value;
                self.target_temperature = value;
                changed
            }
            LocalChange::Mode(mode) => {
                let changed = self.current_mode != mode;
                self.current_mode = mode;
                changed
            }
        }
    }
}
