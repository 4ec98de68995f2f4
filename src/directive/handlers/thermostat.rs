//! Thermostat capability handler
//!
//! Owns the device state and the hardware callbacks. Each directive is
//! decoded into a [`ThermostatDirective`], applied to [`DeviceState`], pushed
//! to the hardware when it changed something, and answered with a full state
//! report.

use super::{
    change_report, describe_endpoint, error_body, state_report, DirectiveHandler, Session,
    UnhandledDirectivePolicy,
};
use crate::hardware::HardwareCallbacks;
use thermolink_shared::{
    protocol, DeviceState, ErrorType, LocalChange, Request, Response, ResponseBody,
    ThermostatDirective, TransitionResult,
};
use tracing::{debug, info, warn};

/// Identity fields advertised during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub friendly_name: String,
    pub manufacturer_name: String,
    pub description: String,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            friendly_name: "Thermostat".into(),
            manufacturer_name: "AlexaWs Thermostat".into(),
            description: "AlexaWs Thermostat Controller".into(),
        }
    }
}

/// Configuration for the thermostat handler
#[derive(Debug, Clone, Default)]
pub struct ThermostatConfig {
    pub profile: DeviceProfile,
    pub unhandled_policy: UnhandledDirectivePolicy,
}

/// The thermostat endpoint
#[derive(Debug)]
pub struct ThermostatHandler {
    config: ThermostatConfig,
    state: DeviceState,
    callbacks: HardwareCallbacks,
}

impl ThermostatHandler {
    /// Create a handler in the initial state (OFF, 0, 0)
    pub fn new(config: ThermostatConfig, callbacks: HardwareCallbacks) -> Self {
        Self {
            config,
            state: DeviceState::default(),
            callbacks,
        }
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.config.profile
    }

    pub fn callbacks_mut(&mut self) -> &mut HardwareCallbacks {
        &mut self.callbacks
    }

    /// Read the sensor, caching the value; falls back to the last reading
    /// when no getter is registered
    fn sample_temperature(&mut self) -> f64 {
        if let Some(temperature) = self.callbacks.current_temperature() {
            self.state.current_temperature = temperature;
        }
        self.state.current_temperature
    }

    /// Pull setpoint and mode from the hardware, where getters exist
    fn refresh_from_hardware(&mut self) {
        if let Some(target) = self.callbacks.target_temperature() {
            self.state.target_temperature = target;
        }
        if let Some(mode) = self.callbacks.mode() {
            self.state.current_mode = mode;
        }
    }

    fn report(&mut self, session: &Session, request: &Request, name: &str) -> ResponseBody {
        let temperature = self.sample_temperature();
        ResponseBody::Event(state_report(
            session,
            request,
            protocol::ALEXA_NAMESPACE,
            name,
            temperature,
            &self.state,
        ))
    }
}

impl DirectiveHandler for ThermostatHandler {
    fn handle_discovery(&mut self, session: &Session, _request: &Request) -> ResponseBody {
        info!("Describing endpoint {} for discovery", session.device_id);
        ResponseBody::Discovery(describe_endpoint(session, &self.config.profile))
    }

    fn handle_directive(&mut self, session: &Session, request: &Request) -> ResponseBody {
        let directive = ThermostatDirective::from_directive(&request.directive);

        if directive == ThermostatDirective::ReportState {
            self.refresh_from_hardware();
        }

        match self.state.apply(&directive) {
            TransitionResult::Unchanged => self.report(session, request, "StateReport"),
            TransitionResult::TargetChanged(value) => {
                info!("Target temperature set to {}", value);
                self.callbacks.set_target_temperature(value);
                self.report(session, request, "Response")
            }
            TransitionResult::ModeChanged(mode) => {
                info!("Thermostat mode set to {}", mode);
                self.callbacks.set_mode(mode);
                self.report(session, request, "Response")
            }
            TransitionResult::Rejected { name, reason } => {
                warn!("Rejected {}: {}", name, reason);
                error_body(
                    self.config.unhandled_policy,
                    session,
                    request,
                    ErrorType::InvalidValue,
                    &reason,
                )
            }
            TransitionResult::Unhandled { name } => {
                debug!(
                    "Unhandled directive {}.{}",
                    request.directive.header.namespace, name
                );
                error_body(
                    self.config.unhandled_policy,
                    session,
                    request,
                    ErrorType::InvalidDirective,
                    &format!("{} is not supported", name),
                )
            }
        }
    }

    fn handle_local_change(&mut self, session: &Session, change: LocalChange) -> Option<Response> {
        if !self.state.apply_local(change) {
            return None;
        }
        info!("Local change: {:?}", change);
        let temperature = self.sample_temperature();
        Some(change_report(session, change, temperature, &self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use thermolink_shared::{codec, ThermostatMode};

    fn request(namespace: &str, name: &str, payload: Value) -> Request {
        let text = json!({
            "requestId": "r1",
            "requestTime": "T",
            "directive": {
                "header": {
                    "namespace": namespace,
                    "name": name,
                    "messageId": "m1",
                    "payloadVersion": "3"
                },
                "payload": payload
            }
        })
        .to_string();
        codec::decode_request(&text).unwrap()
    }

    fn to_json(body: &ResponseBody) -> Value {
        serde_json::to_value(body).unwrap()
    }

    fn handler_with(callbacks: HardwareCallbacks) -> ThermostatHandler {
        ThermostatHandler::new(ThermostatConfig::default(), callbacks)
    }

    #[test]
    fn test_report_state_uses_sensor_and_state() {
        let mut callbacks = HardwareCallbacks::new();
        callbacks.on_get_current_temperature(|| 20.5);
        let mut handler = handler_with(callbacks);
        let session = Session::new("dev-1");

        let body = handler.handle_directive(&session, &request("Alexa", "ReportState", json!({})));
        let json = to_json(&body);

        assert_eq!(json["event"]["header"]["name"], "StateReport");
        assert_eq!(json["event"]["header"]["namespace"], "Alexa");
        assert_eq!(json["event"]["header"]["messageId"], "m1-r");
        let properties = json["context"]["properties"].as_array().unwrap();
        assert_eq!(properties.len(), 3);
        assert_eq!(properties[0]["value"]["value"], 20.5);
        assert_eq!(properties[1]["value"]["value"], 0.0);
        assert_eq!(properties[2]["value"], "OFF");
        assert_eq!(handler.state().current_temperature, 20.5);
    }

    #[test]
    fn test_set_target_temperature_invokes_setter_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let calls_clone = calls.clone();
        let mut callbacks = HardwareCallbacks::new();
        callbacks.on_set_target_temperature(move |v| calls_clone.lock().push(v));
        let mut handler = handler_with(callbacks);

        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request(
                "Alexa.ThermostatController",
                "SetTargetTemperature",
                json!({"targetSetpoint": {"value": 22, "scale": "CELSIUS"}}),
            ),
        );
        let json = to_json(&body);

        assert_eq!(*calls.lock(), vec![22.0]);
        assert_eq!(handler.state().target_temperature, 22.0);
        assert_eq!(json["event"]["header"]["name"], "Response");
        assert_eq!(json["context"]["properties"][1]["name"], "targetSetpoint");
        assert_eq!(json["context"]["properties"][1]["value"]["value"], 22.0);
    }

    #[test]
    fn test_set_thermostat_mode() {
        let modes = Arc::new(Mutex::new(Vec::new()));
        let modes_clone = modes.clone();
        let mut callbacks = HardwareCallbacks::new();
        callbacks.on_set_mode(move |m| modes_clone.lock().push(m));
        let mut handler = handler_with(callbacks);

        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request(
                "Alexa.ThermostatController",
                "SetThermostatMode",
                json!({"thermostatMode": {"value": "HEAT"}}),
            ),
        );

        assert_eq!(handler.state().current_mode, ThermostatMode::Heat);
        assert_eq!(*modes.lock(), vec![ThermostatMode::Heat]);
        assert_eq!(to_json(&body)["context"]["properties"][2]["value"], "HEAT");
    }

    #[test]
    fn test_missing_sensor_reports_last_known_temperature() {
        let mut handler = handler_with(HardwareCallbacks::new());
        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request("Alexa", "ReportState", json!({})),
        );
        assert_eq!(to_json(&body)["context"]["properties"][0]["value"]["value"], 0.0);
    }

    #[test]
    fn test_report_state_refreshes_from_getters() {
        let mut callbacks = HardwareCallbacks::new();
        callbacks
            .on_get_target_temperature(|| 18.0)
            .on_get_mode(|| ThermostatMode::Cool);
        let mut handler = handler_with(callbacks);

        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request("Alexa", "ReportState", json!({})),
        );
        let json = to_json(&body);

        assert_eq!(json["context"]["properties"][1]["value"]["value"], 18.0);
        assert_eq!(json["context"]["properties"][2]["value"], "COOL");
        assert_eq!(handler.state().current_mode, ThermostatMode::Cool);
    }

    #[test]
    fn test_set_directive_does_not_consult_getters() {
        let mut callbacks = HardwareCallbacks::new();
        callbacks.on_get_target_temperature(|| 18.0);
        let mut handler = handler_with(callbacks);

        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request(
                "Alexa.ThermostatController",
                "SetTargetTemperature",
                json!({"targetSetpoint": {"value": 25}}),
            ),
        );
        assert_eq!(to_json(&body)["context"]["properties"][1]["value"]["value"], 25.0);
    }

    #[test]
    fn test_unknown_directive_legacy_body() {
        let mut handler = handler_with(HardwareCallbacks::new());
        let before = *handler.state();

        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request("Alexa.ThermostatController", "AdjustTargetTemperature", json!({})),
        );

        assert_eq!(to_json(&body), json!({ "error": "Unhandled Event" }));
        assert_eq!(*handler.state(), before);
    }

    #[test]
    fn test_unknown_directive_structured_error() {
        let config = ThermostatConfig {
            unhandled_policy: UnhandledDirectivePolicy::ErrorResponse,
            ..Default::default()
        };
        let mut handler = ThermostatHandler::new(config, HardwareCallbacks::new());

        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request("Alexa.PowerController", "TurnOn", json!({})),
        );
        let json = to_json(&body);

        assert_eq!(json["event"]["header"]["name"], "ErrorResponse");
        assert_eq!(json["event"]["endpoint"]["endpointId"], "dev-1");
        assert_eq!(json["event"]["payload"]["type"], "INVALID_DIRECTIVE");
        assert!(json.get("context").is_none());
    }

    #[test]
    fn test_invalid_value_leaves_state_and_hardware_alone() {
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = calls.clone();
        let mut callbacks = HardwareCallbacks::new();
        callbacks.on_set_mode(move |_| *calls_clone.lock() += 1);
        let mut handler = handler_with(callbacks);

        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request(
                "Alexa.ThermostatController",
                "SetThermostatMode",
                json!({"thermostatMode": {"value": "ECO"}}),
            ),
        );

        assert_eq!(to_json(&body), json!({ "error": "Invalid Value" }));
        assert_eq!(handler.state().current_mode, ThermostatMode::Off);
        assert_eq!(*calls.lock(), 0);
    }

    fn bad_setpoint_request() -> Request {
        let text = json!({
            "requestId": "r1",
            "requestTime": "T",
            "directive": {
                "header": {
                    "namespace": "Alexa.ThermostatController",
                    "name": "SetTargetTemperature",
                    "messageId": "m1",
                    "correlationToken": "c",
                    "payloadVersion": "3"
                },
                "payload": { "targetSetpoint": { "value": "warm" } }
            }
        })
        .to_string();
        codec::decode_request(&text).unwrap()
    }

    fn counting_setter() -> (HardwareCallbacks, Arc<Mutex<u32>>) {
        let calls = Arc::new(Mutex::new(0));
        let calls_clone = calls.clone();
        let mut callbacks = HardwareCallbacks::new();
        callbacks.on_set_target_temperature(move |_| *calls_clone.lock() += 1);
        (callbacks, calls)
    }

    #[test]
    fn test_invalid_setpoint_structured_error() {
        let (callbacks, calls) = counting_setter();
        let config = ThermostatConfig {
            unhandled_policy: UnhandledDirectivePolicy::ErrorResponse,
            ..Default::default()
        };
        let mut handler = ThermostatHandler::new(config, callbacks);
        let before = *handler.state();

        let body = handler.handle_directive(&Session::new("dev-1"), &bad_setpoint_request());
        let json = to_json(&body);

        assert_eq!(json["event"]["header"]["namespace"], "Alexa");
        assert_eq!(json["event"]["header"]["name"], "ErrorResponse");
        assert_eq!(json["event"]["header"]["messageId"], "m1-r");
        assert_eq!(json["event"]["header"]["correlationToken"], "c");
        assert_eq!(json["event"]["endpoint"]["endpointId"], "dev-1");
        assert_eq!(json["event"]["payload"]["type"], "INVALID_VALUE");
        assert!(json.get("context").is_none());
        assert_eq!(*handler.state(), before);
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_invalid_setpoint_legacy_body() {
        let (callbacks, calls) = counting_setter();
        let mut handler = handler_with(callbacks);

        let body = handler.handle_directive(&Session::new("dev-1"), &bad_setpoint_request());

        assert_eq!(to_json(&body), json!({ "error": "Invalid Value" }));
        assert_eq!(handler.state().target_temperature, 0.0);
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_discovery_uses_configured_profile() {
        let config = ThermostatConfig {
            profile: DeviceProfile {
                friendly_name: "Hallway".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let mut handler = ThermostatHandler::new(config, HardwareCallbacks::new());
        assert_eq!(handler.profile().friendly_name, "Hallway");

        let body = handler.handle_discovery(
            &Session::new("dev-1"),
            &request("Alexa.Discovery", "Discover", json!({})),
        );
        let json = to_json(&body);

        assert_eq!(json["friendlyName"], "Hallway");
        assert_eq!(json["manufacturerName"], "AlexaWs Thermostat");
    }

    #[test]
    fn test_callbacks_registered_after_construction() {
        let mut handler = handler_with(HardwareCallbacks::new());
        handler.callbacks_mut().on_get_current_temperature(|| 23.5);

        let body = handler.handle_directive(
            &Session::new("dev-1"),
            &request("Alexa", "ReportState", json!({})),
        );

        assert_eq!(to_json(&body)["context"]["properties"][0]["value"]["value"], 23.5);
    }

    #[test]
    fn test_discovery_ignores_payload() {
        let mut handler = handler_with(HardwareCallbacks::new());
        let session = Session::new("dev-9");

        let a = handler.handle_discovery(&session, &request("Alexa.Discovery", "Discover", json!({})));
        let b = handler.handle_discovery(
            &session,
            &request("Alexa.Discovery", "Discover", json!({"scope": {"token": "x"}})),
        );

        assert_eq!(a, b);
        assert_eq!(
            to_json(&a)["capabilities"][0]["configuration"]["supportedModes"],
            json!(["HEAT", "COOL", "AUTO", "OFF"])
        );
    }

    #[test]
    fn test_local_change_builds_change_report_once() {
        let mut handler = handler_with(HardwareCallbacks::new());
        let session = Session::new("dev-1");

        let report = handler
            .handle_local_change(&session, LocalChange::TargetTemperature(21.0))
            .expect("first change should be reported");
        assert_eq!(report.event.header.name, "ChangeReport");
        assert_eq!(handler.state().target_temperature, 21.0);

        assert!(handler
            .handle_local_change(&session, LocalChange::TargetTemperature(21.0))
            .is_none());
    }
}
