//! Discovery description of the thermostat endpoint

use super::{DeviceProfile, Session};
use thermolink_shared::{
    protocol, Capability, CapabilityConfiguration, CapabilityProperties, DiscoveryEndpoint,
    DisplayCategory, SupportedProperty, ThermostatMode,
};

/// Modes advertised to the platform, in the order it expects them
pub const SUPPORTED_MODES: [ThermostatMode; 4] = [
    ThermostatMode::Heat,
    ThermostatMode::Cool,
    ThermostatMode::Auto,
    ThermostatMode::Off,
];

/// Static capability description; independent of the request payload
pub fn describe_endpoint(session: &Session, profile: &DeviceProfile) -> DiscoveryEndpoint {
    DiscoveryEndpoint {
        endpoint_id: session.device_id.clone(),
        friendly_name: profile.friendly_name.clone(),
        manufacturer_name: profile.manufacturer_name.clone(),
        description: profile.description.clone(),
        display_categories: vec![DisplayCategory::Thermostat],
        capabilities: vec![thermostat_controller(), temperature_sensor()],
    }
}

fn thermostat_controller() -> Capability {
    Capability {
        kind: protocol::CAPABILITY_TYPE.into(),
        interface: protocol::THERMOSTAT_NAMESPACE.into(),
        version: protocol::INTERFACE_VERSION.into(),
        properties: Some(CapabilityProperties {
            supported: vec![
                SupportedProperty {
                    name: "targetSetpoint".into(),
                },
                SupportedProperty {
                    name: "thermostatMode".into(),
                },
            ],
            proactively_reported: true,
            retrievable: true,
        }),
        configuration: Some(CapabilityConfiguration {
            supports_scheduling: false,
            supported_modes: SUPPORTED_MODES.to_vec(),
        }),
    }
}

fn temperature_sensor() -> Capability {
    Capability {
        kind: protocol::CAPABILITY_TYPE.into(),
        interface: protocol::TEMPERATURE_SENSOR_NAMESPACE.into(),
        version: protocol::INTERFACE_VERSION.into(),
        properties: None,
        configuration: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_discovery_description_matches_schema() {
        let profile = DeviceProfile {
            friendly_name: "Hallway".into(),
            ..Default::default()
        };
        let endpoint = describe_endpoint(&Session::new("dev-42"), &profile);

        assert_eq!(
            serde_json::to_value(&endpoint).unwrap(),
            json!({
                "endpointId": "dev-42",
                "friendlyName": "Hallway",
                "manufacturerName": "AlexaWs Thermostat",
                "description": "AlexaWs Thermostat Controller",
                "displayCategories": ["THERMOSTAT"],
                "capabilities": [
                    {
                        "type": "AlexaInterface",
                        "interface": "Alexa.ThermostatController",
                        "version": "3",
                        "properties": {
                            "supported": [
                                { "name": "targetSetpoint" },
                                { "name": "thermostatMode" }
                            ],
                            "proactivelyReported": true,
                            "retrievable": true
                        },
                        "configuration": {
                            "supportsScheduling": false,
                            "supportedModes": ["HEAT", "COOL", "AUTO", "OFF"]
                        }
                    },
                    {
                        "type": "AlexaInterface",
                        "interface": "Alexa.TemperatureSensor",
                        "version": "3"
                    }
                ]
            })
        );
    }
}
