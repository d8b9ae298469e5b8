// ── Voice intent dispatch ──
//
// Turns parsed voice-assistant requests into fleet operations and spoken
// responses. Domain misses (unknown device, unknown color) come back as
// polite `Ok` texts with nothing written; store failures propagate as
// errors so the assistant can apologize for real problems separately.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use blinky_api::SyncClient;

use crate::error::CoreError;
use crate::model::{Mode, Rgb, Strip, StripId};
use crate::reconciler::{self, ConfigField};
use crate::resolver::Resolution;
use crate::store::FleetStore;

/// A parsed intent request, as delivered by the voice front end.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentRequest {
    #[serde(rename = "intentName")]
    pub intent_name: String,
    #[serde(default)]
    pub slots: BTreeMap<String, String>,
}

/// The intents the dispatcher understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Smoke-test intent; touches nothing.
    TryMe,
    EnableAll,
    DisableAll,
    ListDevices,
    Describe { device: String },
    SetMode {
        device: String,
        mode: Option<String>,
        color: Option<String>,
    },
}

impl Intent {
    /// Parse a request into an intent. Slot values are taken verbatim;
    /// resolution against the fleet happens at dispatch time.
    pub fn parse(request: &IntentRequest) -> Result<Self, CoreError> {
        let device = |intent: &str| -> Result<String, CoreError> {
            request
                .slots
                .get("device")
                .cloned()
                .filter(|d| !d.is_empty())
                .ok_or_else(|| CoreError::MissingSlot {
                    intent: intent.into(),
                    slot: "device".into(),
                })
        };

        match request.intent_name.as_str() {
            "Try me" => Ok(Intent::TryMe),
            "Enable all" => Ok(Intent::EnableAll),
            "Disable all" => Ok(Intent::DisableAll),
            "List devices" => Ok(Intent::ListDevices),
            "Describe" => Ok(Intent::Describe {
                device: device("Describe")?,
            }),
            "Set mode" => Ok(Intent::SetMode {
                device: device("Set mode")?,
                mode: request.slots.get("mode").cloned().filter(|m| !m.is_empty()),
                color: request
                    .slots
                    .get("color")
                    .cloned()
                    .filter(|c| !c.is_empty()),
            }),
            other => Err(CoreError::UnknownIntent { name: other.into() }),
        }
    }
}

/// Fixed table of colors the assistant understands.
pub fn color_by_name(name: &str) -> Option<Rgb> {
    let rgb = |red, green, blue| Rgb { red, green, blue };
    match name.to_lowercase().as_str() {
        "red" => Some(rgb(255, 0, 0)),
        "orange" => Some(rgb(255, 128, 0)),
        "yellow" => Some(rgb(255, 255, 0)),
        "green" => Some(rgb(0, 255, 0)),
        "cyan" => Some(rgb(0, 255, 255)),
        "blue" => Some(rgb(0, 0, 255)),
        "purple" => Some(rgb(128, 0, 255)),
        "magenta" => Some(rgb(255, 0, 255)),
        "pink" => Some(rgb(255, 64, 128)),
        "white" => Some(rgb(255, 255, 255)),
        _ => None,
    }
}

/// Execute an intent and produce the spoken response.
pub(crate) async fn dispatch(
    client: &SyncClient,
    store: &FleetStore,
    actor: &str,
    intent: Intent,
) -> Result<String, CoreError> {
    debug!(?intent, "dispatching intent");
    match intent {
        Intent::TryMe => Ok("You wanted to try me. Okay then.".into()),

        Intent::EnableAll => {
            reconciler::set_all_enabled(client, store, actor, true)
                .await?
                .into_result()?;
            Ok("Okay, all Blinky devices have been enabled.".into())
        }

        Intent::DisableAll => {
            reconciler::set_all_enabled(client, store, actor, false)
                .await?
                .into_result()?;
            Ok("Okay, all Blinky devices have been disabled.".into())
        }

        Intent::ListDevices => Ok(device_list_response(store)),

        Intent::Describe { device } => {
            let resolution = match reconciler::resolve_selector(store, &device) {
                Ok(r) => r,
                Err(CoreError::NoSuchSelector { .. }) => {
                    return Ok(unknown_device_response(store, &device));
                }
                Err(e) => return Err(e),
            };
            let id = match resolution {
                Resolution::Strip(id) => id,
                // Describing a group describes its first member.
                Resolution::Group(ids) => ids
                    .first()
                    .cloned()
                    .ok_or_else(|| CoreError::Internal("empty group resolution".into()))?,
            };
            let strip = store.strip(&id).ok_or(CoreError::StripNotFound { id })?;
            Ok(describe_response(&strip))
        }

        Intent::SetMode {
            device,
            mode,
            color,
        } => {
            let resolution = match reconciler::resolve_selector(store, &device) {
                Ok(r) => r,
                Err(CoreError::NoSuchSelector { .. }) => {
                    return Ok(unknown_device_response(store, &device));
                }
                Err(e) => return Err(e),
            };

            // Color wins when both slots are filled.
            let (field, spoken) = if let Some(color_name) = color {
                match color_by_name(&color_name) {
                    Some(rgb) => (ConfigField::Color(rgb), color_name.to_lowercase()),
                    None => {
                        return Ok(format!(
                            "Sorry, I don't know the color {color_name}."
                        ));
                    }
                }
            } else if let Some(mode_name) = mode {
                match Mode::from_str(&mode_name) {
                    Ok(m) => (ConfigField::Mode(m), m.to_string()),
                    Err(_) => {
                        return Ok(format!("Sorry, I don't know the mode {mode_name}."));
                    }
                }
            } else {
                return Ok("Tell me a mode or a color and I'll set it.".into());
            };

            reconciler::fanout(client, store, actor, resolution.ids(), &field)
                .await
                .into_result()?;
            Ok(format!("Okay, I've set {device} to {spoken}."))
        }
    }
}

// ── Response builders ────────────────────────────────────────────────

/// One display name per strip, in id order.
fn device_names(store: &FleetStore) -> Vec<String> {
    store
        .strips_snapshot()
        .iter()
        .map(|s| match s.name() {
            Some(name) => name.to_owned(),
            None => format!("unnamed with key {}", s.id),
        })
        .collect()
}

fn device_list_response(store: &FleetStore) -> String {
    format!(
        "Here are the Blinky devices that I know about: {}.",
        device_names(store).join(", ")
    )
}

fn unknown_device_response(store: &FleetStore, token: &str) -> String {
    format!(
        "Sorry, I don't know about a device or group called {token}. {}",
        device_list_response(store)
    )
}

fn describe_response(strip: &Strip) -> String {
    let name = strip
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("the unnamed device with key {}", strip.id));

    let Some(checkin) = &strip.last_checkin else {
        return format!("{name} has never checked in.");
    };

    let config_part = match &strip.current {
        Some(config) => format!(
            " It is {} and running mode {}.",
            if config.enabled { "enabled" } else { "disabled" },
            config.mode
        ),
        None => String::new(),
    };

    format!(
        "{name} last checked in at {}, from IP {} with MAC {} and signal strength {} dBm.{config_part}",
        checkin.timestamp.to_rfc3339(),
        checkin.ip,
        checkin.mac,
        checkin.rssi,
    )
}
