//! Voice intent handler: runs an intent through the dispatcher and
//! prints the spoken response. Useful for testing assistant wiring
//! without a voice front end.

use std::collections::BTreeMap;

use blinky_core::{Controller, Intent, IntentRequest};

use crate::cli::{GlobalOpts, IntentArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: IntentArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let request = build_request(args)?;
    let intent = Intent::parse(&request)?;
    let response = controller.handle_intent(intent).await?;
    output::print_output(&response, global.quiet);
    Ok(())
}

/// `blinky describe <device>`: the Describe intent as a first-class command.
pub async fn describe(
    controller: &Controller,
    device: String,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let response = controller.handle_intent(Intent::Describe { device }).await?;
    output::print_output(&response, global.quiet);
    Ok(())
}

fn build_request(args: IntentArgs) -> Result<IntentRequest, CliError> {
    if let Some(path) = args.from_file {
        let contents = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&contents)?);
    }

    let name = args.name.ok_or_else(|| CliError::Validation {
        field: "intent".into(),
        reason: "an intent name or --from-file is required".into(),
    })?;

    let mut slots = BTreeMap::new();
    for pair in args.slot {
        let (key, value) = pair.split_once('=').ok_or_else(|| CliError::Validation {
            field: "slot".into(),
            reason: format!("'{pair}' is not a key=value pair"),
        })?;
        slots.insert(key.to_owned(), value.to_owned());
    }

    Ok(IntentRequest {
        intent_name: name,
        slots,
    })
}
