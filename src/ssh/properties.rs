// ABOUTME: Client property overrides extracted from -sshprop arguments.
// ABOUTME: Maps recognized property names onto russh client Config fields.

use super::error::{Error, Result};
use russh::client::Config;
use std::time::Duration;

/// Apply `key=value` property overrides to the client configuration.
///
/// Recognized names map onto typed russh settings; an unparsable value is a
/// hard error. Unrecognized names are warned about and skipped so that
/// properties aimed at other client implementations do not abort the run.
pub(crate) fn apply(config: &mut Config, properties: &[(String, String)]) -> Result<()> {
    for (name, value) in properties {
        match name.as_str() {
            "inactivity-timeout" => {
                config.inactivity_timeout = Some(Duration::from_secs(parse(name, value)?));
            }
            "keepalive-interval" => {
                config.keepalive_interval = Some(Duration::from_secs(parse(name, value)?));
            }
            "keepalive-max" => {
                config.keepalive_max = parse(name, value)?;
            }
            "window-size" => {
                config.window_size = parse(name, value)?;
            }
            "maximum-packet-size" => {
                config.maximum_packet_size = parse(name, value)?;
            }
            _ => {
                tracing::warn!("ignoring unknown client property {}={}", name, value);
            }
        }
    }
    Ok(())
}

fn parse<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| Error::InvalidProperty {
        name: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}
