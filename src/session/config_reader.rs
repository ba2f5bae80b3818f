use crate::args::Args;
use crate::session::*;

use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use tally_entry::formatter::NumericFormatter;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(rename = "serverUrl")]
    pub server_url: Option<String>,
    #[serde(rename = "pollingStationId")]
    pub polling_station_id: Option<u32>,
    #[serde(rename = "entryNumber")]
    pub entry_number: Option<u32>,
    #[serde(rename = "maxDigits")]
    pub max_digits: Option<usize>,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
    /// Starting values by dotted field name. Numbers or formatted strings.
    pub defaults: Option<BTreeMap<String, JSValue>>,
}

/// Everything a session needs, after merging the file and the flags.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SessionSettings {
    pub server_url: String,
    pub target: EntryTarget,
    pub rules: EntryRules,
    pub timeout: Duration,
    pub defaults: FormValues,
}

pub fn read_config(path: &str) -> EntryResult<SessionConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: SessionConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Merges the configuration file with the command line. Flags win.
pub fn resolve_settings(config: &SessionConfig, args: &Args) -> EntryResult<SessionSettings> {
    let server_url = args
        .server
        .clone()
        .or_else(|| config.server_url.clone())
        .context(MissingServerSnafu {})?;
    let polling_station_id = args
        .station
        .or(config.polling_station_id)
        .context(MissingStationSnafu {})?;
    let entry_number = args.entry.or(config.entry_number).unwrap_or(1);
    let rules = EntryRules {
        max_digits: args
            .max_digits
            .or(config.max_digits)
            .unwrap_or(EntryRules::DEFAULT_RULES.max_digits),
        ..EntryRules::DEFAULT_RULES
    };
    let timeout = match config.timeout_seconds {
        Some(0) => whatever!("timeoutSeconds must be at least 1"),
        Some(s) => Duration::from_secs(s),
        None => Duration::from_secs(10),
    };

    let formatter = NumericFormatter::new(&rules);
    let mut defaults = FormValues::new();
    if let Some(m) = &config.defaults {
        for (name, js) in m.iter() {
            defaults.set(FieldPath::new(name.as_str()), read_js_int(name, js, &formatter)?);
        }
    }

    Ok(SessionSettings {
        server_url,
        target: EntryTarget {
            polling_station_id,
            entry_number,
        },
        rules,
        timeout,
        defaults,
    })
}

fn read_js_int(field: &str, x: &JSValue, formatter: &NumericFormatter) -> EntryResult<u64> {
    match x {
        JSValue::Number(n) => n.as_u64().context(ParsingJsonNumberSnafu { field }),
        // Formatted like on the tally sheet, for example "1.200"
        JSValue::String(s) if s.chars().any(|c| c.is_ascii_digit()) => Ok(formatter.parse(s)),
        _ => None.context(ParsingJsonNumberSnafu { field }),
    }
}
