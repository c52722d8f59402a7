//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use quoteverse_core::config::{ConfigSource, LayeredConfig};
use std::collections::BTreeMap;
use tabled::Tabled;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let values: BTreeMap<String, ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| {
            (
                key,
                ConfigEntry {
                    value,
                    source: format!("{:?}", source),
                },
            )
        })
        .collect();

    if output.is_json() {
        return output.result(ConfigOutput { values });
    }

    output.section("Configuration Values");

    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let rows: Vec<ConfigRow> = values
        .into_iter()
        .map(|(key, entry)| ConfigRow {
            key,
            value: entry.value,
            source: entry.source,
        })
        .collect();

    output.table(rows);

    let overridden = config
        .to_inspection_map()
        .values()
        .filter(|(_, source)| *source != ConfigSource::Default)
        .count();
    if overridden > 0 {
        output.info(format!("{} value(s) differ from the defaults", overridden));
    }
    Ok(())
}
