use crate::config::Config;
use crate::harvest::LogHarvester;

/// Harvest once and print the new lines, one per line or as a JSON array.
pub fn collect(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let harvester = LogHarvester::from_config(&config.harvest);
    let lines = harvester.collect();

    tracing::info!(count = lines.len(), "Harvested new log lines");

    if json {
        println!("{}", serde_json::to_string(&lines)?);
    } else {
        for line in &lines {
            println!("{}", line);
        }
    }

    Ok(())
}
