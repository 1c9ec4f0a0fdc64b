//! Run parameter document (`params.yaml`)

use std::path::Path;

use serde::Deserialize;

use crate::Result;

/// Parameters a run was started with.
///
/// Only the keys needed for tagging and scenario validation are read;
/// the simulator writes many more, which are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunParams {
    /// Local planner name
    pub local_planner: String,
    /// Agent name
    pub agent_name: String,
    /// Model name
    pub model: String,
    /// Robot namespace
    pub namespace: String,
    /// Scenario file the run was executed on
    pub scenario_file: String,
}

impl RunParams {
    /// Read a parameter document from disk.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or lacks a required key.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_ignore_extra_keys() {
        let yaml = "
local_planner: dwa
agent_name: burger_agent
model: burger
namespace: sim_1
scenario_file: empty_map.json
record_only_planner: true
";
        let params: RunParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.local_planner, "dwa");
        assert_eq!(params.scenario_file, "empty_map.json");
    }

    #[test]
    fn test_params_require_scenario() {
        let yaml = "local_planner: dwa\nagent_name: a\nmodel: m\nnamespace: n\n";
        assert!(serde_yaml::from_str::<RunParams>(yaml).is_err());
    }
}
