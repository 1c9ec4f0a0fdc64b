//! Scenario document
//!
//! Names the map every compared run drove on, the robot's start and goal,
//! and the obstacles placed in it. Accepted as YAML or JSON:
//!
//! ```yaml
//! map: map_small_warehouse
//! robot:
//!   start: [2.0, 3.5, 0.0]
//!   goal: [12.0, 7.0, 0.0]
//! obstacles:
//!   static:
//!     - pos: [5.0, 5.0]
//!       radius: 0.4
//!   dynamic:
//!     - waypoints: [[6.0, 2.0], [9.0, 2.0], [9.0, 4.0]]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::Result;

/// Radius drawn for static obstacles that do not declare one (m).
pub const DEFAULT_OBSTACLE_RADIUS: f64 = 0.5;

/// Robot start and goal poses (`[x, y, theta]`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RobotTask {
    /// Start pose
    pub start: Vec<f64>,
    /// Goal pose
    pub goal: Vec<f64>,
}

/// Obstacle that never moves.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaticObstacle {
    /// Position in simulation coordinates
    pub pos: Vec<f64>,
    /// Footprint radius (m)
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_radius() -> f64 {
    DEFAULT_OBSTACLE_RADIUS
}

/// Obstacle that patrols a closed waypoint loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DynamicObstacle {
    /// Waypoints in simulation coordinates
    pub waypoints: Vec<Vec<f64>>,
}

impl DynamicObstacle {
    /// Waypoints with the first one repeated at the end.
    #[must_use]
    pub fn closed_loop(&self) -> Vec<Vec<f64>> {
        let mut points = self.waypoints.clone();
        if let Some(first) = self.waypoints.first() {
            points.push(first.clone());
        }
        points
    }
}

/// Obstacles of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Obstacles {
    /// Static obstacles
    #[serde(default, rename = "static")]
    pub static_obstacles: Vec<StaticObstacle>,
    /// Dynamic obstacles
    #[serde(default, rename = "dynamic")]
    pub dynamic_obstacles: Vec<DynamicObstacle>,
}

/// Parsed scenario file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    /// Map directory name under the maps root
    pub map: String,
    /// Robot task
    pub robot: RobotTask,
    /// Obstacles
    #[serde(default)]
    pub obstacles: Obstacles,
}

impl Scenario {
    /// Read a scenario file (YAML or JSON).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
