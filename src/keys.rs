//! Closed key sets
//!
//! Every column, grouping, plot-kind and outcome name accepted by the
//! plotting functions is an enum variant here. Declarations deserialize
//! straight into these types, so an unknown key is rejected while the
//! configuration is parsed, before any data is touched.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;

/// Defines a string-keyed enum with `ALL`, `as_str`, `Display` and a
/// `FromStr` that reports [`Error::InvalidKey`].
macro_rules! key_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted key, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Key as it appears in files and declarations.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok(Self::$variant),)+
                    other => Err(Error::invalid_key($kind, other)),
                }
            }
        }
    };
}

key_enum! {
    /// Per-timestep sequence columns (one array per episode).
    SequenceColumn, "sequence column" {
        /// Menger curvature of consecutive positions
        Curvature => "curvature",
        /// Curvature normalized by segment length
        NormalizedCurvature => "normalized_curvature",
        /// Path roughness
        Roughness => "roughness",
        /// Distance travelled in each step
        PathLengthValues => "path_length_values",
        /// Difference of consecutive velocities
        Acceleration => "acceleration",
        /// Rate of change of acceleration
        Jerk => "jerk",
        /// Planar speed per step
        Velocity => "velocity",
    }
}

key_enum! {
    /// Per-episode scalar columns.
    ScalarColumn, "scalar column" {
        /// Episode duration in nanoseconds
        TimeDiff => "time_diff",
        /// Mean change of heading over the path
        AngleOverLength => "angle_over_length",
        /// Number of collisions in the episode
        CollisionAmount => "collision_amount",
        /// Complete path length
        PathLength => "path_length",
    }
}

key_enum! {
    /// Columns that distinguish which run or robot produced a row.
    GroupColumn, "differentiate" {
        /// Robot namespace
        Namespace => "namespace",
        /// Local planner name
        LocalPlanner => "local_planner",
        /// Agent name
        AgentName => "agent_name",
        /// Model name
        Model => "model",
        /// Run directory name
        Run => "run",
    }
}

impl Default for GroupColumn {
    fn default() -> Self {
        Self::Namespace
    }
}

key_enum! {
    /// Distribution renderers.
    DistributionKind, "distribution plot" {
        /// Jittered points
        Strip => "strip",
        /// Non-overlapping points
        Swarm => "swarm",
        /// Box and whiskers
        Box => "box",
        /// Letter-value boxes
        Boxen => "boxen",
        /// Kernel density outline
        Violin => "violin",
    }
}

impl Default for DistributionKind {
    fn default() -> Self {
        Self::Swarm
    }
}

key_enum! {
    /// Renderers for a value over the episode index.
    CategoricalKind, "categorical plot" {
        /// Connected line per group
        Line => "line",
        /// Grouped bars per episode
        Bar => "bar",
    }
}

impl Default for CategoricalKind {
    fn default() -> Self {
        Self::Line
    }
}

key_enum! {
    /// Outcome of one episode.
    EpisodeResult, "result" {
        /// Time budget exhausted
        Timeout => "TIMEOUT",
        /// Robot reached its goal
        GoalReached => "GOAL_REACHED",
        /// Episode ended in a collision
        Collision => "COLLISION",
    }
}

key_enum! {
    /// Action the robot took in one step.
    ActionType, "action type" {
        /// Translating
        Move => "MOVE",
        /// Standing still
        Stop => "STOP",
        /// Turning in place
        Rotate => "ROTATE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_column_roundtrip_names() {
        for column in SequenceColumn::ALL {
            assert_eq!(column.as_str().parse::<SequenceColumn>().unwrap(), *column);
        }
    }

    #[test]
    fn test_velocity_is_not_a_scalar_column() {
        let err = "velocity".parse::<ScalarColumn>().unwrap_err();
        assert!(err.to_string().contains("Invalid scalar column key: velocity"));
    }

    #[test]
    fn test_result_keys_are_upper_case() {
        assert_eq!(
            "GOAL_REACHED".parse::<EpisodeResult>().unwrap(),
            EpisodeResult::GoalReached
        );
        assert!("goal_reached".parse::<EpisodeResult>().is_err());
    }

    #[test]
    fn test_unknown_plot_kind_rejected_by_serde() {
        let parsed: std::result::Result<DistributionKind, _> = serde_yaml::from_str("histogram");
        assert!(parsed.is_err());
        let parsed: DistributionKind = serde_yaml::from_str("boxen").unwrap();
        assert_eq!(parsed, DistributionKind::Boxen);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(GroupColumn::default(), GroupColumn::Namespace);
        assert_eq!(DistributionKind::default(), DistributionKind::Swarm);
        assert_eq!(CategoricalKind::default(), CategoricalKind::Line);
    }
}
