//! Renderer-independent figure descriptions

use std::sync::Arc;

use crate::keys::DistributionKind;
use crate::map::Map;

/// Title and output name of one plot, as given by a declaration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotTarget {
    /// Caption drawn above the plot
    pub title: String,
    /// File stem of the rendered image
    pub save_name: String,
}

impl PlotTarget {
    /// Create a target.
    #[must_use]
    pub fn new(title: impl Into<String>, save_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            save_name: save_name.into(),
        }
    }

    /// Derive a per-group target (`<title> (<group>)`, `<save_name>_<group>`).
    #[must_use]
    pub fn for_group(&self, group: &str) -> Self {
        Self {
            title: format!("{} ({group})", self.title),
            save_name: format!("{}_{}", self.save_name, sanitize(group)),
        }
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// A labelled polyline in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend label
    pub label: String,
    /// Points, in drawing order
    pub points: Vec<(f64, f64)>,
}

/// A labelled bag of values (one box, violin or bar group).
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Legend or axis label
    pub label: String,
    /// Values; non-finite entries are not drawn
    pub values: Vec<f64>,
}

/// Static obstacle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleMarker {
    /// Center (px)
    pub center: (f64, f64),
    /// Radius (px)
    pub radius: f64,
}

/// Trajectories and markers drawn over a map raster, in pixel space.
#[derive(Debug, Clone)]
pub struct MapOverlay {
    /// Background raster and its calibration
    pub map: Arc<Map>,
    /// One polyline per trajectory
    pub paths: Vec<Series>,
    /// Static obstacles
    pub static_obstacles: Vec<CircleMarker>,
    /// Closed dynamic-obstacle loops
    pub dynamic_obstacles: Vec<Vec<(f64, f64)>>,
    /// Robot start
    pub start: Option<(f64, f64)>,
    /// Robot goal
    pub goal: Option<(f64, f64)>,
}

/// What a figure shows.
#[derive(Debug, Clone)]
pub enum FigureBody {
    /// One line per series
    Line(Vec<Series>),
    /// Bars per category, one bar per group; `groups[g].values[c]` is the
    /// height of group `g` in category `c`
    Bars {
        /// Category axis labels
        categories: Vec<String>,
        /// Heights per group
        groups: Vec<Group>,
    },
    /// Distribution of each group's values
    Distribution {
        /// Renderer
        kind: DistributionKind,
        /// One entry per category on the x axis
        groups: Vec<Group>,
    },
    /// Map overlay
    Map(MapOverlay),
}

/// One plot, ready to hand to a sink.
#[derive(Debug, Clone)]
pub struct Figure {
    /// Caption and file stem
    pub target: PlotTarget,
    /// X axis description
    pub x_label: String,
    /// Y axis description
    pub y_label: String,
    /// Contents
    pub body: FigureBody,
}

impl Figure {
    /// Assemble a figure.
    #[must_use]
    pub fn new(
        target: PlotTarget,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        body: FigureBody,
    ) -> Self {
        Self {
            target,
            x_label: x_label.into(),
            y_label: y_label.into(),
            body,
        }
    }

    /// File stem of the rendered image.
    #[must_use]
    pub fn save_name(&self) -> &str {
        &self.target.save_name
    }

    /// Caption.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.target.title
    }
}
