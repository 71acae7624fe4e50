// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables.

use mep_lite_routing::RoutingConfig;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Routing parameters shared by both phases.
    pub routing: RoutingConfig,
    /// Number of worker threads for per-wall parallelism.
    pub worker_threads: usize,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// - `MEP_SEARCH_RADIUS`: Phase 1 search radius (ft)
    /// - `MEP_STUD_SPACING`: nominal stud spacing (ft)
    /// - `MEP_STUD_WIDTH`: stud width along the wall (ft)
    /// - `MEP_PIPE_CLEARANCE`: clearance around each pipe (ft)
    /// - `MEP_WORKER_THREADS`: rayon pool size
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = RoutingConfig::default();
        let length = |key: &str, default: f64| -> f64 {
            match lookup(key).map(|raw| raw.trim().parse::<f64>()) {
                Some(Ok(value)) if value.is_finite() && value > 0.0 => value,
                Some(_) => {
                    tracing::warn!(key, default, "Ignoring invalid length setting");
                    default
                }
                None => default,
            }
        };

        let routing = RoutingConfig {
            search_radius: length("MEP_SEARCH_RADIUS", defaults.search_radius),
            stud_spacing: length("MEP_STUD_SPACING", defaults.stud_spacing),
            stud_width: length("MEP_STUD_WIDTH", defaults.stud_width),
            pipe_clearance: length("MEP_PIPE_CLEARANCE", defaults.pipe_clearance),
            ..defaults
        };

        Self {
            routing,
            worker_threads: lookup("MEP_WORKER_THREADS")
                .and_then(|raw| raw.trim().parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or_else(num_cpus::get),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            routing: RoutingConfig::default(),
            worker_threads: num_cpus::get(),
        }
    }
}
