#[macro_use]
extern crate tracing;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use miette::{Context as _, IntoDiagnostic as _};

pub mod motion_to_scroll;
pub mod utils;

pub use crate::motion_to_scroll::{Momentum, MotionToScroll};
pub use crate::utils::FloatOrInt;

#[derive(knuffel::Decode, Debug, PartialEq)]
pub struct Config {
    #[knuffel(child, default)]
    pub motion_to_scroll: MotionToScroll,
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let _span = tracy_client::span!("Config::parse");
        knuffel::parse(filename, text)
    }

    /// Loads the config from `path`, or falls back to the bundled default one.
    pub fn load_or_default(path: Option<&Path>) -> miette::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("no config path given, using the default config");
                Ok(Self::default())
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse(
            "default-config.kdl",
            include_str!("../../resources/default-config.kdl"),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn can_create_default_config() {
        let _ = Config::default();
    }

    #[test]
    fn default_config_matches_builtin_defaults() {
        let bundled = Config::default();
        let empty = Config::parse("config.kdl", "").unwrap();
        assert_eq!(bundled, empty);
        assert_eq!(bundled.motion_to_scroll, MotionToScroll::default());
    }

    #[test]
    fn empty_block_uses_defaults() {
        let config = Config::parse("config.kdl", "motion-to-scroll {}").unwrap();
        assert_eq!(config.motion_to_scroll, MotionToScroll::default());
    }

    #[track_caller]
    fn do_parse(text: &str) -> Config {
        Config::parse("test.kdl", text)
            .map_err(miette::Report::new)
            .unwrap()
    }

    #[test]
    fn parse() {
        let parsed = do_parse(
            r##"
            motion-to-scroll {
                speed-multiplier 2
                notch-size 12.5
                recent-window-ms 80
                idle-gap-ms 60

                momentum {
                    interval-ms 16
                    decay 0.85
                    cutoff 2
                }
            }
            "##,
        );

        assert_debug_snapshot!(parsed, @r"
        Config {
            motion_to_scroll: MotionToScroll {
                speed_multiplier: FloatOrInt(
                    2.0,
                ),
                notch_size: FloatOrInt(
                    12.5,
                ),
                recent_window_ms: 80,
                idle_gap_ms: 60,
                momentum: Momentum {
                    interval_ms: 16,
                    decay: FloatOrInt(
                        0.85,
                    ),
                    cutoff: FloatOrInt(
                        2.0,
                    ),
                },
            },
        }
        ");
    }

    #[test]
    fn partial_momentum_keeps_other_defaults() {
        let parsed = do_parse(
            r##"
            motion-to-scroll {
                momentum {
                    decay 0.5
                }
            }
            "##,
        );

        let expected = MotionToScroll {
            momentum: Momentum {
                decay: FloatOrInt(0.5),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(parsed.motion_to_scroll, expected);
    }

    #[test]
    fn decay_out_of_range_is_an_error() {
        let result = Config::parse(
            "test.kdl",
            r##"
            motion-to-scroll {
                momentum {
                    decay 1.5
                }
            }
            "##,
        );
        assert!(result.is_err());
    }

    #[test]
    fn string_number_is_an_error() {
        let result = Config::parse("test.kdl", r#"motion-to-scroll { notch-size "ten"; }"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_node_is_an_error() {
        let result = Config::parse("test.kdl", "motion-to-scroll { wheel-size 3; }");
        assert!(result.is_err());
    }
}
