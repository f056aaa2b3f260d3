//! Normalized run configuration
//!
//! All defaults are applied here, once. Nothing downstream re-checks them.

use std::path::PathBuf;
use std::time::Duration;

use super::Args;
use crate::poll::PollSettings;
use crate::render::OutputFormat;
use crate::resolve::Overrides;

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub image: PathBuf,
    pub overrides: Overrides,
    pub poll: PollSettings,
    pub format: OutputFormat,
    /// `None` = run until signalled
    pub duration: Option<Duration>,
    pub quiet: bool,
}

impl From<Args> for WatchConfig {
    fn from(args: Args) -> Self {
        Self {
            image: args.image,
            overrides: Overrides {
                program: args.program,
                table: args.map,
                category: args.tp_category,
                entry: args.tp_name,
            },
            poll: PollSettings::normalized(args.interval, args.top, args.reset),
            format: args.format,
            duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
            quiet: args.quiet,
        }
    }
}
