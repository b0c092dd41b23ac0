//! Widget configuration and the duration strings the CLI accepts.

use anyhow::{Context as _, Result, anyhow, bail};
use std::time::Duration;

/// Root selector used when none is given.
pub const DEFAULT_ROOT_SELECTOR: &str = "[data-smart-cli]";

/// Command shown when none is given.
pub const DEFAULT_COMMAND: &str = "pip install snakeskin-xplnhub";

/// Options recognised by [`crate::widget::init`].
///
/// Supplied once at initialization and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetConfig {
    /// Locates the widget root through [`crate::host::Host::resolve_root`].
    pub root_selector: String,
    /// Commands typed in order. Must not be empty.
    pub commands: Vec<String>,
    /// Base delay between typed characters.
    pub typing_speed: Duration,
    /// Pause on a fully typed command before deleting it.
    pub pause_between: Duration,
    /// Base delay between deleted characters.
    pub delete_speed: Duration,
    /// Keep cycling through the commands forever.
    pub looping: bool,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        SnippetConfig {
            root_selector: DEFAULT_ROOT_SELECTOR.to_string(),
            commands: vec![DEFAULT_COMMAND.to_string()],
            typing_speed: Duration::from_millis(50),
            pause_between: Duration::from_millis(2000),
            delete_speed: Duration::from_millis(30),
            looping: true,
        }
    }
}

impl SnippetConfig {
    /// Default configuration typing the given commands.
    pub fn with_commands<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SnippetConfig {
            commands: commands.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn root_selector(mut self, selector: impl Into<String>) -> Self {
        self.root_selector = selector.into();
        self
    }

    pub fn typing_speed(mut self, speed: Duration) -> Self {
        self.typing_speed = speed;
        self
    }

    pub fn pause_between(mut self, pause: Duration) -> Self {
        self.pause_between = pause;
        self
    }

    pub fn delete_speed(mut self, speed: Duration) -> Self {
        self.delete_speed = speed;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Reject configurations that would index an empty command list or
    /// animate with a zero step.
    pub fn validate(&self) -> Result<()> {
        if self.commands.is_empty() {
            bail!("commands must contain at least one entry");
        }
        if self.typing_speed.is_zero() {
            bail!("typing speed must be positive");
        }
        if self.delete_speed.is_zero() {
            bail!("delete speed must be positive");
        }
        Ok(())
    }
}

/// Parse a duration string: `1s`, `500ms`, `1.5s`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms_str) = s.strip_suffix("ms") {
        let ms: u64 = ms_str
            .trim()
            .parse()
            .context("Invalid milliseconds value")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(s_str) = s.strip_suffix('s') {
        let secs: f64 = s_str.trim().parse().context("Invalid seconds value")?;
        Duration::try_from_secs_f64(secs).map_err(|_| anyhow!("Invalid seconds value: {}", s))
    } else {
        Err(anyhow!("Duration must end with 's' or 'ms', got: {}", s))
    }
}
