//! Per-destination log capture
//!
//! A [`SyncLog`] is created when processing of a destination starts and
//! consumed when its PR body is rendered. Every recorded line is also
//! emitted through `tracing` with the destination name attached.

/// Severity of a captured line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// In-memory log for one destination.
#[derive(Debug, Clone, Default)]
pub struct SyncLog {
    dest: String,
    lines: Vec<(LogLevel, String)>,
}

impl SyncLog {
    pub fn new(dest: impl Into<String>) -> Self {
        Self {
            dest: dest.into(),
            lines: Vec::new(),
        }
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(dest = %self.dest, "{message}");
        self.lines.push((LogLevel::Info, message));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(dest = %self.dest, "{message}");
        self.lines.push((LogLevel::Warn, message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(dest = %self.dest, "{message}");
        self.lines.push((LogLevel::Error, message));
    }

    /// Not captured, only traced.
    pub fn debug(&self, message: impl AsRef<str>) {
        tracing::debug!(dest = %self.dest, "{}", message.as_ref());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|(_, line)| line.as_str())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|(level, _)| *level != LogLevel::Info)
            .map(|(_, line)| line.as_str())
    }

    /// Captured lines joined with newlines.
    pub fn contents(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_levels_in_order() {
        let mut log = SyncLog::new("app");
        log.info("Wrote: justfile");
        log.debug("not captured");
        log.warn("Glob matched no files: x/*");
        log.error("boom");

        assert_eq!(
            log.contents(),
            "Wrote: justfile\nGlob matched no files: x/*\nboom"
        );
        assert_eq!(log.warnings().count(), 2);
        assert_eq!(log.dest(), "app");
    }
}
