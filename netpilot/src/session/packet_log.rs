//! Per-session raw packet log.
//!
//! Every line sent or received is appended verbatim to
//! `<dir>/<CALLSIGN>-<YYYYmmdd-HHMMSS>.log`:
//!
//! ```text
//! 2026-03-01T18:04:11.120Z >> #APN12345:SERVER:1234567:XXXXXX:1:100:0:Jane Doe
//! 2026-03-01T18:04:11.342Z << $CRSERVER:N12345:IP:203.0.113.7
//! ```
//!
//! Passwords in registration packets never reach the file.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Replacement for redacted credentials.
const REDACTED: &str = "XXXXXX";

/// Direction of a logged line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    fn marker(&self) -> &'static str {
        match self {
            Self::Sent => ">>",
            Self::Received => "<<",
        }
    }
}

/// Append-only log of the raw protocol lines of one session.
pub struct PacketLog {
    writer: RollingFileAppender,
    path: PathBuf,
}

impl PacketLog {
    /// Create the log file for a session started at `started`.
    pub fn create(dir: &Path, callsign: &str, started: DateTime<Utc>) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let file_name = format!(
            "{}-{}.log",
            callsign.to_ascii_uppercase(),
            started.format("%Y%m%d-%H%M%S")
        );
        let writer = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(&file_name)
            .build(dir)
            .map_err(|e| io::Error::other(e.to_string()))?;

        Ok(Self {
            writer,
            path: dir.join(file_name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sent(&mut self, line: &str) {
        self.record(Direction::Sent, line);
    }

    pub fn received(&mut self, line: &str) {
        self.record(Direction::Received, line);
    }

    fn record(&mut self, direction: Direction, line: &str) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = line.trim_end_matches(['\r', '\n']);
        if let Err(e) = writeln!(
            self.writer,
            "{timestamp} {} {}",
            direction.marker(),
            redact(line)
        ) {
            tracing::debug!(error = %e, path = %self.path.display(), "Packet log write failed");
        }
    }
}

/// Mask the password field of `#AP` and `#AA` lines.
pub fn redact(line: &str) -> Cow<'_, str> {
    let password_index = if line.starts_with("#AP") {
        3
    } else if line.starts_with("#AA") {
        4
    } else {
        return Cow::Borrowed(line);
    };

    let mut fields: Vec<&str> = line.split(':').collect();
    match fields.get_mut(password_index) {
        Some(field) if !field.is_empty() => {
            *field = REDACTED;
            Cow::Owned(fields.join(":"))
        }
        _ => Cow::Borrowed(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_redact_add_pilot() {
        assert_eq!(
            redact("#APN12345:SERVER:1234567:secret:1:100:0:Jane Doe"),
            "#APN12345:SERVER:1234567:XXXXXX:1:100:0:Jane Doe"
        );
    }

    #[test]
    fn test_redact_add_atc() {
        assert_eq!(
            redact("#AAN12345:SERVER:Jane Doe:1234567:secret:1:100"),
            "#AAN12345:SERVER:Jane Doe:1234567:XXXXXX:1:100"
        );
    }

    #[test]
    fn test_other_lines_untouched() {
        let line = "#TMN12345:@22800:my password is secret";
        assert!(matches!(redact(line), Cow::Borrowed(_)));
    }

    #[test]
    fn test_log_file_contents() {
        let dir = TempDir::new().unwrap();
        let started = Utc.with_ymd_and_hms(2026, 3, 1, 18, 4, 11).unwrap();
        let mut log = PacketLog::create(dir.path(), "n12345", started).unwrap();

        log.sent("#APN12345:SERVER:1234567:secret:1:100:0:Jane Doe\r\n");
        log.received("$DISERVER:CLIENT:FSD:abc");

        let path = dir.path().join("N12345-20260301-180411.log");
        assert_eq!(log.path(), path);
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(">> #APN12345:SERVER:1234567:XXXXXX:1:100:0:Jane Doe"));
        assert!(lines[1].ends_with("<< $DISERVER:CLIENT:FSD:abc"));
        assert!(!contents.contains("secret"));
    }

    #[test]
    fn test_log_appends() {
        let dir = TempDir::new().unwrap();
        let started = Utc.with_ymd_and_hms(2026, 3, 1, 18, 4, 11).unwrap();
        {
            let mut log = PacketLog::create(dir.path(), "N1", started).unwrap();
            log.sent("first");
        }
        let mut log = PacketLog::create(dir.path(), "N1", started).unwrap();
        log.sent("second");

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
