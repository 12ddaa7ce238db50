use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    /// RFC 3339 timestamp used for `lastmod`.
    fn lastmod(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always reports the same instant; makes repeated runs byte-identical.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
