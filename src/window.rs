use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Static description of a count window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDef {
    pub name: String,
    pub title: String,
    pub days: Option<u32>,
}

impl WindowDef {
    pub fn new(name: &str, title: &str, days: Option<u32>) -> Self {
        Self { name: name.to_string(), title: title.to_string(), days }
    }

    pub fn defaults() -> Vec<WindowDef> {
        vec![
            WindowDef::new("alltime", "all time", None),
            WindowDef::new("last30", "last 30 days", Some(30)),
        ]
    }
}

/// A window together with its cutoff, which stays unresolved until the
/// newest record of the archive is known.
#[derive(Debug, Clone)]
pub struct CountWindow {
    pub name: String,
    pub title: String,
    pub days: Option<u32>,
    cutoff: Option<DateTime<Tz>>,
    resolved: bool,
}

impl CountWindow {
    pub fn from_def(def: &WindowDef) -> Self {
        Self {
            name: def.name.clone(),
            title: def.title.clone(),
            days: def.days,
            cutoff: None,
            resolved: false,
        }
    }

    /// Fix the cutoff from the newest timestamp. Only the first call has an effect.
    pub fn resolve(&mut self, newest: DateTime<Tz>) {
        if self.resolved { return; }
        self.cutoff = self.days.map(|d| newest - Duration::seconds(i64::from(d) * 86_400));
        self.resolved = true;
    }

    pub fn cutoff(&self) -> Option<DateTime<Tz>> {
        self.cutoff
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn admits(&self, ts: &DateTime<Tz>) -> bool {
        match self.cutoff {
            Some(c) => *ts >= c,
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowRegistry {
    windows: Vec<CountWindow>,
}

impl WindowRegistry {
    pub fn new(defs: &[WindowDef]) -> Self {
        Self { windows: defs.iter().map(CountWindow::from_def).collect() }
    }

    pub fn resolve_all(&mut self, newest: DateTime<Tz>) {
        for w in &mut self.windows {
            w.resolve(newest);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountWindow> {
        self.windows.iter()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cutoff_resolves_once() {
        let mut w = CountWindow::from_def(&WindowDef::new("last30", "last 30 days", Some(30)));
        let newest = Tz::UTC.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        w.resolve(newest);
        w.resolve(newest + Duration::days(100));
        assert_eq!(w.cutoff(), Some(Tz::UTC.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
    }

    #[test]
    fn alltime_has_no_cutoff() {
        let mut w = CountWindow::from_def(&WindowDef::new("alltime", "all time", None));
        let ts = Tz::UTC.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        w.resolve(Tz::UTC.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(w.cutoff().is_none());
        assert!(w.admits(&ts));
    }
}
