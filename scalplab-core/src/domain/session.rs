//! Trading session labels derived from the exchange wall clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete session label for one bar.
///
/// Boundaries are fixed exchange-local hours: the Globex day opens at 18:00,
/// the cash session at 09:30, and the 17:00 hour is the daily maintenance
/// break. `Closed` is the fallback label; with the fixed boundaries every
/// hour maps to a named session, but the variant is kept so an unlabeled bar
/// is never silently treated as tradeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    Asia,
    Europe,
    Us,
    AfterHours,
    Maintenance,
    Closed,
}

impl Session {
    /// Label a bar from its exchange-local hour and minute.
    pub fn from_exchange_time(hour: u32, minute: u32) -> Self {
        if hour >= 18 || hour < 2 {
            Session::Asia
        } else if hour < 9 || (hour == 9 && minute < 30) {
            Session::Europe
        } else if (hour == 9 && minute >= 30) || (hour >= 10 && hour < 16) {
            Session::Us
        } else if hour == 16 {
            Session::AfterHours
        } else if hour == 17 {
            Session::Maintenance
        } else {
            Session::Closed
        }
    }

    /// Whether new entries may be opened during this session.
    pub fn is_tradeable(self) -> bool {
        !matches!(self, Session::Maintenance | Session::Closed)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Session::Asia => "Asia",
            Session::Europe => "Europe",
            Session::Us => "US",
            Session::AfterHours => "After Hours",
            Session::Maintenance => "Maintenance",
            Session::Closed => "Closed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_boundaries() {
        assert_eq!(Session::from_exchange_time(18, 0), Session::Asia);
        assert_eq!(Session::from_exchange_time(23, 45), Session::Asia);
        assert_eq!(Session::from_exchange_time(1, 59), Session::Asia);
        assert_eq!(Session::from_exchange_time(2, 0), Session::Europe);
        assert_eq!(Session::from_exchange_time(9, 29), Session::Europe);
        assert_eq!(Session::from_exchange_time(9, 30), Session::Us);
        assert_eq!(Session::from_exchange_time(15, 59), Session::Us);
        assert_eq!(Session::from_exchange_time(16, 0), Session::AfterHours);
        assert_eq!(Session::from_exchange_time(17, 0), Session::Maintenance);
        assert_eq!(Session::from_exchange_time(17, 59), Session::Maintenance);
    }

    #[test]
    fn tradeable_sessions() {
        assert!(Session::Asia.is_tradeable());
        assert!(Session::Europe.is_tradeable());
        assert!(Session::Us.is_tradeable());
        assert!(Session::AfterHours.is_tradeable());
        assert!(!Session::Maintenance.is_tradeable());
        assert!(!Session::Closed.is_tradeable());
    }
}
