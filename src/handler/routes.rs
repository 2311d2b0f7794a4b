//! Route table
//!
//! The set of routes is closed and known at compile time. Lookup is an exact match on
//! the request path: no prefixes, no patterns, no trailing-slash folding.

use std::collections::HashMap;

/// One variant per served path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Wedding,
    Debug,
    DropboxDebug,
    DropboxLog,
    DaysUntil,
    CleaningFromGcal,
    ErrorDebug,
}

impl Route {
    pub const ALL: [Self; 7] = [
        Self::Wedding,
        Self::Debug,
        Self::DropboxDebug,
        Self::DropboxLog,
        Self::DaysUntil,
        Self::CleaningFromGcal,
        Self::ErrorDebug,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            Self::Wedding => "/v1/wedding",
            Self::Debug => "/v1/debug",
            Self::DropboxDebug => "/v1/dropbox-debug",
            Self::DropboxLog => "/v1/dropbox-log",
            Self::DaysUntil => "/v1/days-until",
            Self::CleaningFromGcal => "/v1/cleaning-from-gcal",
            Self::ErrorDebug => "/v1/error-debug",
        }
    }
}

/// Immutable path → route mapping, built once at startup
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<&'static str, Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: Route::ALL.iter().map(|r| (r.path(), *r)).collect(),
        }
    }

    pub fn lookup(&self, path: &str) -> Option<Route> {
        self.routes.get(path).copied()
    }
}
