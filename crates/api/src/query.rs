//! Query parameter types for API handlers.

use serde::Deserialize;

/// Parameters for `GET /api/projects` (`?sort=`).
///
/// `sort` defaults to `true`: newest `startDate` first.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_sort")]
    pub sort: bool,
}

fn default_sort() -> bool {
    true
}
