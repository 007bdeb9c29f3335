use serde::Serialize;

use crate::{iso_timestamp::IsoTimestamp, task::Task};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub tasks: Vec<Task>,
    /// Always empty; sync overwrites instead of merging.
    pub conflicts: Vec<Task>,
    pub sync_time: IsoTimestamp,
}
