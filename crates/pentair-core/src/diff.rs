// ── Snapshot diff ──
//
// Ordering-insensitive structural comparison of two device collections,
// keyed by device id. Used by the coordinator for diagnostic logging
// only; it carries no control-flow significance.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::model::{Device, DeviceId};

/// Differences between two device collections, by device id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<DeviceId>,
    pub removed: Vec<DeviceId>,
    pub changed: Vec<DeviceId>,
}

impl SnapshotDiff {
    /// Compare two collections. Order within each collection is ignored;
    /// a device counts as changed when any reported attribute differs.
    pub fn between(old: &[Arc<Device>], new: &[Arc<Device>]) -> Self {
        let old_by_id: HashMap<&DeviceId, &Arc<Device>> =
            old.iter().map(|d| (&d.id, d)).collect();
        let new_by_id: HashMap<&DeviceId, &Arc<Device>> =
            new.iter().map(|d| (&d.id, d)).collect();

        let mut added: Vec<DeviceId> = Vec::new();
        let mut changed: Vec<DeviceId> = Vec::new();

        for device in new {
            match old_by_id.get(&device.id) {
                None => added.push(device.id.clone()),
                Some(previous) if ***previous != **device => changed.push(device.id.clone()),
                Some(_) => {}
            }
        }

        let mut removed: Vec<DeviceId> = old
            .iter()
            .filter(|d| !new_by_id.contains_key(&d.id))
            .map(|d| d.id.clone())
            .collect();

        // Deterministic log output regardless of fetch order.
        added.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        removed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        changed.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        Self {
            added,
            removed,
            changed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

impl fmt::Display for SnapshotDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no changes");
        }

        let mut parts: Vec<String> = Vec::new();
        if !self.added.is_empty() {
            parts.push(format!("added: {}", join_ids(&self.added)));
        }
        if !self.removed.is_empty() {
            parts.push(format!("removed: {}", join_ids(&self.removed)));
        }
        if !self.changed.is_empty() {
            parts.push(format!("changed: {}", join_ids(&self.changed)));
        }
        write!(f, "{}", parts.join("; "))
    }
}

fn join_ids(ids: &[DeviceId]) -> String {
    ids.iter()
        .map(DeviceId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceType;
    use pretty_assertions::assert_eq;

    fn device(id: &str, battery: Option<f64>) -> Arc<Device> {
        Arc::new(Device {
            id: DeviceId::new(id),
            device_type: DeviceType::BackupPump,
            nickname: None,
            maker: None,
            model: None,
            software_version: None,
            online: Some(true),
            power: None,
            low_battery: None,
            battery_charging: None,
            primary_pump_alert: None,
            secondary_pump_alert: None,
            water_level_alert: None,
            last_report: None,
            battery_level: battery,
            average_salt_usage_per_day: None,
            salt_level: None,
            current_power_consumption: None,
            current_motor_speed: None,
            current_estimated_flow: None,
            active_program_number: None,
            active_program_name: None,
            enabled_programs: Vec::new(),
        })
    }

    #[test]
    fn identical_collections_produce_empty_diff() {
        let old = vec![device("a", Some(90.0)), device("b", None)];
        let new = vec![device("a", Some(90.0)), device("b", None)];
        assert!(SnapshotDiff::between(&old, &new).is_empty());
    }

    #[test]
    fn reordering_is_not_a_change() {
        let old = vec![device("a", Some(90.0)), device("b", None)];
        let new = vec![device("b", None), device("a", Some(90.0))];
        assert!(SnapshotDiff::between(&old, &new).is_empty());
    }

    #[test]
    fn reports_additions_removals_and_changes() {
        let old = vec![device("a", Some(90.0)), device("b", None)];
        let new = vec![device("a", Some(85.0)), device("c", None)];

        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(diff.added, vec![DeviceId::new("c")]);
        assert_eq!(diff.removed, vec![DeviceId::new("b")]);
        assert_eq!(diff.changed, vec![DeviceId::new("a")]);
    }

    #[test]
    fn display_is_readable() {
        let old = vec![device("a", Some(90.0))];
        let new = vec![device("a", Some(85.0)), device("b", None)];

        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(diff.to_string(), "added: b; changed: a");
        assert_eq!(SnapshotDiff::default().to_string(), "no changes");
    }
}
