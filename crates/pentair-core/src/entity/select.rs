// Pump program select adapter
//
// The one writable control: which program an IF31 pump controller runs.
// Options are rebuilt from the live snapshot on every read; a write
// goes through the coordinator and leaves the snapshot untouched until
// the next refresh.

use tracing::debug;

use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::{Device, DeviceId, DeviceType, STOPPED_PROGRAM};

use super::{unique_id, DeviceInfo};

const SELECT_KEY: &str = "active_program_name";

/// Selectable pump program entity for one IF31 pump controller.
pub struct PumpProgramSelect {
    coordinator: Coordinator,
    device_id: DeviceId,
    unique_id: String,
    device_info: DeviceInfo,
}

impl PumpProgramSelect {
    fn new(coordinator: Coordinator, device: &Device) -> Self {
        Self {
            coordinator,
            device_id: device.id.clone(),
            unique_id: unique_id(device, SELECT_KEY),
            device_info: DeviceInfo::from_device(device),
        }
    }

    /// The selectable options: `"Stopped"` plus the device's enabled
    /// program names, in program-list order.
    pub fn options(&self) -> Vec<String> {
        let mut options = vec![STOPPED_PROGRAM.to_owned()];
        if let Some(device) = self.device() {
            options.extend(device.enabled_programs.iter().map(|p| p.name.clone()));
        }
        options
    }

    /// The currently active program name, or `"Stopped"` when none is
    /// reported.
    pub fn current_option(&self) -> String {
        self.device()
            .and_then(|d| d.active_program_name.clone())
            .unwrap_or_else(|| STOPPED_PROGRAM.to_owned())
    }

    /// Change the active program, then ask the host to re-render.
    ///
    /// The snapshot is not modified; `current_option` keeps reporting
    /// the old program until the next refresh confirms the change.
    pub async fn select_option(&self, option: &str) -> Result<(), CoreError> {
        let device = self.device().ok_or_else(|| CoreError::DeviceNotFound {
            device_id: self.device_id.to_string(),
        })?;

        debug!(device_id = %self.device_id, option, "selecting pump program");
        self.coordinator
            .change_active_pump_program(&device, option)
            .await?;
        self.coordinator.notify_changed();
        Ok(())
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    fn device(&self) -> Option<std::sync::Arc<Device>> {
        self.coordinator.get_device(&self.device_id)
    }
}

/// Build one select entity per pump controller currently known to the
/// coordinator.
pub fn pump_program_selects(coordinator: &Coordinator) -> Vec<PumpProgramSelect> {
    coordinator
        .get_devices(Some(&DeviceType::PumpController))
        .iter()
        .map(|device| PumpProgramSelect::new(coordinator.clone(), device))
        .collect()
}
