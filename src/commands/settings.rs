//! Settings Commands
//!
//! Commands for reading and updating application settings.

use crate::models::response::CommandResponse;
use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::storage::ConfigService;

/// Get current application settings
pub fn get_settings(config: &ConfigService) -> CommandResponse<AppConfig> {
    CommandResponse::ok(config.get_config().clone())
}

/// Update application settings with a partial update
pub fn update_settings(
    config: &mut ConfigService,
    update: SettingsUpdate,
) -> CommandResponse<AppConfig> {
    config.update_config(update).into()
}
