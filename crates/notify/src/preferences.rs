use serde::Deserialize;

use crate::channel::ChannelKind;

/// Per-tenant channel switches. `None` means enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default)]
    pub email: Option<bool>,
    #[serde(default)]
    pub live_update: Option<bool>,
    #[serde(default)]
    pub operator_session: Option<bool>,
}

impl NotificationPreferences {
    pub fn allows(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::PersistedStore => true,
            ChannelKind::Email => self.email.unwrap_or(true),
            ChannelKind::LiveUpdate => self.live_update.unwrap_or(true),
            ChannelKind::OperatorSession => self.operator_session.unwrap_or(true),
        }
    }
}
