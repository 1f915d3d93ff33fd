// Account endpoints
//
// The users endpoint lists the automations (devices) bound to the
// account; device-name resolution is a linear scan over that list.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::AccessToken;
use crate::client::CloudClient;
use crate::error::Error;
use crate::retry;

/// One automation (device/controller unit) registered to the account.
#[derive(Debug, Clone, Deserialize)]
pub struct Automation {
    pub uuid: String,
    #[serde(default)]
    pub info: AutomationInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutomationInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    data: UsersData,
}

#[derive(Debug, Default, Deserialize)]
struct UsersData {
    #[serde(default)]
    automations: Vec<Automation>,
}

impl CloudClient {
    /// List the automations registered to the account.
    ///
    /// `GET {auth}/api/v1/users/?access_token={token}`. Transient
    /// failures are retried; a malformed payload is terminal.
    pub async fn list_automations(&self, token: &AccessToken) -> Result<Vec<Automation>, Error> {
        let url = self.users_url(token.expose())?;

        self.retry()
            .run(
                "automation listing",
                retry::lookup_classification,
                || {
                    let url = url.clone();
                    async move {
                    debug!("listing account automations");
                    let resp = self
                        .http()
                        .get(url)
                        .send()
                        .await
                        .map_err(Error::Transport)?;
                    let envelope: UsersEnvelope = Self::parse_json(resp).await?;
                    Ok(envelope.data.automations)
                    }
                },
            )
            .await
    }

    /// Resolve a configured device name to its automation UUID.
    ///
    /// Case-sensitive exact match over the automation list. A missing
    /// name returns `Ok(None)` -- that is a terminal answer from the
    /// account, not a transient failure.
    pub async fn resolve_device_id(
        &self,
        token: &AccessToken,
        device_name: &str,
    ) -> Result<Option<String>, Error> {
        let automations = self.list_automations(token).await?;

        let found = automations
            .into_iter()
            .find(|a| a.info.name.as_deref() == Some(device_name))
            .map(|a| a.uuid);

        match &found {
            Some(uuid) => info!(device_name, uuid = uuid.as_str(), "resolved device"),
            None => warn!(device_name, "device not found among account automations"),
        }
        Ok(found)
    }
}
