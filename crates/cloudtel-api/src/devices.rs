// Device endpoints: live status and declared specification

use secrecy::SecretString;
use tracing::debug;

use crate::client::CloudClient;
use crate::error::Error;
use crate::models::{DataPoint, DeviceSpecificationResponse};

impl CloudClient {
    /// Current data-point values of a device.
    ///
    /// `GET /v1.0/iot-03/devices/{device_id}/status`
    pub async fn device_status(
        &self,
        device_id: &str,
        access_token: &SecretString,
    ) -> Result<Vec<DataPoint>, Error> {
        debug!(device_id, "fetching device status");
        self.get(&format!("/v1.0/iot-03/devices/{device_id}/status"), Some(access_token))
            .await
    }

    /// Declared functions and status data points of a device.
    ///
    /// `GET /v1.0/iot-03/devices/{device_id}/specification`
    pub async fn device_specification(
        &self,
        device_id: &str,
        access_token: &SecretString,
    ) -> Result<DeviceSpecificationResponse, Error> {
        debug!(device_id, "fetching device specification");
        self.get(
            &format!("/v1.0/iot-03/devices/{device_id}/specification"),
            Some(access_token),
        )
        .await
    }
}
