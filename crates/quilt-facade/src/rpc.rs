//! Typed RPC surface for provisioning operations.
//!
//! An external message bus decodes its own framing and hands this
//! module a JSON envelope of the form
//! `{"method": "...", "params": {...}}`. Dispatch always produces a
//! valid JSON reply: a typed result on success, an `{"error": ...}`
//! object for unknown methods or malformed parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use quilt_provision::{ConstrainedProvisioner, ConstrainedRequest, GatewayProvisioner,
    GatewayRequest, RecordSink};
use quilt_store::{StoreClient, StoreServer};

/// Decoded RPC request envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum Request {
    ProvisionGatewayDevice {
        device_name: String,
        device_type: String,
        licensee_id: i64,
        fcap: String,
        licensee_secret: String,
    },
    IsGatewayDeviceProvisioned,
    ProvisionConstrainedDevice {
        client_id: String,
        device_type: String,
        licensee_id: i64,
        fcap: String,
        parent_id: String,
    },
    IsConstrainedDeviceProvisioned {
        client_id: String,
    },
    GetClientList,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GatewayStatusReply {
    pub provision_status: i32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ConstrainedStatusReply {
    pub status: i32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FlagReply {
    pub provision_status: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ClientRecord {
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub is_device_provisioned: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ClientListReply {
    pub clients: Vec<ClientRecord>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorReply {
    pub error: String,
}

/// The provisioning operations bundled behind one dispatch entry point.
pub struct Facade<C, S> {
    gateway: GatewayProvisioner<C>,
    constrained: ConstrainedProvisioner<S>,
    sink: Box<dyn RecordSink>,
    device_timeout: Duration,
}

impl<C: StoreClient, S: StoreServer> Facade<C, S> {
    pub fn new(
        gateway: GatewayProvisioner<C>,
        constrained: ConstrainedProvisioner<S>,
        sink: Box<dyn RecordSink>,
        device_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            constrained,
            sink,
            device_timeout,
        }
    }

    /// Decode an envelope, run the operation, encode the reply.
    pub async fn dispatch(&self, raw: &str) -> String {
        match serde_json::from_str::<Request>(raw) {
            Ok(request) => self.handle(request).await,
            Err(error) => encode(&ErrorReply {
                error: format!("invalid request: {error}"),
            }),
        }
    }

    async fn handle(&self, request: Request) -> String {
        match request {
            Request::ProvisionGatewayDevice {
                device_name,
                device_type,
                licensee_id,
                fcap,
                licensee_secret,
            } => {
                let request = GatewayRequest {
                    device_name,
                    device_type,
                    licensee_id,
                    fcap,
                    licensee_secret,
                };
                let status = self.gateway.provision(&request, self.sink.as_ref()).await;
                encode(&GatewayStatusReply {
                    provision_status: status.code(),
                })
            }
            Request::IsGatewayDeviceProvisioned => encode(&FlagReply {
                provision_status: self.gateway.is_provisioned().await,
            }),
            Request::ProvisionConstrainedDevice {
                client_id,
                device_type,
                licensee_id,
                fcap,
                parent_id,
            } => {
                let request = ConstrainedRequest {
                    client_id,
                    fcap,
                    device_type,
                    licensee_id,
                    parent_id,
                    timeout: self.device_timeout,
                };
                let status = self.constrained.provision(&request).await;
                encode(&ConstrainedStatusReply {
                    status: status.code(),
                })
            }
            Request::IsConstrainedDeviceProvisioned { client_id } => encode(&FlagReply {
                provision_status: self.constrained.is_provisioned(&client_id).await,
            }),
            Request::GetClientList => match self.constrained.client_list().await {
                Ok(entries) => encode(&ClientListReply {
                    clients: entries
                        .into_iter()
                        .map(|entry| ClientRecord {
                            client_id: entry.client_id,
                            is_device_provisioned: entry.provisioned,
                        })
                        .collect(),
                }),
                Err(error) => encode(&ErrorReply {
                    error: format!("failed to list clients: {error}"),
                }),
            },
        }
    }
}

fn encode<T: Serialize>(reply: &T) -> String {
    serde_json::to_string(reply).expect("reply serialization never fails")
}
