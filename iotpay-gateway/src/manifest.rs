//! Machine-readable manifests for AI agents and other automated clients.

use iotpay_core::{price_for, Capability, DeviceType, HttpMethod};
use iotpay_executor::DeviceProfile;
use iotpay_gate::ChainConfig;
use serde::Serialize;

/// Chain block embedded in every manifest.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentConfig<'a> {
    pub chain_id: u64,
    pub chain_name: &'a str,
    pub token: &'a str,
    pub recipient: &'a str,
    pub rpc_url: &'a str,
}

impl<'a> From<&'a ChainConfig> for PaymentConfig<'a> {
    fn from(chain: &'a ChainConfig) -> Self {
        Self {
            chain_id: chain.chain_id,
            chain_name: &chain.chain_name,
            token: &chain.token,
            recipient: &chain.recipient,
            rpc_url: &chain.rpc_url,
        }
    }
}

/// Entry in the global manifest's device list.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub alias: String,
    pub ens_domain: String,
    pub manifest: String,
}

/// `GET /ai-manifest` body.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalManifest<'a> {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub payment_config: PaymentConfig<'a>,
    pub capabilities: Vec<Capability>,
    pub devices: Vec<DeviceEntry>,
}

/// `GET /devices/{alias}/ai-manifest` body.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceManifest<'a> {
    pub device_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub alias: String,
    pub ens_domain: String,
    pub status: &'static str,
    pub payment_config: PaymentConfig<'a>,
    pub capabilities: Vec<Capability>,
}

#[must_use]
pub fn global_manifest<'a>(
    chain: &'a ChainConfig,
    profiles: Vec<DeviceProfile>,
) -> GlobalManifest<'a> {
    let unlock_price = price_for(DeviceType::SmartLock, "unlock");
    let capabilities = vec![
        Capability::free(
            "list_devices",
            HttpMethod::Get,
            "/status",
            "List every device with its status",
        ),
        Capability::free(
            "device_status",
            HttpMethod::Get,
            "/status/{device_id}",
            "Read one device's live telemetry",
        ),
        Capability::free(
            "resolve",
            HttpMethod::Get,
            "/resolve/{name}",
            "Resolve a symbolic domain such as smartlock.eth to a device",
        ),
        Capability::free(
            "device_manifest",
            HttpMethod::Get,
            "/devices/{alias}/ai-manifest",
            "List a device's actions and their prices",
        ),
        Capability {
            payment_required: !unlock_price.is_free(),
            default_amount_eth: Some(unlock_price),
            ..Capability::free(
                "unlock",
                HttpMethod::Post,
                "/v1/devices/{device_id}/unlock",
                "Unlock a smart lock; send the payment proof as a Bearer token",
            )
        },
        Capability {
            payment_required: true,
            ..Capability::free(
                "device_job",
                HttpMethod::Post,
                "/devices/{alias}/job",
                "Run a device action; the price depends on the action",
            )
        },
    ];

    let devices = profiles
        .into_iter()
        .map(|p| DeviceEntry {
            manifest: format!("/devices/{}/ai-manifest", p.alias),
            id: p.id,
            name: p.name,
            device_type: p.device_type,
            alias: p.alias,
            ens_domain: p.ens_domain,
        })
        .collect();

    GlobalManifest {
        name: "iotpay",
        version: env!("CARGO_PKG_VERSION"),
        description: "Simulated IoT devices whose actions are paid for per call",
        payment_config: chain.into(),
        capabilities,
        devices,
    }
}

#[must_use]
pub fn device_manifest(chain: &ChainConfig, profile: DeviceProfile) -> DeviceManifest<'_> {
    DeviceManifest {
        device_id: profile.id,
        name: profile.name,
        device_type: profile.device_type,
        alias: profile.alias,
        ens_domain: profile.ens_domain,
        status: profile.status,
        payment_config: chain.into(),
        capabilities: profile.capabilities,
    }
}
