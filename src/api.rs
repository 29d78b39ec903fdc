// src/api.rs

use crate::error::Result;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

const API_ENDPOINT: &str = "https://easyeda.com/api/products/{lcsc_id}/components?version=6.4.19.5";
const ENDPOINT_3D_MODEL: &str = "https://modules.easyeda.com/3dmodel/{uuid}";
const ENDPOINT_3D_MODEL_STEP: &str = "https://modules.easyeda.com/qAxj6KHrDKw4blvCG8QJPs7Y/{uuid}";
const USER_AGENT: &str = "easyeda_kipm/0.1.0";

#[derive(Deserialize, Debug)]
pub struct ApiResponse {
    pub success: bool,
    pub result: Option<Value>,
    pub code: Option<i32>,
    pub message: Option<String>,
}

/// Where CAD snapshots, meshes and STEP solids come from.
///
/// `Ok(None)` means the source answered but had nothing for the id.
#[allow(async_fn_in_trait)]
pub trait CadSource {
    async fn fetch_cad_data(&self, lcsc_id: &str) -> Result<Option<Value>>;
    async fn fetch_raw_mesh(&self, uuid: &str) -> Result<Option<String>>;
    async fn fetch_mesh_solid(&self, uuid: &str) -> Result<Option<Bytes>>;
}

pub struct EasyedaApi {
    client: reqwest::Client,
}

impl EasyedaApi {
    pub fn new() -> Result<Self> {
        Ok(EasyedaApi {
            client: reqwest::Client::builder().user_agent(USER_AGENT).build()?,
        })
    }

    async fn get_success(&self, url: &str) -> Result<Option<reqwest::Response>> {
        let res = self.client.get(url).send().await?;
        if res.status().is_success() {
            Ok(Some(res))
        } else {
            log::warn!("GET {} returned {}", url, res.status());
            Ok(None)
        }
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl CadSource for EasyedaApi {
    async fn fetch_cad_data(&self, lcsc_id: &str) -> Result<Option<Value>> {
        let url = API_ENDPOINT.replace("{lcsc_id}", lcsc_id);
        let Some(res) = self.get_success(&url).await? else {
            return Ok(None);
        };
        let res = res.json::<ApiResponse>().await?;

        if !res.success {
            log::warn!(
                "EasyEDA API error for {} (code {:?}): {}",
                lcsc_id,
                res.code,
                res.message.as_deref().unwrap_or("Unknown API error")
            );
            return Ok(None);
        }
        Ok(res.result.filter(|result| !is_empty_payload(result)))
    }

    async fn fetch_raw_mesh(&self, uuid: &str) -> Result<Option<String>> {
        let url = ENDPOINT_3D_MODEL.replace("{uuid}", uuid);
        match self.get_success(&url).await? {
            Some(res) => Ok(Some(res.text().await?).filter(|text| !text.is_empty())),
            None => Ok(None),
        }
    }

    async fn fetch_mesh_solid(&self, uuid: &str) -> Result<Option<Bytes>> {
        let url = ENDPOINT_3D_MODEL_STEP.replace("{uuid}", uuid);
        match self.get_success(&url).await? {
            Some(res) => Ok(Some(res.bytes().await?).filter(|bytes| !bytes.is_empty())),
            None => Ok(None),
        }
    }
}
