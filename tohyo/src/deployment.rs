use crate::*;
use chrono::{DateTime, Utc};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Record of where and how an election was deployed
///
/// Written once per network, to `<network>-deployment.json` in the deployments directory,
/// for clients that need to find and talk to the election.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_address: Address,
    pub deployer: Address,
    pub network: String,
    pub chain_id: u64,

    /// Milliseconds since the unix epoch
    pub deployment_timestamp: i64,

    /// Seconds
    pub voting_duration: u64,
    pub abi: Vec<AbiEntry>,
}

impl DeploymentRecord {
    pub fn new(
        contract_address: Address,
        election: &Election,
        network: &str,
        chain_id: u64,
        deployed_at: DateTime<Utc>,
    ) -> Self {
        DeploymentRecord {
            contract_address,
            deployer: election.owner(),
            network: network.to_owned(),
            chain_id,
            deployment_timestamp: deployed_at.timestamp_millis(),
            voting_duration: election.voting_duration(),
            abi: interface(),
        }
    }

    pub fn file_name(network: &str) -> String {
        format!("{}-deployment.json", network)
    }

    /// Write the record into `dir`, creating the directory if needed.
    ///
    /// Returns the path written.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, Error> {
        let dir = dir.as_ref();
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let path = dir.join(Self::file_name(&self.network));
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(&path, serialized)?;
        info!("deployment details saved to {}", path.display());

        Ok(path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
