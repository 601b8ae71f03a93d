//! The read-only configuration store. Loaded once at startup from a JSON
//! file; every lookup failure is fatal before the listener starts, so a
//! running server's loads are deterministic.
//!
//! Big integers are decimal strings (bare integers accepted), e.g.:
//!
//! ```json
//! {
//!   "dlog": { "pseudonymsys": { "p": "23", "g": "2", "q": "11" } },
//!   "pseudonymsys": {
//!     "ca": { "pubkey": { "x": "...", "y": "..." } },
//!     "orgs": {
//!       "org1": {
//!         "secrets": { "dlog": { "s1": "...", "s2": "..." } },
//!         "pubkeys": { "h1": "...", "h2": "..." }
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use num::BigUint;
use serde::Deserialize;

use crate::crypto::casig::CaPublicKey;
use crate::crypto::group::Group;
use crate::error::ConfigError;
use crate::org::OrgPublicKeys;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    dlog: HashMap<String, DlogEntry>,
    pseudonymsys: PseudonymsysSection,
}

#[derive(Debug, Deserialize)]
struct DlogEntry {
    #[serde(with = "crate::serialize::big_uint")]
    p: BigUint,
    #[serde(with = "crate::serialize::big_uint")]
    g: BigUint,
    #[serde(with = "crate::serialize::big_uint")]
    q: BigUint,
}

#[derive(Debug, Deserialize)]
struct PseudonymsysSection {
    ca: CaSection,
    #[serde(default)]
    orgs: HashMap<String, OrgEntry>,
}

#[derive(Debug, Deserialize)]
struct CaSection {
    pubkey: PointEntry,
}

#[derive(Debug, Deserialize)]
struct PointEntry {
    #[serde(with = "crate::serialize::big_uint")]
    x: BigUint,
    #[serde(with = "crate::serialize::big_uint")]
    y: BigUint,
}

#[derive(Debug, Deserialize)]
struct OrgEntry {
    #[serde(default)]
    secrets: HashMap<String, SecretPair>,
    pubkeys: Option<PubkeyPair>,
}

#[derive(Debug, Deserialize)]
struct SecretPair {
    #[serde(with = "crate::serialize::big_uint")]
    s1: BigUint,
    #[serde(with = "crate::serialize::big_uint")]
    s2: BigUint,
}

#[derive(Debug, Deserialize)]
struct PubkeyPair {
    #[serde(with = "crate::serialize::big_uint")]
    h1: BigUint,
    #[serde(with = "crate::serialize::big_uint")]
    h2: BigUint,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn parse(json: &str) -> Result<Config, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The named discrete-log group, validated.
    pub fn dlog(&self, name: &str) -> Result<Group, ConfigError> {
        let entry = self
            .dlog
            .get(name)
            .ok_or_else(|| ConfigError::Missing(format!("dlog.{}", name)))?;
        Ok(Group::new(entry.p.clone(), entry.g.clone(), entry.q.clone())?)
    }

    /// The CA's verifying key, validated to lie on the curve.
    pub fn ca_pubkey(&self) -> Result<CaPublicKey, ConfigError> {
        let point = &self.pseudonymsys.ca.pubkey;
        Ok(CaPublicKey::from_coordinates(&point.x, &point.y)?)
    }

    /// The named organization's secret pair for the given scheme.
    pub fn org_secrets(&self, org: &str, scheme: &str) -> Result<(BigUint, BigUint), ConfigError> {
        let entry = self
            .pseudonymsys
            .orgs
            .get(org)
            .ok_or_else(|| ConfigError::Missing(format!("pseudonymsys.orgs.{}", org)))?;
        let pair = entry.secrets.get(scheme).ok_or_else(|| {
            ConfigError::Missing(format!("pseudonymsys.orgs.{}.secrets.{}", org, scheme))
        })?;
        Ok((pair.s1.clone(), pair.s2.clone()))
    }

    /// The named organization's public pair.
    pub fn org_pubkeys(&self, org: &str) -> Result<OrgPublicKeys, ConfigError> {
        let entry = self
            .pseudonymsys
            .orgs
            .get(org)
            .ok_or_else(|| ConfigError::Missing(format!("pseudonymsys.orgs.{}", org)))?;
        let pair = entry.pubkeys.as_ref().ok_or_else(|| {
            ConfigError::Missing(format!("pseudonymsys.orgs.{}.pubkeys", org))
        })?;
        Ok(OrgPublicKeys {
            h1: pair.h1.clone(),
            h2: pair.h2.clone(),
        })
    }

    /// Names of all organizations that publish a public pair.
    pub fn org_names(&self) -> impl Iterator<Item = &str> {
        self.pseudonymsys
            .orgs
            .iter()
            .filter(|(_, entry)| entry.pubkeys.is_some())
            .map(|(name, _)| name.as_str())
    }
}
