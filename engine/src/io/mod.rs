use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{api::PhiRequest, errors::Result, runtime::PhiBatch};

/// Read a JSON document from disk; request files go through here too.
pub fn load_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let bytes = fs::read(path)?;
    let value = serde_json::from_slice(&bytes)?;
    Ok(value)
}

pub fn write_json<T, P>(path: P, value: &T) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Many(Vec<PhiRequest>),
    One(Box<PhiRequest>),
}

impl RequestFile {
    fn into_batch(self) -> PhiBatch {
        match self {
            Self::Many(requests) => PhiBatch::from(requests),
            Self::One(request) => PhiBatch::from(vec![*request]),
        }
    }
}

/// Parse either a single request object or an array of requests.
pub fn parse_requests(raw: &str) -> Result<PhiBatch> {
    let file: RequestFile = serde_json::from_str(raw)?;
    Ok(file.into_batch())
}

pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<PhiBatch> {
    load_json::<RequestFile, _>(path).map(RequestFile::into_batch)
}
