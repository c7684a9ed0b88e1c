use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institute {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn upsert_institute(&self, institute: &Institute) -> Result<(), StoreError> {
        let key = keys::institute_key(&institute.id)?;
        self.institutes
            .insert(key.as_bytes(), Self::serialize(institute)?)?;
        Ok(())
    }

    pub fn get_institute(&self, institute_id: &str) -> Result<Option<Institute>, StoreError> {
        let key = keys::institute_key(institute_id)?;
        match self.institutes.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }
}
