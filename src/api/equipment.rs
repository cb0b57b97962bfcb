//! Equipment endpoints on HttpApi

use super::{DataEnvelope, HttpApi};
use crate::{
    error::AppResult,
    models::{Equipment, EquipmentDraft, EquipmentType},
};

impl HttpApi {
    /// GET /equipos
    pub async fn equipment_list(&self, token: &str) -> AppResult<Vec<Equipment>> {
        tracing::debug!("GET /equipos");
        let request = self.authorized(self.client.get(self.url("/equipos")), token);
        let response = Self::send(request).await?;
        let envelope: DataEnvelope<Equipment> = Self::read_json(response).await?;
        Ok(envelope.data)
    }

    /// GET /equipos/tipos
    pub async fn equipment_types(&self, token: &str) -> AppResult<Vec<EquipmentType>> {
        tracing::debug!("GET /equipos/tipos");
        let request = self.authorized(self.client.get(self.url("/equipos/tipos")), token);
        let response = Self::send(request).await?;
        let envelope: DataEnvelope<EquipmentType> = Self::read_json(response).await?;
        Ok(envelope.data)
    }

    /// POST /equipos
    pub async fn equipment_create(&self, token: &str, draft: &EquipmentDraft) -> AppResult<Option<String>> {
        tracing::debug!("POST /equipos ({})", draft.inventory_code);
        let request = self
            .authorized(self.client.post(self.url("/equipos")), token)
            .json(draft);
        let response = Self::send(request).await?;
        Self::read_message(response).await
    }

    /// PUT /equipos/{id}
    pub async fn equipment_update(
        &self,
        token: &str,
        id: i64,
        draft: &EquipmentDraft,
    ) -> AppResult<Option<String>> {
        tracing::debug!("PUT /equipos/{}", id);
        let request = self
            .authorized(self.client.put(self.url(&format!("/equipos/{}", id))), token)
            .json(draft);
        let response = Self::send(request).await?;
        Self::read_message(response).await
    }

    /// DELETE /equipos/{id}
    pub async fn equipment_delete(&self, token: &str, id: i64) -> AppResult<Option<String>> {
        tracing::debug!("DELETE /equipos/{}", id);
        let request = self.authorized(self.client.delete(self.url(&format!("/equipos/{}", id))), token);
        let response = Self::send(request).await?;
        Self::read_message(response).await
    }
}
