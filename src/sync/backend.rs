//! Transport between the builder and the room service.

use serde::de::DeserializeOwned;

use crate::api::{ApiResponse, RoomApi, STATUS_NOT_FOUND};
use crate::payload::{DeleteResponse, LoadResponse, SavePayload, SaveResponse};

use super::SyncError;

/// Something that can store and fetch whole rooms.
pub trait RoomBackend {
    fn save_room(&mut self, payload: &SavePayload) -> Result<SaveResponse, SyncError>;

    fn load_room(&mut self, room_id: &str) -> Result<LoadResponse, SyncError>;

    fn delete_room(&mut self, room_id: &str) -> Result<(), SyncError>;
}

/// Talks to an in-process [`RoomApi`] through the same JSON requests a
/// remote client would send.
#[derive(Debug)]
pub struct LocalBackend {
    api: RoomApi,
}

impl LocalBackend {
    pub fn new(api: RoomApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &RoomApi {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut RoomApi {
        &mut self.api
    }

    fn request<T: DeserializeOwned>(
        &mut self,
        method: &str,
        path: &str,
        body: &str,
        room_id: Option<&str>,
    ) -> Result<T, SyncError> {
        let response = self.api.handle_raw(method, path, body);
        decode(response, room_id)
    }
}

fn decode<T: DeserializeOwned>(response: ApiResponse, room_id: Option<&str>) -> Result<T, SyncError> {
    if response.is_success() {
        return serde_json::from_value(response.body).map_err(|e| SyncError::Decode(e.to_string()));
    }
    if let (STATUS_NOT_FOUND, Some(id)) = (response.status, room_id) {
        return Err(SyncError::NotFound(id.to_string()));
    }
    let message = match response.error_body() {
        Some(body) => match body.details {
            Some(details) => format!("{}: {}", body.error, details),
            None => body.error,
        },
        None => response.body.to_string(),
    };
    Err(SyncError::Transport {
        status: response.status,
        message,
    })
}

impl RoomBackend for LocalBackend {
    fn save_room(&mut self, payload: &SavePayload) -> Result<SaveResponse, SyncError> {
        let body = serde_json::to_string(payload).map_err(|e| SyncError::Transport {
            status: 0,
            message: e.to_string(),
        })?;
        self.request("POST", "/rooms", &body, None)
    }

    fn load_room(&mut self, room_id: &str) -> Result<LoadResponse, SyncError> {
        self.request("GET", &room_path(room_id), "", Some(room_id))
    }

    fn delete_room(&mut self, room_id: &str) -> Result<(), SyncError> {
        let _: DeleteResponse = self.request("DELETE", &room_path(room_id), "", Some(room_id))?;
        Ok(())
    }
}

fn room_path(room_id: &str) -> String {
    format!("/rooms/{}", room_id)
}
