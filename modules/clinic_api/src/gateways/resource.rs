use std::fmt::Display;
use std::marker::PhantomData;

use rest_client::{ApiClient, ApiError};
use serde::{de::DeserializeOwned, Serialize};

/// Uniform CRUD over one REST collection (`/{name}`, `/{name}/{id}`).
///
/// `Req` is what gets sent on create/update, `Resp` what comes back.
pub struct RestResource<Req, Resp> {
    client: ApiClient,
    name: &'static str,
    _types: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> Clone for RestResource<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            name: self.name,
            _types: PhantomData,
        }
    }
}

impl<Req, Resp> RestResource<Req, Resp>
where
    Req: Serialize + Sync,
    Resp: DeserializeOwned,
{
    pub fn new(client: ApiClient, name: &'static str) -> Self {
        Self {
            client,
            name,
            _types: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Collection path with extra segments appended.
    pub fn path(&self, segments: &[&dyn Display]) -> String {
        let mut path = format!("/{}", self.name);
        for s in segments {
            path.push('/');
            path.push_str(&s.to_string());
        }
        path
    }

    pub async fn create(&self, req: &Req) -> Result<Resp, ApiError> {
        let path = self.path(&[]);
        self.client.post(&path, req).await
    }

    pub async fn get_all(&self) -> Result<Vec<Resp>, ApiError> {
        let path = self.path(&[]);
        self.client.get(&path).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Resp, ApiError> {
        let path = self.path(&[&id]);
        self.client.get(&path).await
    }

    pub async fn update(&self, id: i64, req: &Req) -> Result<Resp, ApiError> {
        let path = self.path(&[&id]);
        self.client.put(&path, req).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let path = self.path(&[&id]);
        self.client.delete(&path).await
    }

    /// `GET /{name}/{filter}/{value}`, e.g. `/bills/status/PAID`.
    pub async fn list_by(
        &self,
        filter: &str,
        value: impl Display + Send,
    ) -> Result<Vec<Resp>, ApiError> {
        let path = self.path(&[&filter, &value]);
        self.client.get(&path).await
    }
}
