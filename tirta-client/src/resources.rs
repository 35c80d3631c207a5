use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use tirta_core::{Customer, Meter, Payment, Property, Tariff};

use crate::{
    ClientError, HttpValveApi,
    api::{Page, Paginated, Pagination},
};

/// Binds a CRUD row type to its collection path and the key the backend
/// nests list rows under.
pub trait Resource: DeserializeOwned + Send + Sync {
    const PATH: &'static str;
    const KEY: &'static str;
}

macro_rules! resource {
    ($($ty:ty => $path:literal, $key:literal;)+) => {$(
        impl Resource for $ty {
            const PATH: &'static str = $path;
            const KEY: &'static str = $key;
        }
    )+};
}

resource! {
    Customer => "/customers", "customers";
    Property => "/properties", "properties";
    Meter => "/meters", "meters";
    Payment => "/payments", "payments";
    Tariff => "/tariffs", "tariffs";
}

/// Typed handle on one CRUD collection. The create/update bodies stay
/// caller-shaped (a struct or a `serde_json::json!` literal) because the
/// backend accepts partial updates.
pub struct ResourceClient<'a, T> {
    api: &'a HttpValveApi,
    _marker: PhantomData<fn() -> T>,
}

impl HttpValveApi {
    pub fn resource<T: Resource>(&self) -> ResourceClient<'_, T> {
        ResourceClient {
            api: self,
            _marker: PhantomData,
        }
    }

    pub fn customers(&self) -> ResourceClient<'_, Customer> {
        self.resource()
    }

    pub fn properties(&self) -> ResourceClient<'_, Property> {
        self.resource()
    }

    pub fn meters(&self) -> ResourceClient<'_, Meter> {
        self.resource()
    }

    pub fn payments(&self) -> ResourceClient<'_, Payment> {
        self.resource()
    }

    pub fn tariffs(&self) -> ResourceClient<'_, Tariff> {
        self.resource()
    }
}

impl<T: Resource> ResourceClient<'_, T> {
    pub async fn list(&self, page: Page) -> Result<Paginated<T>, ClientError> {
        let params = [
            ("limit", page.limit.to_string()),
            ("offset", page.offset.to_string()),
        ];
        let mut value: serde_json::Value = self.api.get_json(T::PATH, &params).await?;
        let rows = value
            .get_mut(T::KEY)
            .map(serde_json::Value::take)
            .ok_or_else(|| {
                ClientError::Decode(format!("list payload missing `{}`", T::KEY).into())
            })?;
        let pagination = value
            .get_mut("pagination")
            .map(serde_json::Value::take)
            .ok_or_else(|| ClientError::Decode("list payload missing `pagination`".into()))?;
        Ok(Paginated {
            items: serde_json::from_value(rows)?,
            pagination: serde_json::from_value::<Pagination>(pagination)?,
        })
    }

    pub async fn get(&self, id: &str) -> Result<T, ClientError> {
        self.api.get_json(&format!("{}/{id}", T::PATH), &[]).await
    }

    pub async fn create(&self, body: &impl Serialize) -> Result<T, ClientError> {
        self.api.post_json(T::PATH, body).await
    }

    pub async fn update(&self, id: &str, body: &impl Serialize) -> Result<T, ClientError> {
        self.api.put_json(&format!("{}/{id}", T::PATH), body).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.api.delete_unit(&format!("{}/{id}", T::PATH)).await
    }
}
