//! In-memory settings service for view tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::api::types::{CreateSettingsRequest, Setting};
use crate::api::SettingsApi;
use crate::codec::ValueType;
use crate::error::AppError;

pub(crate) struct FakeSettings {
    settings: Mutex<Vec<Setting>>,
    calls: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
    clock: Mutex<DateTime<Utc>>,
}

impl FakeSettings {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            clock: Mutex::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    /// Seed `count` string settings named `key-000`.. with increasing `updated_at`.
    pub(crate) fn with_generated(count: usize) -> Self {
        let fake = Self::new();
        for i in 0..count {
            fake.insert(&format!("key-{i:03}"), ValueType::Str, &format!("value {i}"));
        }
        fake
    }

    pub(crate) fn insert(&self, key: &str, value_type: ValueType, value: &str) {
        let at = self.tick();
        self.settings.lock().unwrap().push(Setting {
            key: key.to_string(),
            value_type,
            value: value.to_string(),
            updated_at: Some(at),
            created_at: Some(at),
        });
    }

    /// Every later call fails with `Remote(message)` until cleared.
    pub(crate) fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn value_of(&self, key: &str) -> Option<String> {
        self.settings
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.value.clone())
    }

    fn tick(&self) -> DateTime<Utc> {
        let mut clock = self.clock.lock().unwrap();
        *clock += Duration::minutes(1);
        *clock
    }

    fn record(&self, call: String) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(AppError::Remote(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SettingsApi for FakeSettings {
    async fn list(&self) -> Result<Vec<Setting>, AppError> {
        self.record("list".into())?;
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn get_by_key(&self, key: &str) -> Result<Setting, AppError> {
        self.record(format!("get:{key}"))?;
        self.settings
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.key == key)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Setting not found".into()))
    }

    async fn create(&self, request: &CreateSettingsRequest) -> Result<(), AppError> {
        self.record(format!("create:{}", request.key))?;
        if self.value_of(&request.key).is_some() {
            return Err(AppError::Remote(format!("Settings with key '{}' already exists", request.key)));
        }
        self.insert(&request.key, request.value_type, &request.value);
        Ok(())
    }

    async fn update(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.record(format!("update:{key}={value}"))?;
        let at = self.tick();
        let mut settings = self.settings.lock().unwrap();
        let setting = settings
            .iter_mut()
            .find(|s| s.key == key)
            .ok_or_else(|| AppError::Remote(format!("Settings with key '{key}' not found")))?;
        setting.value = value.to_string();
        setting.updated_at = Some(at);
        Ok(())
    }

    async fn delete_by_key(&self, key: &str) -> Result<(), AppError> {
        self.record(format!("delete:{key}"))?;
        self.settings.lock().unwrap().retain(|s| s.key != key);
        Ok(())
    }
}
