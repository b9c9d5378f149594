//! In-memory dynamic client for testing
//!
//! Stores objects by address and imitates the parts of the API server the
//! handlers depend on: server-populated metadata, field manager ownership
//! for server-side apply, and deletions or status changes that only become
//! visible after a number of reads.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use kube::core::ErrorResponse;
use serde_json::{Map, Value, json};

use crate::client::{ApplyParams, DeletionPropagation, DynamicClient, ObjectRef};
use crate::error::{ProviderError, Result};

/// In-memory [`DynamicClient`]
#[derive(Clone, Default)]
pub struct MockDynamicClient {
    state: Arc<RwLock<MockState>>,
}

#[derive(Default)]
struct MockState {
    objects: HashMap<String, StoredObject>,
    scheduled: Vec<ScheduledChange>,
    get_errors: VecDeque<(u16, String)>,
    deletion_delay: usize,
    last_deletion: Option<DeletionPropagation>,
    counts: OperationCounts,
    revision: u64,
}

struct StoredObject {
    object: Value,
    field_manager: String,
}

struct ScheduledChange {
    key: String,
    /// Reads that still see the old object
    remaining: usize,
    change: Change,
}

enum Change {
    Remove,
    Merge(Value),
}

/// Counts of operations performed, for test assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub applies: usize,
    pub deletes: usize,
}

fn key(target: &ObjectRef) -> String {
    format!(
        "{}/{}/{}/{}",
        target.api_version(),
        target.plural,
        target.namespace.as_deref().unwrap_or(""),
        target.name
    )
}

/// Recursive JSON merge; `null` in the patch removes a key
fn merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (k, v) in patch {
                if v.is_null() {
                    base.remove(k);
                } else {
                    merge(base.entry(k.clone()).or_insert(Value::Null), v);
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

impl MockDynamicClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object as if another tool (`kubectl`) had created it
    pub fn insert(&self, target: &ObjectRef, object: Value) {
        let mut state = self.state.write().unwrap();
        let stored = state.stamp(target, object, None);
        state.objects.insert(
            key(target),
            StoredObject {
                object: stored,
                field_manager: "kubectl".to_string(),
            },
        );
    }

    /// Current stored object, without counting as a read
    pub fn object(&self, target: &ObjectRef) -> Option<Value> {
        let state = self.state.read().unwrap();
        state.objects.get(&key(target)).map(|s| s.object.clone())
    }

    /// Field manager that last applied the object
    pub fn field_manager(&self, target: &ObjectRef) -> Option<String> {
        let state = self.state.read().unwrap();
        state
            .objects
            .get(&key(target))
            .map(|s| s.field_manager.clone())
    }

    /// Remove the object once `reads` more GETs have seen it
    pub fn remove_after_gets(&self, target: &ObjectRef, reads: usize) {
        self.schedule(target, reads, Change::Remove);
    }

    /// Merge `patch` into the object once `reads` more GETs have seen it
    pub fn merge_after_gets(&self, target: &ObjectRef, reads: usize, patch: Value) {
        self.schedule(target, reads, Change::Merge(patch));
    }

    /// Deleted objects stay visible for `reads` GETs, like objects with finalizers
    pub fn set_deletion_delay(&self, reads: usize) {
        self.state.write().unwrap().deletion_delay = reads;
    }

    /// Fail the next GET with an API status error
    pub fn fail_next_get(&self, code: u16, message: &str) {
        self.state
            .write()
            .unwrap()
            .get_errors
            .push_back((code, message.to_string()));
    }

    /// Propagation policy of the most recent delete
    pub fn last_deletion(&self) -> Option<DeletionPropagation> {
        self.state.read().unwrap().last_deletion
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.state.read().unwrap().counts.clone()
    }

    fn schedule(&self, target: &ObjectRef, reads: usize, change: Change) {
        self.state.write().unwrap().scheduled.push(ScheduledChange {
            key: key(target),
            remaining: reads,
            change,
        });
    }
}

impl MockState {
    /// Fill in what the API server would: identity, namespace, uid, resourceVersion
    fn stamp(&mut self, target: &ObjectRef, mut object: Value, previous: Option<&Value>) -> Value {
        self.revision += 1;

        if !object.is_object() {
            object = json!({});
        }
        object["apiVersion"] = json!(target.api_version());
        object["kind"] = json!(target.kind);

        if !object["metadata"].is_object() {
            object["metadata"] = Value::Object(Map::new());
        }
        let metadata = &mut object["metadata"];
        metadata["name"] = json!(target.name);
        if let Some(ns) = &target.namespace {
            metadata["namespace"] = json!(ns);
        }

        let previous_meta = previous.map(|p| &p["metadata"]);
        let uid = previous_meta
            .and_then(|m| m["uid"].as_str().map(str::to_string))
            .unwrap_or_else(|| format!("00000000-0000-0000-0000-{:012}", self.revision));
        let generation = previous_meta
            .and_then(|m| m["generation"].as_i64())
            .map_or(1, |g| g + 1);
        metadata["uid"] = json!(uid);
        metadata["generation"] = json!(generation);
        metadata["resourceVersion"] = json!(self.revision.to_string());

        if let Some(status) = previous.map(|p| &p["status"]).filter(|s| !s.is_null()) {
            object["status"] = status.clone();
        }
        object
    }

    fn not_found(target: &ObjectRef) -> ProviderError {
        ProviderError::NotFound {
            target: target.to_string(),
        }
    }

    /// Apply scheduled changes that are due for `key`, then count this read
    fn observe(&mut self, key: &str) {
        let mut due = Vec::new();
        self.scheduled.retain_mut(|s| {
            if s.key != key {
                return true;
            }
            if s.remaining == 0 {
                due.push(std::mem::replace(&mut s.change, Change::Remove));
                return false;
            }
            true
        });

        for change in due {
            match change {
                Change::Remove => {
                    self.objects.remove(key);
                }
                Change::Merge(patch) => {
                    if let Some(stored) = self.objects.get_mut(key) {
                        merge(&mut stored.object, &patch);
                    }
                }
            }
        }

        for s in self.scheduled.iter_mut().filter(|s| s.key == key) {
            s.remaining = s.remaining.saturating_sub(1);
        }
    }
}

#[async_trait]
impl DynamicClient for MockDynamicClient {
    async fn get(&self, target: &ObjectRef) -> Result<Value> {
        let mut state = self.state.write().unwrap();
        state.counts.gets += 1;

        if let Some((code, message)) = state.get_errors.pop_front() {
            return Err(ProviderError::Api(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message,
                reason: String::new(),
                code,
            })));
        }

        let key = key(target);
        state.observe(&key);
        state
            .objects
            .get(&key)
            .map(|s| s.object.clone())
            .ok_or_else(|| MockState::not_found(target))
    }

    async fn apply(
        &self,
        target: &ObjectRef,
        object: &Value,
        params: &ApplyParams,
    ) -> Result<Value> {
        let mut state = self.state.write().unwrap();
        state.counts.applies += 1;

        let key = key(target);
        let previous = state.objects.get(&key).map(|s| s.object.clone());
        if let Some(existing) = state.objects.get(&key)
            && existing.field_manager != params.field_manager
            && !params.force
        {
            return Err(ProviderError::Conflict {
                target: target.to_string(),
                message: format!(
                    "Apply failed with 1 conflict: conflict with \"{}\"",
                    existing.field_manager
                ),
            });
        }

        let stored = state.stamp(target, object.clone(), previous.as_ref());
        state.objects.insert(
            key,
            StoredObject {
                object: stored.clone(),
                field_manager: params.field_manager.clone(),
            },
        );
        Ok(stored)
    }

    async fn delete(&self, target: &ObjectRef, propagation: DeletionPropagation) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.counts.deletes += 1;
        state.last_deletion = Some(propagation);

        let key = key(target);
        if !state.objects.contains_key(&key) {
            return Err(MockState::not_found(target));
        }

        if state.deletion_delay == 0 {
            state.objects.remove(&key);
        } else {
            let remaining = state.deletion_delay;
            if let Some(stored) = state.objects.get_mut(&key) {
                stored.object["metadata"]["deletionTimestamp"] = json!("2024-01-01T00:00:00Z");
            }
            state.scheduled.push(ScheduledChange {
                key,
                remaining,
                change: Change::Remove,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ObjectRef {
        ObjectRef {
            group: "cert-manager.io".to_string(),
            version: "v1".to_string(),
            kind: "Certificate".to_string(),
            plural: "certificates".to_string(),
            namespace: Some("default".to_string()),
            name: "web".to_string(),
        }
    }

    fn params(manager: &str, force: bool) -> ApplyParams {
        ApplyParams {
            field_manager: manager.to_string(),
            force,
        }
    }

    #[tokio::test]
    async fn test_apply_populates_server_fields() {
        let client = MockDynamicClient::new();
        let applied = client
            .apply(&target(), &json!({"spec": {"secretName": "tls"}}), &params("crdform", false))
            .await
            .unwrap();

        assert_eq!(applied["apiVersion"], "cert-manager.io/v1");
        assert_eq!(applied["metadata"]["namespace"], "default");
        assert_eq!(applied["metadata"]["generation"], 1);
        assert!(applied["metadata"]["uid"].is_string());

        let again = client
            .apply(&target(), &json!({"spec": {"secretName": "tls2"}}), &params("crdform", false))
            .await
            .unwrap();
        assert_eq!(again["metadata"]["uid"], applied["metadata"]["uid"]);
        assert_eq!(again["metadata"]["generation"], 2);
    }

    #[tokio::test]
    async fn test_foreign_manager_conflicts_unless_forced() {
        let client = MockDynamicClient::new();
        client.insert(&target(), json!({"spec": {}}));

        let err = client
            .apply(&target(), &json!({"spec": {}}), &params("crdform", false))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        client
            .apply(&target(), &json!({"spec": {}}), &params("crdform", true))
            .await
            .unwrap();
        assert_eq!(client.field_manager(&target()).as_deref(), Some("crdform"));
    }

    #[tokio::test]
    async fn test_remove_after_gets() {
        let client = MockDynamicClient::new();
        client.insert(&target(), json!({}));
        client.remove_after_gets(&target(), 2);

        assert!(client.get(&target()).await.is_ok());
        assert!(client.get(&target()).await.is_ok());
        assert!(client.get(&target()).await.unwrap_err().is_not_found());
        assert_eq!(client.operation_counts().gets, 3);
    }

    #[tokio::test]
    async fn test_merge_after_gets_keeps_status_on_apply() {
        let client = MockDynamicClient::new();
        client.insert(&target(), json!({}));
        client.merge_after_gets(&target(), 0, json!({"status": {"ready": "True"}}));

        let got = client.get(&target()).await.unwrap();
        assert_eq!(got["status"]["ready"], "True");

        let applied = client
            .apply(&target(), &json!({"spec": {}}), &params("kubectl", false))
            .await
            .unwrap();
        assert_eq!(applied["status"]["ready"], "True");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let client = MockDynamicClient::new();
        let err = client
            .delete(&target(), DeletionPropagation::Background)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(client.last_deletion(), Some(DeletionPropagation::Background));
    }

    #[tokio::test]
    async fn test_injected_get_error() {
        let client = MockDynamicClient::new();
        client.insert(&target(), json!({}));
        client.fail_next_get(403, "forbidden");

        let err = client.get(&target()).await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(client.get(&target()).await.is_ok());
    }
}
