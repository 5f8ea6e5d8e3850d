//! In-memory directory standing in for Microsoft Graph in handler tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;
use xavyo_provider::NamedLockRegistry;

use super::claims_mapping_policy::POLICY_LOCK_SCOPE;
use super::APPLICATION_LOCK_SCOPE;
use crate::api::{ApplicationsApi, ClaimsMappingPoliciesApi, ODataQuery};
use crate::models::{Application, ClaimsMappingPolicy, FederatedIdentityCredential};
use crate::{EntraError, EntraResult};

pub(crate) fn graph_error(status: u16) -> EntraError {
    let code = if status == 404 {
        "Request_ResourceNotFound"
    } else {
        "Request_BadRequest"
    };
    EntraError::GraphApi {
        status,
        code: code.to_string(),
        message: format!("simulated {status}"),
        inner_error: None,
    }
}

#[derive(Default)]
struct Directory {
    applications: BTreeMap<String, Application>,
    credentials: BTreeMap<(String, String), FederatedIdentityCredential>,
    policies: BTreeMap<String, ClaimsMappingPolicy>,
}

/// Fake Graph tenant with failure injection and lock auditing.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    directory: Mutex<Directory>,
    failures: Mutex<BTreeMap<&'static str, u16>>,
    nil_calls: Mutex<BTreeSet<&'static str>>,
    mutations: AtomicUsize,
    unlocked_mutations: AtomicUsize,
    locks: Option<Arc<NamedLockRegistry>>,
}

impl FakeDirectory {
    /// Directory that checks every mutation happens under `locks`.
    pub(crate) fn with_locks(locks: Arc<NamedLockRegistry>) -> Self {
        Self {
            locks: Some(locks),
            ..Self::default()
        }
    }

    pub(crate) fn add_application(&self, object_id: &str, uris: &[&str]) {
        let app = Application {
            id: Some(object_id.to_string()),
            display_name: Some("test application".to_string()),
            identifier_uris: Some(uris.iter().map(|u| (*u).to_string()).collect()),
            ..Application::default()
        };
        self.dir().applications.insert(object_id.to_string(), app);
    }

    pub(crate) fn remove_application(&self, object_id: &str) {
        let mut dir = self.dir();
        dir.applications.remove(object_id);
        dir.credentials.retain(|(app, _), _| app != object_id);
    }

    pub(crate) fn identifier_uris(&self, object_id: &str) -> Option<Vec<String>> {
        self.dir()
            .applications
            .get(object_id)
            .map(|app| app.identifier_uris.clone().unwrap_or_default())
    }

    pub(crate) fn credentials_of(&self, object_id: &str) -> Vec<FederatedIdentityCredential> {
        self.dir()
            .credentials
            .iter()
            .filter(|((app, _), _)| app == object_id)
            .map(|(_, credential)| credential.clone())
            .collect()
    }

    pub(crate) fn remove_credential(&self, object_id: &str, key_id: &str) {
        self.dir()
            .credentials
            .remove(&(object_id.to_string(), key_id.to_string()));
    }

    pub(crate) fn policy(&self, policy_id: &str) -> Option<ClaimsMappingPolicy> {
        self.dir().policies.get(policy_id).cloned()
    }

    pub(crate) fn remove_policy(&self, policy_id: &str) {
        self.dir().policies.remove(policy_id);
    }

    /// Make the next call named `call` fail with `status`.
    pub(crate) fn fail_next(&self, call: &'static str, status: u16) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(call, status);
    }

    /// Make every later call named `call` succeed without an object.
    pub(crate) fn return_nil(&self, call: &'static str) {
        self.nil_calls.lock().expect("nil calls lock").insert(call);
    }

    pub(crate) fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub(crate) fn unlocked_mutations(&self) -> usize {
        self.unlocked_mutations.load(Ordering::SeqCst)
    }

    fn dir(&self) -> std::sync::MutexGuard<'_, Directory> {
        self.directory.lock().expect("directory lock")
    }

    fn check(&self, call: &'static str) -> EntraResult<()> {
        match self.failures.lock().expect("failures lock").remove(call) {
            Some(status) => Err(graph_error(status)),
            None => Ok(()),
        }
    }

    fn nil(&self, call: &'static str) -> bool {
        self.nil_calls.lock().expect("nil calls lock").contains(call)
    }

    fn record_mutation(&self, lock: Option<(&str, &str)>) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if let (Some(locks), Some((scope, name))) = (&self.locks, lock) {
            if !locks.is_locked(scope, name) {
                self.unlocked_mutations.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

#[async_trait]
impl ApplicationsApi for FakeDirectory {
    async fn get_application(
        &self,
        object_id: &str,
        _query: &ODataQuery,
    ) -> EntraResult<Option<Application>> {
        self.check("get_application")?;
        if self.nil("get_application") {
            return Ok(None);
        }
        self.dir()
            .applications
            .get(object_id)
            .cloned()
            .map(Some)
            .ok_or_else(|| graph_error(404))
    }

    async fn update_application(&self, patch: &Application) -> EntraResult<()> {
        self.check("update_application")?;
        let object_id = patch.id.clone().unwrap_or_default();
        self.record_mutation(Some((APPLICATION_LOCK_SCOPE, &object_id)));

        let mut dir = self.dir();
        let app = dir
            .applications
            .get_mut(&object_id)
            .ok_or_else(|| graph_error(404))?;
        if let Some(uris) = &patch.identifier_uris {
            app.identifier_uris = Some(uris.clone());
        }
        if let Some(name) = &patch.display_name {
            app.display_name = Some(name.clone());
        }
        Ok(())
    }

    async fn get_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
        _query: &ODataQuery,
    ) -> EntraResult<Option<FederatedIdentityCredential>> {
        self.check("get_federated_identity_credential")?;
        if self.nil("get_federated_identity_credential") {
            return Ok(None);
        }
        self.dir()
            .credentials
            .get(&(object_id.to_string(), key_id.to_string()))
            .cloned()
            .map(Some)
            .ok_or_else(|| graph_error(404))
    }

    async fn create_federated_identity_credential(
        &self,
        object_id: &str,
        credential: &FederatedIdentityCredential,
    ) -> EntraResult<Option<FederatedIdentityCredential>> {
        self.check("create_federated_identity_credential")?;
        self.record_mutation(Some((APPLICATION_LOCK_SCOPE, object_id)));
        if self.nil("create_federated_identity_credential") {
            return Ok(None);
        }

        let mut dir = self.dir();
        if !dir.applications.contains_key(object_id) {
            return Err(graph_error(404));
        }
        let key_id = Uuid::new_v4().to_string();
        let created = FederatedIdentityCredential {
            id: Some(key_id.clone()),
            ..credential.clone()
        };
        dir.credentials
            .insert((object_id.to_string(), key_id), created.clone());
        Ok(Some(created))
    }

    async fn update_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
        patch: &FederatedIdentityCredential,
    ) -> EntraResult<()> {
        self.check("update_federated_identity_credential")?;
        self.record_mutation(Some((APPLICATION_LOCK_SCOPE, object_id)));

        let mut dir = self.dir();
        let credential = dir
            .credentials
            .get_mut(&(object_id.to_string(), key_id.to_string()))
            .ok_or_else(|| graph_error(404))?;
        if patch.audiences.is_some() {
            credential.audiences.clone_from(&patch.audiences);
        }
        if patch.description.is_some() {
            credential.description.clone_from(&patch.description);
        }
        if patch.issuer.is_some() {
            credential.issuer.clone_from(&patch.issuer);
        }
        if patch.subject.is_some() {
            credential.subject.clone_from(&patch.subject);
        }
        Ok(())
    }

    async fn delete_federated_identity_credential(
        &self,
        object_id: &str,
        key_id: &str,
    ) -> EntraResult<()> {
        self.check("delete_federated_identity_credential")?;
        self.record_mutation(Some((APPLICATION_LOCK_SCOPE, object_id)));
        self.dir()
            .credentials
            .remove(&(object_id.to_string(), key_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| graph_error(404))
    }
}

#[async_trait]
impl ClaimsMappingPoliciesApi for FakeDirectory {
    async fn get_claims_mapping_policy(
        &self,
        policy_id: &str,
        _query: &ODataQuery,
    ) -> EntraResult<Option<ClaimsMappingPolicy>> {
        self.check("get_claims_mapping_policy")?;
        if self.nil("get_claims_mapping_policy") {
            return Ok(None);
        }
        self.dir()
            .policies
            .get(policy_id)
            .cloned()
            .map(Some)
            .ok_or_else(|| graph_error(404))
    }

    async fn create_claims_mapping_policy(
        &self,
        policy: &ClaimsMappingPolicy,
    ) -> EntraResult<Option<ClaimsMappingPolicy>> {
        self.check("create_claims_mapping_policy")?;
        self.record_mutation(None);
        if self.nil("create_claims_mapping_policy") {
            return Ok(None);
        }

        let policy_id = Uuid::new_v4().to_string();
        let created = ClaimsMappingPolicy {
            id: Some(policy_id.clone()),
            ..policy.clone()
        };
        self.dir().policies.insert(policy_id, created.clone());
        Ok(Some(created))
    }

    async fn update_claims_mapping_policy(
        &self,
        policy_id: &str,
        patch: &ClaimsMappingPolicy,
    ) -> EntraResult<()> {
        self.check("update_claims_mapping_policy")?;
        self.record_mutation(Some((POLICY_LOCK_SCOPE, policy_id)));

        let mut dir = self.dir();
        let policy = dir
            .policies
            .get_mut(policy_id)
            .ok_or_else(|| graph_error(404))?;
        if patch.display_name.is_some() {
            policy.display_name.clone_from(&patch.display_name);
        }
        if patch.definition.is_some() {
            policy.definition.clone_from(&patch.definition);
        }
        Ok(())
    }

    async fn delete_claims_mapping_policy(&self, policy_id: &str) -> EntraResult<()> {
        self.check("delete_claims_mapping_policy")?;
        self.record_mutation(Some((POLICY_LOCK_SCOPE, policy_id)));
        self.dir()
            .policies
            .remove(policy_id)
            .map(|_| ())
            .ok_or_else(|| graph_error(404))
    }
}
