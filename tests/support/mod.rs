//! Shared fakes for the integration tests: a scripted CA, a recording gateway
//! connector and a helper that serves the router on an ephemeral port.
#![allow(dead_code)]

use async_trait::async_trait;
use battery_passport_gateway::infra::fabric::ca::{
    CaError, CertificateAuthority, Enrollment, RegistrationRequest,
};
use battery_passport_gateway::infra::fabric::gateway::{Contract, GatewayConnection, GatewayConnector};
use battery_passport_gateway::infra::fabric::profile::{ConnectionProfile, ConnectionProfiles};
use battery_passport_gateway::{
    AppContext, GatewayError, Identity, IdentityStore, MemoryWallet, OrgId, Role, Settings,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn org(name: &str) -> OrgId {
    name.parse().unwrap()
}

/// CA double that counts every call.
#[derive(Default)]
pub struct FakeCa {
    pub enrolls: AtomicUsize,
    pub registers: AtomicUsize,
    pub revokes: AtomicUsize,
    /// Reject every enrollment (bad bootstrap secret).
    pub reject_enroll: AtomicBool,
    /// Answer the first registration with "already registered".
    pub already_registered: AtomicBool,
}

impl FakeCa {
    pub fn calls(&self) -> usize {
        self.enrolls.load(Ordering::SeqCst)
            + self.registers.load(Ordering::SeqCst)
            + self.revokes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateAuthority for FakeCa {
    async fn enroll(&self, enrollment_id: &str, secret: &str) -> Result<Enrollment, CaError> {
        self.enrolls.fetch_add(1, Ordering::SeqCst);
        if self.reject_enroll.load(Ordering::SeqCst) {
            return Err(CaError::Rejected("[20] Authentication failure".into()));
        }
        Ok(Enrollment {
            certificate: format!("CERT {} {}", enrollment_id, secret),
            private_key: format!("KEY {}", enrollment_id),
        })
    }

    async fn register(
        &self,
        request: &RegistrationRequest,
        _registrar: &Identity,
    ) -> Result<String, CaError> {
        self.registers.fetch_add(1, Ordering::SeqCst);
        if self.already_registered.swap(false, Ordering::SeqCst) {
            return Err(CaError::AlreadyRegistered(request.enrollment_id.clone()));
        }
        Ok(format!("secret-{}", request.enrollment_id))
    }

    async fn revoke(&self, _enrollment_id: &str, _registrar: &Identity) -> Result<(), CaError> {
        self.revokes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub org: String,
    pub submit: bool,
    pub function: String,
    pub args: Vec<String>,
}

/// Gateway double recording connects, closes and contract calls.
#[derive(Default)]
pub struct RecordingConnector {
    pub connects: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    pub calls: Arc<Mutex<Vec<Call>>>,
    /// Contract results by function name; unlisted functions return `{}`.
    pub results: Mutex<HashMap<String, Vec<u8>>>,
    /// Fail every contract call with this message.
    pub failure: Mutex<Option<String>>,
}

impl RecordingConnector {
    pub fn respond_with(&self, function: &str, result: &str) {
        self.results
            .lock()
            .unwrap()
            .insert(function.to_string(), result.as_bytes().to_vec());
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayConnector for RecordingConnector {
    async fn connect(
        &self,
        org: &OrgId,
        _profile: &ConnectionProfile,
        _identity: &Identity,
    ) -> Result<Box<dyn GatewayConnection>, GatewayError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingConnection {
            contract: Arc::new(RecordingContract {
                org: org.to_string(),
                calls: self.calls.clone(),
                results: self.results.lock().unwrap().clone(),
                failure: self.failure.lock().unwrap().clone(),
            }),
            closes: self.closes.clone(),
        }))
    }
}

struct RecordingConnection {
    contract: Arc<RecordingContract>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl GatewayConnection for RecordingConnection {
    fn contract(&self, _channel: &str, _name: &str) -> Arc<dyn Contract> {
        self.contract.clone()
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct RecordingContract {
    org: String,
    calls: Arc<Mutex<Vec<Call>>>,
    results: HashMap<String, Vec<u8>>,
    failure: Option<String>,
}

impl RecordingContract {
    fn record(&self, submit: bool, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        self.calls.lock().unwrap().push(Call {
            org: self.org.clone(),
            submit,
            function: function.to_string(),
            args: args.to_vec(),
        });
        if let Some(message) = &self.failure {
            return Err(GatewayError::Transaction(message.clone()));
        }
        Ok(self
            .results
            .get(function)
            .cloned()
            .unwrap_or_else(|| b"{}".to_vec()))
    }
}

#[async_trait]
impl Contract for RecordingContract {
    async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        self.record(true, function, args)
    }

    async fn evaluate_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        self.record(false, function, args)
    }
}

/// A fully wired context over in-memory fakes.
pub struct Harness {
    pub context: AppContext,
    pub wallet: Arc<MemoryWallet>,
    pub ca: Arc<FakeCa>,
    pub connector: Arc<RecordingConnector>,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        let wallet = Arc::new(MemoryWallet::new());
        let ca = Arc::new(FakeCa::default());
        let connector = Arc::new(RecordingConnector::default());

        let mut authorities: HashMap<OrgId, Arc<dyn CertificateAuthority>> = HashMap::new();
        let mut profiles = ConnectionProfiles::new();
        for o in settings.org_ids() {
            authorities.insert(o.clone(), ca.clone());
            profiles.insert(o.clone(), ConnectionProfile::from_json("{}").unwrap());
        }

        let context = AppContext::from_parts(
            settings,
            wallet.clone(),
            authorities,
            profiles,
            connector.clone(),
        );
        Self {
            context,
            wallet,
            ca,
            connector,
        }
    }

    /// Stores an application identity for every configured organization.
    pub async fn provision_all(&self) {
        let labels = self.context.settings.labels.clone();
        for o in self.context.settings.org_ids() {
            let identity = Identity::new(o.clone(), Role::ApplicationUser, "CERT".into(), "KEY".into());
            self.wallet.put(&labels.app_user, &identity).await.unwrap();
        }
    }

    /// Serves the router on an ephemeral local port and returns its base URL.
    pub async fn spawn(&self) -> String {
        let router = battery_passport_gateway::transport::http::create_router(self.context.app_state());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
