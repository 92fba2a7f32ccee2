//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use xs2a_model::{
    AuthenticationObject, Authorisation, AuthorisationFlow, ChallengeData, OtpFormat, PsuIdData,
    ResourceRef, ScaApproach, ScaStatus, TransitionResult,
};
use xs2a_sca::{
    AuthenticationProvider, AuthorisationBackend, AuthorisationService, CmsError,
    DecoupledScaOutcome, InMemoryCms, ScaConfig, ServiceBackends, SpiContext, SpiError,
    SpiResult,
};

pub const PASSWORD: &str = "12345";
pub const OTP: &str = "123456";
pub const BASE_URL: &str = "http://url";
pub const DECOUPLED_MESSAGE: &str = "Please confirm in your banking app";

/// Authentication provider with scripted answers
pub struct MockProvider {
    methods: Mutex<Vec<AuthenticationObject>>,
    decoupled_status: Mutex<ScaStatus>,
    unavailable: bool,
    calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            methods: Mutex::new(vec![sms_method()]),
            decoupled_status: Mutex::new(ScaStatus::ScaMethodSelected),
            unavailable: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_methods(self, methods: Vec<AuthenticationObject>) -> Self {
        *self.methods.lock().unwrap() = methods;
        self
    }

    pub fn with_decoupled_status(self, status: ScaStatus) -> Self {
        *self.decoupled_status.lock().unwrap() = status;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Names of the SPI operations called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> SpiResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.unavailable {
            return Err(SpiError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthenticationProvider for MockProvider {
    async fn authorise_psu(
        &self,
        _context: &SpiContext,
        _psu_data: &PsuIdData,
        password: &str,
        _payload: &serde_json::Value,
    ) -> SpiResult<()> {
        self.record("authorise_psu")?;
        if password != PASSWORD {
            return Err(SpiError::CredentialsInvalid("Wrong password".to_string()));
        }
        Ok(())
    }

    async fn request_available_sca_methods(
        &self,
        _context: &SpiContext,
        _payload: &serde_json::Value,
    ) -> SpiResult<Vec<AuthenticationObject>> {
        self.record("request_available_sca_methods")?;
        Ok(self.methods.lock().unwrap().clone())
    }

    async fn request_authorisation_code(
        &self,
        _context: &SpiContext,
        _authentication_method_id: &str,
        _payload: &serde_json::Value,
    ) -> SpiResult<Option<ChallengeData>> {
        self.record("request_authorisation_code")?;
        Ok(Some(ChallengeData {
            otp_max_length: Some(6),
            otp_format: Some(OtpFormat::Integer),
            ..ChallengeData::default()
        }))
    }

    async fn start_decoupled_sca(
        &self,
        _context: &SpiContext,
        _authentication_method_id: Option<&str>,
        _payload: &serde_json::Value,
    ) -> SpiResult<DecoupledScaOutcome> {
        self.record("start_decoupled_sca")?;
        let status = *self.decoupled_status.lock().unwrap();
        Ok(DecoupledScaOutcome::new(status).with_psu_message(DECOUPLED_MESSAGE))
    }

    async fn verify_sca_authorisation(
        &self,
        _context: &SpiContext,
        sca_authentication_data: &str,
        _payload: &serde_json::Value,
    ) -> SpiResult<()> {
        self.record("verify_sca_authorisation")?;
        if sca_authentication_data != OTP {
            return Err(SpiError::CredentialsInvalid("Wrong OTP".to_string()));
        }
        Ok(())
    }
}

/// In-memory CMS that counts writes
#[derive(Default)]
pub struct CountingCms {
    pub inner: InMemoryCms,
    saves: AtomicUsize,
}

impl CountingCms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorisationBackend for CountingCms {
    async fn get_authorisation(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
    ) -> Result<Option<Authorisation>, CmsError> {
        self.inner.get_authorisation(authorisation_id, flow).await
    }

    async fn get_sca_approach(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
    ) -> Result<Option<ScaApproach>, CmsError> {
        self.inner.get_sca_approach(authorisation_id, flow).await
    }

    async fn save_transition(
        &self,
        authorisation_id: &str,
        flow: AuthorisationFlow,
        result: &TransitionResult,
    ) -> Result<(), CmsError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner
            .save_transition(authorisation_id, flow, result)
            .await
    }

    async fn create_authorisation(
        &self,
        authorisation: Authorisation,
    ) -> Result<Authorisation, CmsError> {
        self.inner.create_authorisation(authorisation).await
    }
}

/// Consent management that cannot be reached
pub struct DownCms;

#[async_trait]
impl AuthorisationBackend for DownCms {
    async fn get_authorisation(
        &self,
        _: &str,
        _: AuthorisationFlow,
    ) -> Result<Option<Authorisation>, CmsError> {
        Err(CmsError::Unavailable("connection refused".to_string()))
    }

    async fn get_sca_approach(
        &self,
        _: &str,
        _: AuthorisationFlow,
    ) -> Result<Option<ScaApproach>, CmsError> {
        Err(CmsError::Unavailable("connection refused".to_string()))
    }

    async fn save_transition(
        &self,
        _: &str,
        _: AuthorisationFlow,
        _: &TransitionResult,
    ) -> Result<(), CmsError> {
        Err(CmsError::Unavailable("connection refused".to_string()))
    }

    async fn create_authorisation(&self, _: Authorisation) -> Result<Authorisation, CmsError> {
        Err(CmsError::Unavailable("connection refused".to_string()))
    }
}

pub struct TestContext {
    pub cms: Arc<CountingCms>,
    pub provider: Arc<MockProvider>,
    pub service: AuthorisationService,
}

pub fn default_config() -> ScaConfig {
    ScaConfig::new(vec![ScaApproach::Embedded, ScaApproach::Decoupled], BASE_URL)
}

pub fn redirect_config() -> ScaConfig {
    ScaConfig::new(vec![ScaApproach::Redirect, ScaApproach::Embedded], BASE_URL).with_redirect_urls(
        "https://aspsp/pis/{redirect-id}/{encrypted-payment-id}",
        "https://aspsp/pis/cancellation/{redirect-id}/{encrypted-payment-id}",
        "https://aspsp/ais/{redirect-id}/{encrypted-consent-id}",
    )
}

pub fn setup_with(config: ScaConfig, provider: MockProvider) -> TestContext {
    let cms = Arc::new(CountingCms::new());
    let provider = Arc::new(provider);
    let service =
        AuthorisationService::new(&config, ServiceBackends::shared(cms.clone()), provider.clone())
            .unwrap();
    TestContext {
        cms,
        provider,
        service,
    }
}

pub fn setup() -> TestContext {
    setup_with(default_config(), MockProvider::new())
}

/// Second service over the same store and provider
pub fn rebuild_service(ctx: &TestContext) -> AuthorisationService {
    AuthorisationService::new(
        &default_config(),
        ServiceBackends::shared(ctx.cms.clone()),
        ctx.provider.clone(),
    )
    .unwrap()
}

pub fn payment() -> ResourceRef {
    ResourceRef::payment("payments", "sepa-credit-transfers", "payment-1")
}

pub fn consent() -> ResourceRef {
    ResourceRef::consent("consent-1")
}

pub fn psu() -> PsuIdData {
    PsuIdData::new("PSU-1")
}

pub fn sms_method() -> AuthenticationObject {
    AuthenticationObject::new("SMS_OTP", "sms").with_name("SMS")
}

pub fn chip_method() -> AuthenticationObject {
    AuthenticationObject::new("CHIP_OTP", "chip").with_name("chipTAN")
}

pub fn app_method() -> AuthenticationObject {
    AuthenticationObject::new("PUSH_OTP", "app")
        .with_name("Banking app")
        .decoupled()
}

/// Store an authorisation in the given state and return it
pub fn seed(
    ctx: &TestContext,
    resource: &ResourceRef,
    flow: AuthorisationFlow,
    approach: ScaApproach,
    status: ScaStatus,
    psu_data: PsuIdData,
) -> Authorisation {
    let mut authorisation = Authorisation::new(
        resource.resource_id(),
        resource.service_type(),
        flow,
        psu_data,
        approach,
    );
    authorisation.sca_status = status;
    ctx.cms.inner.insert(authorisation.clone());
    authorisation
}
