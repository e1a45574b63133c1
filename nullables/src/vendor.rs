//! Scripted vendor clients — replay canned responses in submission order.

use async_trait::async_trait;
use idgate_types::{ProfileId, VendorRequestId};
use idgate_vendor::{
    BharatApi, BharatReply, ProfileApi, TaskApi, TaskEnvelope, TaskSpec, VendorError,
};
use serde_json::Value;
use std::sync::Mutex;

/// A task vendor that hands out a fixed request id on submit and replays a
/// scripted sequence of status bodies. Submitted specs are recorded for
/// assertions.
pub struct ScriptedTaskApi {
    request_id: String,
    status_replies: Mutex<Vec<Value>>,
    submitted: Mutex<Vec<TaskSpec>>,
}

impl ScriptedTaskApi {
    pub fn new(request_id: impl Into<String>, status_replies: Vec<Value>) -> Self {
        Self {
            request_id: request_id.into(),
            status_replies: Mutex::new(status_replies),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Every spec submitted so far.
    pub fn submitted(&self) -> Vec<TaskSpec> {
        self.submitted.lock().unwrap().clone()
    }

    /// Status replies not yet consumed.
    pub fn remaining_replies(&self) -> usize {
        self.status_replies.lock().unwrap().len()
    }
}

#[async_trait]
impl TaskApi for ScriptedTaskApi {
    async fn submit(&self, spec: &TaskSpec) -> Result<VendorRequestId, VendorError> {
        self.submitted.lock().unwrap().push(spec.clone());
        Ok(VendorRequestId::new(self.request_id.clone()))
    }

    async fn status(
        &self,
        _request_id: &VendorRequestId,
    ) -> Result<Option<TaskEnvelope>, VendorError> {
        let mut replies = self.status_replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(None);
        }
        Ok(TaskEnvelope::from_value(replies.remove(0)))
    }
}

/// A profile vendor that replays scripted bodies for create and status.
pub struct ScriptedProfileApi {
    create_replies: Mutex<Vec<Result<Value, VendorError>>>,
    status_replies: Mutex<Vec<Result<Value, VendorError>>>,
    created: Mutex<Vec<Value>>,
}

impl ScriptedProfileApi {
    pub fn new(
        create_replies: Vec<Result<Value, VendorError>>,
        status_replies: Vec<Result<Value, VendorError>>,
    ) -> Self {
        Self {
            create_replies: Mutex::new(create_replies),
            status_replies: Mutex::new(status_replies),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Requests passed to `create_profile` so far.
    pub fn created(&self) -> Vec<Value> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileApi for ScriptedProfileApi {
    async fn create_profile(&self, request: &Value) -> Result<Value, VendorError> {
        self.created.lock().unwrap().push(request.clone());
        self.create_replies
            .lock()
            .unwrap()
            .remove(0)
    }

    async fn profile_status(&self, _profile_id: &ProfileId) -> Result<Value, VendorError> {
        self.status_replies.lock().unwrap().remove(0)
    }
}

/// A Bharat vendor that replays one scripted reply per call, regardless of
/// endpoint. Calls are recorded as (method, payload-summary) pairs.
pub struct ScriptedBharatApi {
    replies: Mutex<Vec<BharatReply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBharatApi {
    pub fn new(replies: Vec<BharatReply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: String) -> Result<BharatReply, VendorError> {
        self.calls.lock().unwrap().push(call);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(VendorError::Query("scripted replies exhausted".into()));
        }
        Ok(replies.remove(0))
    }
}

#[async_trait]
impl BharatApi for ScriptedBharatApi {
    async fn send_otp(
        &self,
        request_id: &str,
        _aadhaar_no: &str,
    ) -> Result<BharatReply, VendorError> {
        self.next(format!("send_otp:{request_id}"))
    }

    async fn verify_otp(
        &self,
        request_id: &str,
        result_id: &str,
        _otp: &str,
    ) -> Result<BharatReply, VendorError> {
        self.next(format!("verify_otp:{request_id}:{result_id}"))
    }

    async fn verify_pan(
        &self,
        request_id: &str,
        _full_name: &str,
        _date_of_birth: &str,
        pan: &str,
    ) -> Result<BharatReply, VendorError> {
        self.next(format!("verify_pan:{request_id}:{pan}"))
    }

    async fn penny_drop_send(
        &self,
        request_id: &str,
        bank_account: &str,
        _ifsc: &str,
    ) -> Result<BharatReply, VendorError> {
        self.next(format!("penny_drop_send:{request_id}:{bank_account}"))
    }

    async fn penny_drop_status(
        &self,
        request_id: &str,
        result_id: &str,
    ) -> Result<BharatReply, VendorError> {
        self.next(format!("penny_drop_status:{request_id}:{result_id}"))
    }

    async fn pennyless_verify(
        &self,
        request_id: &str,
        bank_account: &str,
        _ifsc: &str,
    ) -> Result<BharatReply, VendorError> {
        self.next(format!("pennyless_verify:{request_id}:{bank_account}"))
    }
}
