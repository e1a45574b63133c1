//! Thread-safe in-memory storage backend.
//!
//! One `Mutex`-guarded map per collection. The mutex is held across every
//! check-and-write, which is what makes the terminal-dedup contract of the
//! store traits atomic here: two racing terminal writers serialize on the
//! lock, the second one observes the first one's write and gets
//! `StoreError::Duplicate`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use idgate_store::{
    AadhaarRecord, AadhaarStore, BharatRecord, BharatStore, PanRecord, PanStore, StoreError,
    VendorEventStore, VideoKycRecord, VideoKycStore,
};
use idgate_types::{ProfileId, RecordStatus, ReferenceId, ResultId, Timestamp};

/// In-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    aadhaar: Mutex<HashMap<String, AadhaarRecord>>,
    pan: Mutex<HashMap<String, PanRecord>>,
    video_kyc: Mutex<HashMap<String, VideoKycRecord>>,
    bharat: Mutex<Vec<BharatRecord>>,
    events: Mutex<Vec<serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of opaque vendor events recorded (for tests and diagnostics).
    pub fn event_count(&self) -> usize {
        self.events.lock().map(|v| v.len()).unwrap_or(0)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
}

impl AadhaarStore for MemoryStore {
    fn insert(&self, record: AadhaarRecord) -> Result<(), StoreError> {
        let mut map = lock(&self.aadhaar)?;
        let key = record.request_ref_id.as_str().to_string();
        if map.contains_key(&key) {
            return Err(StoreError::Duplicate(key));
        }
        map.insert(key, record);
        Ok(())
    }

    fn find_by_request_ref(
        &self,
        request_ref_id: &ReferenceId,
    ) -> Result<Option<AadhaarRecord>, StoreError> {
        Ok(lock(&self.aadhaar)?.get(request_ref_id.as_str()).cloned())
    }

    fn apply_callback(
        &self,
        request_ref_id: &ReferenceId,
        vendor_reference_id: &ReferenceId,
        payload: serde_json::Value,
        received_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut map = lock(&self.aadhaar)?;

        // Dedup runs against the vendor-side id across the whole collection.
        if map
            .values()
            .any(|r| r.vendor_reference_id.as_ref() == Some(vendor_reference_id))
        {
            return Err(StoreError::Duplicate(vendor_reference_id.to_string()));
        }

        let entry = map
            .entry(request_ref_id.as_str().to_string())
            .or_insert_with(|| AadhaarRecord::pending(request_ref_id.clone(), None));
        entry.vendor_reference_id = Some(vendor_reference_id.clone());
        entry.callback_payload = Some(payload);
        entry.data_received_time = Some(received_at);
        entry.status = RecordStatus::Completed;
        Ok(())
    }
}

impl PanStore for MemoryStore {
    fn insert_completed(&self, record: PanRecord) -> Result<(), StoreError> {
        let mut map = lock(&self.pan)?;
        let key = record.task_id.as_str().to_string();
        if map.contains_key(&key) {
            return Err(StoreError::Duplicate(key));
        }
        map.insert(key, record);
        Ok(())
    }

    fn find_by_task_id(&self, task_id: &ReferenceId) -> Result<Option<PanRecord>, StoreError> {
        Ok(lock(&self.pan)?.get(task_id.as_str()).cloned())
    }
}

impl VideoKycStore for MemoryStore {
    fn insert(&self, record: VideoKycRecord) -> Result<(), StoreError> {
        let mut map = lock(&self.video_kyc)?;
        let key = record.profile_id.as_str().to_string();
        if map.contains_key(&key) {
            return Err(StoreError::Duplicate(key));
        }
        map.insert(key, record);
        Ok(())
    }

    fn find_by_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<VideoKycRecord>, StoreError> {
        Ok(lock(&self.video_kyc)?.get(profile_id.as_str()).cloned())
    }

    fn upsert_status(
        &self,
        profile_id: &ProfileId,
        status_payload: serde_json::Value,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut map = lock(&self.video_kyc)?;
        let record = map
            .get_mut(profile_id.as_str())
            .ok_or_else(|| StoreError::NotFound(profile_id.to_string()))?;
        // Status merges are free-form while the record is open; they carry
        // no terminal marker, so no dedup applies.
        record.last_status_response = Some(status_payload);
        record.update_status_time = Some(updated_at);
        Ok(())
    }

    fn apply_callback(
        &self,
        profile_id: &ProfileId,
        payload: serde_json::Value,
        file_urls: Option<serde_json::Value>,
        status: RecordStatus,
        received_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut map = lock(&self.video_kyc)?;

        if let Some(existing) = map.get(profile_id.as_str()) {
            if existing.callback_payload.is_some() {
                return Err(StoreError::Duplicate(profile_id.to_string()));
            }
        }

        let entry = map
            .entry(profile_id.as_str().to_string())
            .or_insert_with(|| {
                VideoKycRecord::pending(
                    ReferenceId::new(""),
                    profile_id.clone(),
                    serde_json::Value::Null,
                )
            });
        entry.callback_payload = Some(payload);
        entry.file_urls = file_urls;
        entry.status = status;
        entry.data_received_time = Some(received_at);
        Ok(())
    }
}

impl BharatStore for MemoryStore {
    fn insert(&self, record: BharatRecord) -> Result<(), StoreError> {
        lock(&self.bharat)?.push(record);
        Ok(())
    }

    fn find_by_pair(
        &self,
        request_id: &ReferenceId,
        result_id: &ResultId,
    ) -> Result<Option<BharatRecord>, StoreError> {
        Ok(lock(&self.bharat)?
            .iter()
            .find(|r| &r.request_id == request_id && r.result_id.as_ref() == Some(result_id))
            .cloned())
    }

    fn find_completed_bank_account(
        &self,
        bank_account: &str,
        ifsc: &str,
    ) -> Result<Option<BharatRecord>, StoreError> {
        Ok(lock(&self.bharat)?
            .iter()
            .find(|r| {
                r.status == RecordStatus::Completed
                    && r.subject["bank_account"] == bank_account
                    && r.subject["ifsc"] == ifsc
            })
            .cloned())
    }

    fn update_outcome(
        &self,
        request_id: &ReferenceId,
        result_id: &ResultId,
        status: RecordStatus,
        verify_response: serde_json::Value,
        image_file_url: Option<String>,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut records = lock(&self.bharat)?;
        let record = records
            .iter_mut()
            .find(|r| &r.request_id == request_id && r.result_id.as_ref() == Some(result_id))
            .ok_or_else(|| StoreError::NotFound(request_id.to_string()))?;

        if record.status.is_terminal() {
            return Err(StoreError::Duplicate(request_id.to_string()));
        }
        record.status = status;
        record.verify_response = Some(verify_response);
        record.image_file_url = image_file_url;
        record.updated_at = updated_at;
        Ok(())
    }
}

impl VendorEventStore for MemoryStore {
    fn insert(&self, payload: serde_json::Value) -> Result<(), StoreError> {
        lock(&self.events)?.push(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idgate_store::{AadhaarStore, BharatStore, PanStore, VideoKycStore};
    use idgate_types::DocType;
    use serde_json::json;

    fn ts() -> Timestamp {
        Timestamp::now()
    }

    #[test]
    fn aadhaar_insert_rejects_duplicate_request_ref() {
        let store = MemoryStore::new();
        let rec = AadhaarRecord::pending(ReferenceId::new("ref1"), None);
        AadhaarStore::insert(&store, rec.clone()).unwrap();
        assert!(AadhaarStore::insert(&store, rec).unwrap_err().is_duplicate());
    }

    #[test]
    fn aadhaar_callback_writes_exactly_once() {
        let store = MemoryStore::new();
        AadhaarStore::insert(
            &store,
            AadhaarRecord::pending(ReferenceId::new("ref1"), Some("token".into())),
        )
        .unwrap();

        let vendor_ref = ReferenceId::new("vend1");
        AadhaarStore::apply_callback(
            &store,
            &ReferenceId::new("ref1"),
            &vendor_ref,
            json!({"parsed_details": {"name": "Ravi Kumar"}}),
            ts(),
        )
        .unwrap();

        // Second terminal write for the same vendor reference loses the race.
        let err = AadhaarStore::apply_callback(
            &store,
            &ReferenceId::new("ref1"),
            &vendor_ref,
            json!({"parsed_details": {"name": "someone else"}}),
            ts(),
        )
        .unwrap_err();
        assert!(err.is_duplicate());

        // Stored payload is the first writer's, untouched.
        let stored = store
            .find_by_request_ref(&ReferenceId::new("ref1"))
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RecordStatus::Completed);
        assert_eq!(
            stored.callback_payload.unwrap()["parsed_details"]["name"],
            "Ravi Kumar"
        );
    }

    #[test]
    fn pan_terminal_insert_is_idempotent_guarded() {
        let store = MemoryStore::new();
        let rec = PanRecord {
            task_id: ReferenceId::new("task1"),
            status: RecordStatus::Completed,
            task_document: json!({"status": "completed"}),
            received_at: ts(),
        };
        store.insert_completed(rec.clone()).unwrap();
        assert!(store.insert_completed(rec).unwrap_err().is_duplicate());
        assert!(store
            .find_by_task_id(&ReferenceId::new("task1"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn video_status_upserts_freely_until_callback() {
        let store = MemoryStore::new();
        let profile = ProfileId::new("prof1");
        VideoKycStore::insert(
            &store,
            VideoKycRecord::pending(ReferenceId::new("ref1"), profile.clone(), json!({})),
        )
        .unwrap();

        store
            .upsert_status(&profile, json!({"status": "capture_pending"}), ts())
            .unwrap();
        store
            .upsert_status(&profile, json!({"status": "review_pending"}), ts())
            .unwrap();

        VideoKycStore::apply_callback(
            &store,
            &profile,
            json!({"status": "completed"}),
            None,
            RecordStatus::Completed,
            ts(),
        )
        .unwrap();

        let err = VideoKycStore::apply_callback(
            &store,
            &profile,
            json!({"status": "completed"}),
            None,
            RecordStatus::Completed,
            ts(),
        )
        .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn bharat_outcome_rejects_second_terminal_write() {
        let store = MemoryStore::new();
        let req = ReferenceId::new("req1");
        let res = ResultId::new("res1");
        BharatStore::insert(
            &store,
            BharatRecord::new(
                DocType::BankAccount,
                req.clone(),
                Some(res.clone()),
                RecordStatus::Pending,
                json!({"bank_account": "123456789012", "ifsc": "HDFC0001234"}),
                json!({}),
            ),
        )
        .unwrap();

        store
            .update_outcome(
                &req,
                &res,
                RecordStatus::Completed,
                json!({"data": {"status": "SUCCESS"}}),
                None,
                ts(),
            )
            .unwrap();

        let err = store
            .update_outcome(
                &req,
                &res,
                RecordStatus::Failed,
                json!({}),
                None,
                ts(),
            )
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn completed_bank_account_lookup_matches_subject() {
        let store = MemoryStore::new();
        let req = ReferenceId::new("req1");
        let res = ResultId::new("res1");
        BharatStore::insert(
            &store,
            BharatRecord::new(
                DocType::BankAccount,
                req.clone(),
                Some(res.clone()),
                RecordStatus::Pending,
                json!({"bank_account": "123456789012", "ifsc": "HDFC0001234"}),
                json!({}),
            ),
        )
        .unwrap();

        assert!(store
            .find_completed_bank_account("123456789012", "HDFC0001234")
            .unwrap()
            .is_none());

        store
            .update_outcome(
                &req,
                &res,
                RecordStatus::Completed,
                json!({"data": {"status": "SUCCESS"}}),
                None,
                ts(),
            )
            .unwrap();

        let hit = store
            .find_completed_bank_account("123456789012", "HDFC0001234")
            .unwrap()
            .unwrap();
        assert_eq!(hit.request_id, req);
    }

    #[test]
    fn vendor_events_accumulate_without_dedup() {
        let store = MemoryStore::new();
        VendorEventStore::insert(&store, json!({"k": 1})).unwrap();
        VendorEventStore::insert(&store, json!({"k": 1})).unwrap();
        assert_eq!(store.event_count(), 2);
    }
}
