use std::sync::atomic::{AtomicU64, Ordering};

/// Response ids of the form `req-<uuid>`, unique per process without locking.
pub(crate) struct RequestIdGenerator {
    seed: u128,
    counter: AtomicU64,
}

impl RequestIdGenerator {
    #[must_use]
    pub(crate) fn new() -> Self {
        let seed_hi = u128::from(fastrand::u64(..));
        let seed_lo = u128::from(fastrand::u64(..));
        Self {
            seed: (seed_hi << 64) | seed_lo,
            counter: AtomicU64::new(1),
        }
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    #[must_use]
    pub(crate) fn request_uuid(&self, request_seq: u64) -> uuid::Uuid {
        uuid::Uuid::from_u128(self.seed ^ u128::from(request_seq))
    }

    #[must_use]
    pub(crate) fn next_request_id(&self) -> String {
        let uuid = self.request_uuid(self.next_seq());
        let mut buf = uuid::Uuid::encode_buffer();
        let mut id = String::with_capacity(4 + uuid::fmt::Hyphenated::LENGTH);
        id.push_str("req-");
        id.push_str(uuid.hyphenated().encode_lower(&mut buf));
        id
    }
}
