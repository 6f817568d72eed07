//! Netfilter queue intake.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use grindvakt_core::Verdict;

use crate::{InterceptError, Packet};

/// The kernel-supplied packet stream.
///
/// Wraps one bound netfilter queue behind a mutex: the producer polls for
/// packets in non-blocking mode, and whichever worker finishes a decision
/// takes the lock briefly to send the verdict back. The lock is never held
/// across a blocking wait.
pub struct PacketQueue {
    inner: Arc<Mutex<nfq::Queue>>,
    num: u16,
}

impl PacketQueue {
    /// Open and bind queue `num`, with `depth` packets of kernel-side
    /// buffering and `copy_size` bytes of each packet copied to userspace.
    pub fn open(num: u16, depth: u32, copy_size: u16) -> Result<Self, InterceptError> {
        let mut queue = nfq::Queue::open().map_err(InterceptError::QueueOpen)?;
        queue
            .bind(num)
            .map_err(|source| InterceptError::QueueBind { num, source })?;
        queue
            .set_queue_max_len(num, depth)
            .map_err(|source| InterceptError::QueueBind { num, source })?;
        queue
            .set_copy_range(num, copy_size)
            .map_err(|source| InterceptError::QueueBind { num, source })?;
        queue.set_nonblocking(true);
        debug!(queue = num, depth, copy_size, "netfilter queue bound");

        Ok(Self {
            inner: Arc::new(Mutex::new(queue)),
            num,
        })
    }

    pub fn num(&self) -> u16 {
        self.num
    }

    /// Poll for the next queued packet.
    ///
    /// Returns `Ok(None)` when the queue is currently empty; the producer
    /// loop sleeps briefly and retries. The returned [`Packet`] carries its
    /// own verdict path back into this queue.
    pub fn poll(&self) -> Result<Option<Packet>, InterceptError> {
        let mut queue = self.inner.lock();
        match queue.recv() {
            Ok(mut msg) => {
                let data = Bytes::copy_from_slice(msg.get_payload());
                drop(queue);

                let inner = Arc::clone(&self.inner);
                let apply = Box::new(move |verdict: Verdict| {
                    msg.set_verdict(match verdict {
                        Verdict::Accept => nfq::Verdict::Accept,
                        Verdict::Drop => nfq::Verdict::Drop,
                    });
                    inner.lock().verdict(msg).map_err(InterceptError::Verdict)
                });
                Ok(Some(Packet::new(data, apply)))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(InterceptError::Recv(e)),
        }
    }

    /// Unbind from the kernel queue. Idempotent; called during teardown.
    pub fn close(&self) {
        let mut queue = self.inner.lock();
        if let Err(e) = queue.unbind(self.num) {
            debug!(queue = self.num, error = %e, "queue unbind failed");
        }
    }
}
