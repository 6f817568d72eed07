//! One intercepted packet and its verdict.

use std::fmt;

use bytes::Bytes;

use grindvakt_core::Verdict;

use crate::InterceptError;

type Applier = Box<dyn FnOnce(Verdict) -> Result<(), InterceptError> + Send>;

/// A packet pulled from the kernel queue, owning its payload and the means
/// to answer it.
///
/// [`verdict`](Packet::verdict) takes the packet by value: every packet is
/// verdicted exactly once, and a second verdict is unrepresentable rather
/// than a runtime error.
pub struct Packet {
    data: Bytes,
    apply: Applier,
}

impl Packet {
    pub fn new(data: Bytes, apply: Applier) -> Self {
        Self { data, apply }
    }

    /// Raw frame as copied from the kernel, starting at the IP header.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Render the decision back to the kernel, consuming the packet.
    pub fn verdict(self, verdict: Verdict) -> Result<(), InterceptError> {
        (self.apply)(verdict)
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_reaches_the_applier() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let packet = Packet::new(
            Bytes::from_static(b"frame"),
            Box::new(move |v| {
                tx.send(v).unwrap();
                Ok(())
            }),
        );

        assert_eq!(packet.data().as_ref(), b"frame");
        packet.verdict(Verdict::Drop).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Verdict::Drop);
    }
}
