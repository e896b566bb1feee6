//! Delivery bridge — the single entry point the trigger layer invokes.
//!
//! One trigger runs one capture → encode → hand-off cycle. The consumer
//! callback registered at construction receives the encoded bytes by
//! value, at most once per trigger; after the call returns the bridge
//! holds no reference to the buffer. Capture and encode failures are
//! logged and reported to the caller, and nothing is delivered.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock,
};

use image::DynamicImage;
use serde::Serialize;

use crate::{
    capture::{self, CaptureError, EncodeError},
    lifecycle::{QuitPolicy, QuitSignal},
};

/// Consumer of one encoded frame.
///
/// Owns the buffer it is given and is expected to either finish with it
/// quickly or hand it to its own scheduling mechanism — it runs inline
/// on the event-loop thread.
pub type FrameConsumer = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// Process-wide consumer slot for deployments where the UI layer
/// constructs the bridge itself (see [`DeliveryBridge::from_registry`]).
static REGISTERED_CONSUMER: OnceLock<FrameConsumer> = OnceLock::new();

/// Registers the process-wide frame consumer.
///
/// Must happen before [`DeliveryBridge::from_registry`] resolves it.
/// The first registration wins and stays for the process lifetime.
pub fn register_consumer(consumer: FrameConsumer) -> Result<(), DeliveryError> {
    REGISTERED_CONSUMER
        .set(consumer)
        .map_err(|_| DeliveryError::ConsumerAlreadyRegistered)
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("a frame consumer is already registered")]
    ConsumerAlreadyRegistered,

    #[error("no frame consumer registered")]
    NoConsumerRegistered,
}

/// What a successful trigger produced, reported back to the trigger layer.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DeliveryReport {
    pub width: u32,
    pub height: u32,
    pub encoded_len: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(#[from] CaptureError),

    #[error("encode failed: {0}")]
    EncodeFailed(#[from] EncodeError),

    #[error("delivery already completed, process is shutting down")]
    ShuttingDown,
}

/// Bridges the capture pipeline to the external consumer.
///
/// Constructed once per process in the common deployment; each instance
/// independently guarantees at most one consumer invocation per trigger.
pub struct DeliveryBridge {
    consumer: FrameConsumer,
    quit_policy: QuitPolicy,
    /// Latched after the first successful delivery under
    /// [`QuitPolicy::AfterDelivery`]; later triggers are refused.
    delivered: AtomicBool,
}

impl DeliveryBridge {
    /// Builds a bridge around an explicitly supplied consumer.
    pub fn new(consumer: FrameConsumer, quit_policy: QuitPolicy) -> Self {
        Self {
            consumer,
            quit_policy,
            delivered: AtomicBool::new(false),
        }
    }

    /// Builds a bridge around the consumer registered via
    /// [`register_consumer`].
    ///
    /// This is the wiring for deployments where the UI layer constructs
    /// the bridge and the consumer handle is initialized earlier in
    /// process startup.
    pub fn from_registry(quit_policy: QuitPolicy) -> Result<Self, DeliveryError> {
        let consumer = REGISTERED_CONSUMER
            .get()
            .cloned()
            .ok_or(DeliveryError::NoConsumerRegistered)?;
        Ok(Self::new(consumer, quit_policy))
    }

    /// Runs one capture → encode → deliver cycle.
    ///
    /// Invokes the consumer at most once. On failure nothing is
    /// delivered and the next trigger starts from scratch; triggers are
    /// independent and there is no retry.
    pub fn on_trigger(&self, quit: &dyn QuitSignal) -> Result<DeliveryReport, TriggerError> {
        self.run_cycle(capture::capture_primary_display(), quit)
    }

    fn run_cycle(
        &self,
        frame: Result<DynamicImage, CaptureError>,
        quit: &dyn QuitSignal,
    ) -> Result<DeliveryReport, TriggerError> {
        if self.quit_policy == QuitPolicy::AfterDelivery && self.delivered.load(Ordering::Acquire) {
            log::debug!("trigger ignored: one-shot delivery already completed");
            return Err(TriggerError::ShuttingDown);
        }

        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("capture unavailable, nothing delivered: {e}");
                return Err(e.into());
            }
        };
        let (width, height) = (frame.width(), frame.height());

        let bytes = match capture::encode_png(&frame) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("encode failed, nothing delivered: {e}");
                return Err(e.into());
            }
        };
        let encoded_len = bytes.len();

        // Hand-off: `bytes` moves into the consumer, no alias survives
        // on this side of the call.
        (self.consumer)(bytes);

        log::info!("delivered {encoded_len} byte PNG ({width}x{height})");

        if self.quit_policy == QuitPolicy::AfterDelivery
            && !self.delivered.swap(true, Ordering::AcqRel)
        {
            quit.request_quit();
        }

        Ok(DeliveryReport {
            width,
            height,
            encoded_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;

    const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// Consumer that records every buffer it is handed.
    fn recording_consumer() -> (FrameConsumer, Arc<Mutex<Vec<Vec<u8>>>>) {
        let received: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let consumer: FrameConsumer = Arc::new(move |bytes| {
            sink.lock().unwrap().push(bytes);
        });
        (consumer, received)
    }

    #[derive(Default)]
    struct CountingQuit(std::sync::atomic::AtomicUsize);

    impl QuitSignal for CountingQuit {
        fn request_quit(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl CountingQuit {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn red_frame() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn successful_trigger_delivers_exactly_once() {
        let (consumer, received) = recording_consumer();
        let bridge = DeliveryBridge::new(consumer, QuitPolicy::Explicit);
        let quit = CountingQuit::default();

        let report = bridge.run_cycle(Ok(red_frame()), &quit).unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(report.width, 2);
        assert_eq!(report.height, 2);
        assert_eq!(report.encoded_len, received[0].len());
        assert_eq!(quit.count(), 0);
    }

    #[test]
    fn delivered_bytes_decode_back_to_the_captured_frame() {
        let (consumer, received) = recording_consumer();
        let bridge = DeliveryBridge::new(consumer, QuitPolicy::Explicit);

        bridge
            .run_cycle(Ok(red_frame()), &CountingQuit::default())
            .unwrap();

        let received = received.lock().unwrap();
        let bytes = &received[0];
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);

        let decoded = image::load_from_memory(bytes).unwrap().to_rgba8();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
        assert!(decoded.pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn unavailable_capture_delivers_nothing() {
        let (consumer, received) = recording_consumer();
        let bridge = DeliveryBridge::new(consumer, QuitPolicy::Explicit);

        let result = bridge.run_cycle(Err(CaptureError::NoDisplay), &CountingQuit::default());

        assert!(matches!(result, Err(TriggerError::CaptureUnavailable(_))));
        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_encode_delivers_nothing() {
        let (consumer, received) = recording_consumer();
        let bridge = DeliveryBridge::new(consumer, QuitPolicy::Explicit);

        // Zero-area frame is the one encode failure constructible here.
        let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        let result = bridge.run_cycle(Ok(empty), &CountingQuit::default());

        assert!(matches!(result, Err(TriggerError::EncodeFailed(_))));
        assert!(received.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_trigger_does_not_poison_the_next_one() {
        let (consumer, received) = recording_consumer();
        let bridge = DeliveryBridge::new(consumer, QuitPolicy::Explicit);
        let quit = CountingQuit::default();

        assert!(bridge
            .run_cycle(Err(CaptureError::NoDisplay), &quit)
            .is_err());
        assert!(bridge.run_cycle(Ok(red_frame()), &quit).is_ok());

        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[test]
    fn two_triggers_deliver_two_independent_buffers() {
        let (consumer, received) = recording_consumer();
        let bridge = DeliveryBridge::new(consumer, QuitPolicy::Explicit);
        let quit = CountingQuit::default();

        bridge.run_cycle(Ok(red_frame()), &quit).unwrap();
        bridge.run_cycle(Ok(red_frame()), &quit).unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(&received[0][..8], &PNG_SIGNATURE);
        assert_eq!(&received[1][..8], &PNG_SIGNATURE);
        // Independent allocations, not two views of one buffer.
        assert_ne!(received[0].as_ptr(), received[1].as_ptr());
        assert_eq!(quit.count(), 0);
    }

    #[test]
    fn after_delivery_policy_quits_once_and_refuses_later_triggers() {
        let (consumer, received) = recording_consumer();
        let bridge = DeliveryBridge::new(consumer, QuitPolicy::AfterDelivery);
        let quit = CountingQuit::default();

        bridge.run_cycle(Ok(red_frame()), &quit).unwrap();
        assert_eq!(quit.count(), 1);

        let result = bridge.run_cycle(Ok(red_frame()), &quit);
        assert!(matches!(result, Err(TriggerError::ShuttingDown)));
        assert_eq!(received.lock().unwrap().len(), 1);
        assert_eq!(quit.count(), 1);
    }

    #[test]
    fn after_delivery_policy_keeps_accepting_triggers_until_one_succeeds() {
        let (consumer, received) = recording_consumer();
        let bridge = DeliveryBridge::new(consumer, QuitPolicy::AfterDelivery);
        let quit = CountingQuit::default();

        assert!(bridge
            .run_cycle(Err(CaptureError::NoDisplay), &quit)
            .is_err());
        assert_eq!(quit.count(), 0);

        bridge.run_cycle(Ok(red_frame()), &quit).unwrap();
        assert_eq!(received.lock().unwrap().len(), 1);
        assert_eq!(quit.count(), 1);
    }

    #[test]
    fn registry_hands_out_the_registered_consumer_once_set() {
        // The registry is process-wide, so its whole lifecycle lives in
        // this one test: register, reject a duplicate, resolve.
        let (consumer, received) = recording_consumer();
        register_consumer(consumer).unwrap();

        let duplicate: FrameConsumer = Arc::new(|_| {});
        assert!(matches!(
            register_consumer(duplicate),
            Err(DeliveryError::ConsumerAlreadyRegistered)
        ));

        let bridge = DeliveryBridge::from_registry(QuitPolicy::Explicit).unwrap();
        bridge
            .run_cycle(Ok(red_frame()), &CountingQuit::default())
            .unwrap();
        assert_eq!(received.lock().unwrap().len(), 1);
    }
}
