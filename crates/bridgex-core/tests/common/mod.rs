// In-memory gateway shared by the controller tests.

#![allow(clippy::unwrap_used, dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;
use url::Url;

use bridgex_api::{DeviceRecord, FileTransfer, HealthResponse, PairResponse};
use bridgex_core::{Controller, ControllerConfig, CoreError, Gateway, Operation, TransferHandle};

type HealthReply = Result<HealthResponse, CoreError>;
type DevicesReply = Result<Vec<DeviceRecord>, CoreError>;

/// Gateway whose answers are set by the test and whose calls are counted.
pub struct ScriptedGateway {
    pub health_ok: AtomicBool,
    deferred_health: Mutex<VecDeque<oneshot::Receiver<HealthReply>>>,
    pub devices: Mutex<DevicesReply>,
    deferred_devices: Mutex<VecDeque<oneshot::Receiver<DevicesReply>>>,
    pub pair_reply: Mutex<Result<PairResponse, CoreError>>,
    pub paired_names: Mutex<Vec<String>>,
    pub removed: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<PathBuf>>,

    pub health_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub pair_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            health_ok: AtomicBool::new(true),
            deferred_health: Mutex::new(VecDeque::new()),
            devices: Mutex::new(Ok(Vec::new())),
            deferred_devices: Mutex::new(VecDeque::new()),
            pair_reply: Mutex::new(Ok(PairResponse::default())),
            paired_names: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            health_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            pair_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
        }
    }

    /// Make the next health check wait for the returned sender.
    pub fn defer_health(&self) -> oneshot::Sender<HealthReply> {
        let (tx, rx) = oneshot::channel();
        self.deferred_health.lock().unwrap().push_back(rx);
        tx
    }

    /// Make the next device listing wait for the returned sender.
    pub fn defer_devices(&self) -> oneshot::Sender<DevicesReply> {
        let (tx, rx) = oneshot::channel();
        self.deferred_devices.lock().unwrap().push_back(rx);
        tx
    }

    pub fn set_devices(&self, records: Vec<DeviceRecord>) {
        *self.devices.lock().unwrap() = Ok(records);
    }

    pub fn fail_devices(&self, message: &str) {
        *self.devices.lock().unwrap() = Err(rejected(Operation::ListDevices, message));
    }

    pub fn set_pair_reply(&self, reply: Result<PairResponse, CoreError>) {
        *self.pair_reply.lock().unwrap() = reply;
    }
}

impl Gateway for ScriptedGateway {
    async fn health_check(&self) -> Result<HealthResponse, CoreError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let deferred = self.deferred_health.lock().unwrap().pop_front();
        if let Some(rx) = deferred {
            return rx.await.unwrap();
        }
        if self.health_ok.load(Ordering::SeqCst) {
            Ok(healthy("0.1.0"))
        } else {
            Err(transport_failure(Operation::HealthCheck))
        }
    }

    async fn list_devices(&self) -> Result<Vec<DeviceRecord>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let deferred = self.deferred_devices.lock().unwrap().pop_front();
        if let Some(rx) = deferred {
            return rx.await.unwrap();
        }
        self.devices.lock().unwrap().clone()
    }

    async fn start_pairing(&self, device_name: &str) -> Result<PairResponse, CoreError> {
        self.pair_calls.fetch_add(1, Ordering::SeqCst);
        self.paired_names
            .lock()
            .unwrap()
            .push(device_name.to_owned());
        self.pair_reply.lock().unwrap().clone()
    }

    async fn remove_device(&self, device_id: &str) -> Result<(), CoreError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.removed.lock().unwrap().push(device_id.to_owned());
        Ok(())
    }

    async fn send_file(
        &self,
        device_id: &str,
        file_paths: &[PathBuf],
    ) -> Result<TransferHandle, CoreError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().extend_from_slice(file_paths);
        let files = file_paths
            .iter()
            .enumerate()
            .map(|(i, path)| FileTransfer {
                transfer_id: format!("t-{i}"),
                file_name: path.file_name().unwrap().to_string_lossy().into_owned(),
                file_size: 4,
                file_hash: "0".repeat(64),
            })
            .collect();
        Ok(TransferHandle {
            device_id: device_id.to_owned(),
            files,
        })
    }
}

// ── Builders ────────────────────────────────────────────────────────

pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

pub fn healthy(version: &str) -> HealthResponse {
    HealthResponse {
        status: Some("ok".into()),
        version: Some(version.into()),
        ..HealthResponse::default()
    }
}

pub fn transport_failure(operation: Operation) -> CoreError {
    CoreError::Transport {
        operation,
        reason: "connection refused".into(),
    }
}

pub fn rejected(operation: Operation, message: &str) -> CoreError {
    CoreError::Rejected {
        operation,
        message: message.into(),
    }
}

pub fn config() -> ControllerConfig {
    let mut config = ControllerConfig::new(Url::parse("http://127.0.0.1:8080").unwrap());
    config.device_name = "Desktop PC".into();
    config.startup_grace = Duration::from_secs(2);
    config.refresh_interval = Duration::from_secs(30);
    config.pairing_refresh_delay = Duration::from_secs(1);
    config
}

pub fn controller() -> Controller<ScriptedGateway> {
    Controller::new(ScriptedGateway::new(), config())
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
