//! # Print Job Orchestration
//!
//! The end-to-end lifecycle of one print request:
//!
//! ```text
//! discovering → connecting → connected → transmitting → awaiting status
//!                                                            │
//!                                    success ◄───────────────┴──► failed
//!                                       └────────► cleaned up ◄────┘
//! ```
//!
//! A [`Printer`] spawns one control task that owns the device, discovery,
//! and radio handles outright. Radio power reports, discovery hits, and
//! the device's asynchronous status callback all arrive from their own
//! threads; each is forwarded as a message into the control task's queue
//! and processed strictly one at a time, so the state machine never sees
//! concurrent mutation.
//!
//! Exactly one job may be in flight at a time. Every path out of a job
//! (success, any failure, a timeout) notifies the [`PrinterEventDelegate`]
//! exactly once and then runs the same idempotent cleanup: stop discovery,
//! disconnect, clear the device's command buffer, release the discovery
//! and radio handles. Nothing is retried.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::config::Configuration;
use crate::device::status::{self, StatusSnapshot};
use crate::device::{
    CutKind, DeviceFilter, DeviceInfo, Discovery, Platform, PrinterPort, RadioMonitor, RadioState,
    ResultCode,
};
use crate::error::ReciboError;
use crate::render;
use crate::strings::{EnglishStrings, StringTable};
use crate::template::Template;

/// Outcome callbacks implemented by the caller.
///
/// Exactly one of the two fires per print job, always before the job's
/// internal cleanup releases the transport handles.
pub trait PrinterEventDelegate: Send + Sync {
    fn on_error(&self, message: &str);
    fn on_success_printed(&self);
}

const ERR_NOT_DISCOVERABLE: &str = "Unable to discover connected printer";
const ERR_RADIO_OFF: &str = "Bluetooth is not turned on.";
const ERR_NO_STATUS: &str = "Printer accepted the data but never reported print status.";

/// Where the control task currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    /// Startup radio-permission probe is running; no device handle yet.
    Probing,
    /// Device handle ready, no job in flight.
    Idle,
    Discovering,
    Connecting,
    Connected,
    Transmitting,
    AwaitingStatus,
    /// A finished job was torn down; ready for the next one.
    CleanedUp,
}

impl JobState {
    fn job_in_flight(self) -> bool {
        matches!(
            self,
            JobState::Discovering
                | JobState::Connecting
                | JobState::Connected
                | JobState::Transmitting
                | JobState::AwaitingStatus
        )
    }
}

/// Everything the control task reacts to, funneled through one queue.
enum Event {
    SetTemplate {
        templates: Vec<Template>,
        reply: oneshot::Sender<Result<(), ReciboError>>,
    },
    Print {
        reply: oneshot::Sender<Result<(), ReciboError>>,
    },
    DeviceFound(DeviceInfo),
    RadioState(RadioState),
    StatusReport(StatusSnapshot),
    ProbeExpired,
    DiscoveryTimeout { generation: u64 },
    StatusTimeout { generation: u64 },
    Shutdown,
}

/// Handle to a printer's control task.
///
/// Construction immediately runs a short radio-permission probe (start
/// discovery, wait the configured grace period, tear the probe down).
/// This exists only to trigger the platform's pairing/permission prompt
/// once at startup; the device handle is created when the probe settles,
/// and [`set_template`](Printer::set_template) fails with a setup error
/// until then.
///
/// Dropping the handle shuts the control task down.
pub struct Printer {
    tx: mpsc::UnboundedSender<Event>,
}

impl Printer {
    /// Spawn a printer control task with the bundled English strings.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        configuration: Configuration,
        platform: Box<dyn Platform>,
        delegate: Arc<dyn PrinterEventDelegate>,
    ) -> Self {
        Self::with_strings(configuration, platform, delegate, Arc::new(EnglishStrings))
    }

    /// Spawn a printer control task with a custom string table.
    pub fn with_strings(
        configuration: Configuration,
        platform: Box<dyn Platform>,
        delegate: Arc<dyn PrinterEventDelegate>,
        strings: Arc<dyn StringTable>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = Runner {
            configuration,
            platform,
            delegate,
            strings,
            tx: tx.clone(),
            port: None,
            discovery: None,
            radio: None,
            state: JobState::Probing,
            device_found: false,
            generation: 0,
        };
        tokio::spawn(runner.run(rx));
        Self { tx }
    }

    /// Render `templates` into the device's command buffer.
    ///
    /// The commands wait there until [`print`](Printer::print) appends the
    /// cut/feed finalize and starts the job. Fails with
    /// [`ReciboError::Setup`] while no device handle exists and with
    /// [`ReciboError::Command`] when the device rejects a command (the
    /// pending buffer is cleared in that case).
    pub async fn set_template(&self, templates: Vec<Template>) -> Result<(), ReciboError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Event::SetTemplate { templates, reply })
            .map_err(|_| ReciboError::ChannelClosed)?;
        rx.await.map_err(|_| ReciboError::ChannelClosed)?
    }

    /// Finalize the buffered receipt with a cut and start the print job.
    ///
    /// Returns [`ReciboError::Busy`] when a job is already in flight.
    /// Everything after that, including a rejected cut command, is
    /// reported through the delegate: `Ok(())` means the request was
    /// taken, not that paper came out.
    pub async fn print(&self) -> Result<(), ReciboError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Event::Print { reply })
            .map_err(|_| ReciboError::ChannelClosed)?;
        rx.await.map_err(|_| ReciboError::ChannelClosed)?
    }
}

impl Drop for Printer {
    fn drop(&mut self) {
        let _ = self.tx.send(Event::Shutdown);
    }
}

/// The control task. Owns every transport handle; mutated only from
/// [`Runner::run`]'s event loop.
struct Runner {
    configuration: Configuration,
    platform: Box<dyn Platform>,
    delegate: Arc<dyn PrinterEventDelegate>,
    strings: Arc<dyn StringTable>,
    tx: mpsc::UnboundedSender<Event>,
    port: Option<Box<dyn PrinterPort>>,
    discovery: Option<Box<dyn Discovery>>,
    radio: Option<Box<dyn RadioMonitor>>,
    state: JobState,
    device_found: bool,
    /// Bumped on every cleanup; armed timers carry the generation they
    /// were created under and are ignored once it is stale.
    generation: u64,
}

impl Runner {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Event>) {
        self.begin_permission_probe();
        while let Some(event) = rx.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        self.cleanup();
    }

    /// Returns `false` when the task should stop.
    fn handle(&mut self, event: Event) -> bool {
        match event {
            Event::SetTemplate { templates, reply } => {
                let _ = reply.send(self.set_template(&templates));
            }
            Event::Print { reply } => {
                let _ = reply.send(self.print());
            }
            Event::DeviceFound(info) => self.on_discovery(info),
            Event::RadioState(state) => self.on_radio_state(state),
            Event::StatusReport(snapshot) => self.on_status(snapshot),
            Event::ProbeExpired => self.on_probe_expired(),
            Event::DiscoveryTimeout { generation } => self.on_discovery_timeout(generation),
            Event::StatusTimeout { generation } => self.on_status_timeout(generation),
            Event::Shutdown => return false,
        }
        true
    }

    // ========== startup ==========

    /// Run discovery briefly so the platform raises its radio permission
    /// prompt exactly once, then tear the probe down whatever happened.
    fn begin_permission_probe(&mut self) {
        debug!("starting radio permission probe");
        self.state = JobState::Probing;
        self.search_printer();
        self.start_discovery();

        let grace = self.configuration.probe_grace;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = tx.send(Event::ProbeExpired);
        });
    }

    fn on_probe_expired(&mut self) {
        debug!("permission probe finished");
        self.cleanup();
        self.setup_printer();
    }

    /// Create the device handle and register for its asynchronous status
    /// reports.
    fn setup_printer(&mut self) {
        let mut port = self.platform.open_port(&self.configuration);
        let tx = self.tx.clone();
        port.set_status_listener(Box::new(move |snapshot| {
            let _ = tx.send(Event::StatusReport(snapshot));
        }));
        self.port = Some(port);
        self.state = JobState::Idle;
        debug!(
            series = self.configuration.series.name(),
            "printer handle ready"
        );
    }

    // ========== public operations ==========

    fn set_template(&mut self, templates: &[Template]) -> Result<(), ReciboError> {
        let Some(port) = self.port.as_deref_mut() else {
            return Err(ReciboError::Setup("Printer not found".into()));
        };
        let full_text = render::render(port, templates)?;
        debug!(%full_text, "template buffered");
        Ok(())
    }

    fn print(&mut self) -> Result<(), ReciboError> {
        if self.state.job_in_flight() {
            return Err(ReciboError::Busy);
        }
        if self.port.is_none() {
            self.notify_error("Printer not found");
            return Ok(());
        }
        let code = match self.port.as_deref_mut() {
            Some(port) => {
                let code = port.add_cut(CutKind::Feed);
                if !code.is_success() {
                    port.clear_command_buffer();
                }
                code
            }
            None => return Ok(()),
        };
        if !code.is_success() {
            let message = self.command_message("add_cut", code, "");
            self.notify_error(&message);
            return Ok(());
        }

        self.generation += 1;
        self.state = JobState::Discovering;
        self.search_printer();
        Ok(())
    }

    // ========== discovery ==========

    /// Create fresh discovery/radio handles and arm the not-found timer.
    /// Discovery itself starts when the radio reports powered-on.
    fn search_printer(&mut self) {
        debug!("searching for printer");
        self.device_found = false;
        self.discovery = Some(self.platform.discovery());

        let mut radio = self.platform.radio();
        let tx = self.tx.clone();
        radio.subscribe(Box::new(move |state| {
            let _ = tx.send(Event::RadioState(state));
        }));
        self.radio = Some(radio);

        let generation = self.generation;
        let timeout = self.configuration.discovery_timeout;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(Event::DiscoveryTimeout { generation });
        });
    }

    fn start_discovery(&mut self) {
        if let Some(discovery) = self.discovery.as_mut() {
            let tx = self.tx.clone();
            let code = discovery.start(
                DeviceFilter::printers(),
                Box::new(move |info| {
                    let _ = tx.send(Event::DeviceFound(info));
                }),
            );
            if !code.is_success() {
                warn!(code = %code, "discovery start failed");
            }
        }
    }

    fn on_radio_state(&mut self, state: RadioState) {
        debug!(?state, "radio state reported");
        match state {
            RadioState::PoweredOn => self.start_discovery(),
            _ if self.state.job_in_flight() => self.notify_error(ERR_RADIO_OFF),
            _ => warn!(?state, "radio not usable; no job in flight"),
        }
    }

    fn on_discovery(&mut self, info: DeviceInfo) {
        debug!(target = %info.target, name = %info.device_name, "device discovered");
        if self.state != JobState::Discovering || self.port.is_none() {
            debug!("no job awaiting discovery; ignoring");
            return;
        }
        if let Some(discovery) = self.discovery.as_mut() {
            discovery.stop();
        }

        self.state = JobState::Connecting;
        let code = match self.port.as_deref_mut() {
            Some(port) => port.connect(&info.target),
            None => return,
        };
        if !code.is_success() {
            let message = self.command_message("connect", code, "");
            self.notify_error(&message);
            return;
        }

        self.state = JobState::Connected;
        self.device_found = true;
        debug!("connected; transmitting buffered data");
        self.transmit();
    }

    fn on_discovery_timeout(&mut self, generation: u64) {
        if generation != self.generation || self.device_found {
            return;
        }
        self.notify_error(ERR_NOT_DISCOVERABLE);
    }

    // ========== transmission & status ==========

    fn transmit(&mut self) {
        self.state = JobState::Transmitting;
        let code = match self.port.as_deref_mut() {
            Some(port) => port.send_data(),
            None => return,
        };
        if !code.is_success() {
            let message = self.command_message("send_data", code, "");
            self.notify_error(&message);
            return;
        }

        self.state = JobState::AwaitingStatus;
        let generation = self.generation;
        let timeout = self.configuration.status_timeout;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(Event::StatusTimeout { generation });
        });
    }

    fn on_status(&mut self, snapshot: StatusSnapshot) {
        if !matches!(
            self.state,
            JobState::Transmitting | JobState::AwaitingStatus
        ) {
            debug!("status report with no job awaiting it; ignoring");
            return;
        }
        let message = status::make_error_message(&snapshot, self.strings.as_ref());
        if message.is_empty() {
            self.notify_ok();
        } else {
            self.notify_error(&message);
        }
    }

    fn on_status_timeout(&mut self, generation: u64) {
        if generation != self.generation || self.state != JobState::AwaitingStatus {
            return;
        }
        self.notify_error(ERR_NO_STATUS);
    }

    // ========== outcome & teardown ==========

    fn command_message(&self, method: &str, code: ResultCode, reason: &str) -> String {
        format!(
            "{} {} {} {}\n",
            method,
            self.strings.lookup("methoderr_errcode"),
            code.symbol(),
            reason
        )
    }

    fn notify_ok(&mut self) {
        debug!("print reported success");
        self.delegate.on_success_printed();
        self.cleanup();
    }

    fn notify_error(&mut self, message: &str) {
        error!(%message, "print job failed");
        self.delegate.on_error(message);
        self.cleanup();
    }

    /// The single teardown path, shared by success and every failure.
    /// Safe to run when already torn down; never notifies the delegate.
    fn cleanup(&mut self) {
        debug!("cleaning up discovery and transport handles");
        if let Some(discovery) = self.discovery.as_mut() {
            discovery.stop();
        }
        if let Some(port) = self.port.as_deref_mut() {
            if port.is_connected() {
                let code = port.disconnect();
                if !code.is_success() {
                    warn!(code = %code, "disconnect failed");
                }
            }
            port.clear_command_buffer();
        }
        self.discovery = None;
        self.radio = None;
        self.device_found = false;
        // Invalidate armed timers so a stale timeout cannot fail a later job.
        self.generation += 1;
        if self.port.is_some() {
            self.state = JobState::CleanedUp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::status::{PaperStatus, StatusSnapshot};
    use crate::device::{DiscoveryListener, RadioListener, StatusListener};
    use crate::protocol::Alignment;
    use crate::template::TextFont;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::timeout;

    // ========== test doubles ==========

    #[derive(Default)]
    struct PortState {
        ops: Vec<String>,
        connected: bool,
        cleared: usize,
        fail_cut: Option<ResultCode>,
        fail_connect: Option<ResultCode>,
        fail_send: Option<ResultCode>,
        /// Snapshot the device reports after a successful transmission;
        /// `None` simulates a device that never reports status.
        status_reply: Option<StatusSnapshot>,
        listener: Option<StatusListener>,
    }

    struct MockPort(Arc<Mutex<PortState>>);

    impl MockPort {
        fn log(&self, op: impl Into<String>) -> ResultCode {
            self.0.lock().unwrap().ops.push(op.into());
            ResultCode::Success
        }
    }

    impl PrinterPort for MockPort {
        fn add_text_align(&mut self, _alignment: Alignment) -> ResultCode {
            self.log("align")
        }
        fn add_text_size(&mut self, width: u8, height: u8) -> ResultCode {
            self.log(format!("size:{width}x{height}"))
        }
        fn add_text_font(&mut self, _font: TextFont) -> ResultCode {
            self.log("font")
        }
        fn add_text(&mut self, text: &str) -> ResultCode {
            self.log(format!("text:{text}"))
        }
        fn add_feed_line(&mut self, lines: u8) -> ResultCode {
            self.log(format!("feed:{lines}"))
        }
        fn add_cut(&mut self, _cut: CutKind) -> ResultCode {
            let mut state = self.0.lock().unwrap();
            state.ops.push("cut".into());
            state.fail_cut.unwrap_or(ResultCode::Success)
        }
        fn clear_command_buffer(&mut self) {
            self.0.lock().unwrap().cleared += 1;
        }
        fn connect(&mut self, target: &str) -> ResultCode {
            let mut state = self.0.lock().unwrap();
            state.ops.push(format!("connect:{target}"));
            if let Some(code) = state.fail_connect {
                return code;
            }
            state.connected = true;
            ResultCode::Success
        }
        fn disconnect(&mut self) -> ResultCode {
            let mut state = self.0.lock().unwrap();
            state.ops.push("disconnect".into());
            state.connected = false;
            ResultCode::Success
        }
        fn send_data(&mut self) -> ResultCode {
            let mut guard = self.0.lock().unwrap();
            let state = &mut *guard;
            state.ops.push("send_data".into());
            if let Some(code) = state.fail_send {
                return code;
            }
            if let (Some(listener), Some(reply)) = (state.listener.as_ref(), &state.status_reply) {
                listener(reply.clone());
            }
            ResultCode::Success
        }
        fn is_connected(&self) -> bool {
            self.0.lock().unwrap().connected
        }
        fn set_status_listener(&mut self, listener: StatusListener) {
            self.0.lock().unwrap().listener = Some(listener);
        }
    }

    struct MockDiscovery {
        target: Option<String>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Discovery for MockDiscovery {
        fn start(&mut self, _filter: DeviceFilter, listener: DiscoveryListener) -> ResultCode {
            self.log.lock().unwrap().push("discovery_start".into());
            if let Some(target) = &self.target {
                listener(DeviceInfo {
                    device_name: "TM-m30II".into(),
                    target: target.clone(),
                });
            }
            ResultCode::Success
        }
        fn stop(&mut self) {
            self.log.lock().unwrap().push("discovery_stop".into());
        }
    }

    struct MockRadio {
        state: Option<RadioState>,
    }

    impl RadioMonitor for MockRadio {
        fn subscribe(&mut self, listener: RadioListener) {
            if let Some(state) = self.state {
                listener(state);
            }
        }
    }

    #[derive(Clone)]
    struct MockPlatform {
        port: Arc<Mutex<PortState>>,
        discovery_target: Option<String>,
        radio_state: Option<RadioState>,
        discovery_log: Arc<Mutex<Vec<String>>>,
    }

    impl MockPlatform {
        fn new() -> Self {
            Self {
                port: Arc::new(Mutex::new(PortState {
                    status_reply: Some(StatusSnapshot::default()),
                    ..PortState::default()
                })),
                discovery_target: Some("BT:00:11:22:33:44:55".into()),
                radio_state: Some(RadioState::PoweredOn),
                discovery_log: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl Platform for MockPlatform {
        fn open_port(&self, _configuration: &Configuration) -> Box<dyn PrinterPort> {
            Box::new(MockPort(self.port.clone()))
        }
        fn discovery(&self) -> Box<dyn Discovery> {
            Box::new(MockDiscovery {
                target: self.discovery_target.clone(),
                log: self.discovery_log.clone(),
            })
        }
        fn radio(&self) -> Box<dyn RadioMonitor> {
            Box::new(MockRadio {
                state: self.radio_state,
            })
        }
    }

    #[derive(Debug, PartialEq)]
    enum Outcome {
        Error(String),
        Success,
    }

    struct ChannelDelegate(mpsc::UnboundedSender<Outcome>);

    impl PrinterEventDelegate for ChannelDelegate {
        fn on_error(&self, message: &str) {
            let _ = self.0.send(Outcome::Error(message.into()));
        }
        fn on_success_printed(&self) {
            let _ = self.0.send(Outcome::Success);
        }
    }

    // ========== helpers ==========

    fn fast_config() -> Configuration {
        Configuration {
            probe_grace: Duration::from_millis(10),
            discovery_timeout: Duration::from_millis(200),
            status_timeout: Duration::from_millis(200),
            ..Configuration::m30ii()
        }
    }

    fn build(
        platform: MockPlatform,
        configuration: Configuration,
    ) -> (Printer, mpsc::UnboundedReceiver<Outcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let printer = Printer::new(
            configuration,
            Box::new(platform),
            Arc::new(ChannelDelegate(tx)),
        );
        (printer, rx)
    }

    async fn settle_probe() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<Outcome>) -> Outcome {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no delegate callback arrived")
            .expect("delegate channel closed")
    }

    async fn assert_no_more_outcomes(rx: &mut mpsc::UnboundedReceiver<Outcome>) {
        let extra = timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(extra.is_err(), "unexpected extra callback: {extra:?}");
    }

    fn receipt() -> Vec<Template> {
        vec![
            Template::text("Chicken Stop"),
            Template::two_sided("Payment Method:", "Visa", 24),
        ]
    }

    // ========== tests ==========

    #[tokio::test]
    async fn test_set_template_before_probe_settles_is_setup_error() {
        let platform = MockPlatform::new();
        let port = platform.port.clone();
        let configuration = Configuration {
            probe_grace: Duration::from_millis(500),
            ..fast_config()
        };
        let (printer, _rx) = build(platform, configuration);

        let err = printer.set_template(receipt()).await.unwrap_err();
        assert!(matches!(err, ReciboError::Setup(_)));
        assert!(port.lock().unwrap().ops.is_empty());
    }

    #[tokio::test]
    async fn test_successful_job_fires_success_exactly_once() {
        let platform = MockPlatform::new();
        let port = platform.port.clone();
        let (printer, mut rx) = build(platform, fast_config());
        settle_probe().await;

        printer.set_template(receipt()).await.unwrap();
        printer.print().await.unwrap();

        assert_eq!(next_outcome(&mut rx).await, Outcome::Success);
        assert_no_more_outcomes(&mut rx).await;

        let ops = port.lock().unwrap().ops.clone();
        let cut = ops.iter().position(|op| op == "cut").unwrap();
        let connect = ops
            .iter()
            .position(|op| op.starts_with("connect:BT:"))
            .unwrap();
        let send = ops.iter().position(|op| op == "send_data").unwrap();
        let disconnect = ops.iter().position(|op| op == "disconnect").unwrap();
        assert!(cut < connect && connect < send && send < disconnect);
    }

    #[tokio::test]
    async fn test_discovery_timeout_reports_not_discoverable() {
        let platform = MockPlatform {
            discovery_target: None,
            ..MockPlatform::new()
        };
        let (printer, mut rx) = build(platform, fast_config());
        settle_probe().await;

        printer.set_template(receipt()).await.unwrap();
        printer.print().await.unwrap();

        match next_outcome(&mut rx).await {
            Outcome::Error(message) => assert!(message.contains("Unable to discover")),
            other => panic!("expected discovery failure, got {other:?}"),
        }
        assert_no_more_outcomes(&mut rx).await;
    }

    #[tokio::test]
    async fn test_connect_failure_is_terminal_and_swallows_stale_timeout() {
        let platform = MockPlatform::new();
        platform.port.lock().unwrap().fail_connect = Some(ResultCode::ErrConnect);
        let (printer, mut rx) = build(platform, fast_config());
        settle_probe().await;

        printer.set_template(receipt()).await.unwrap();
        printer.print().await.unwrap();

        match next_outcome(&mut rx).await {
            Outcome::Error(message) => {
                assert!(message.contains("connect"));
                assert!(message.contains("ERR_CONNECT"));
            }
            other => panic!("expected connect failure, got {other:?}"),
        }
        // The armed discovery timer must not fire a second callback for
        // the already-failed job.
        assert_no_more_outcomes(&mut rx).await;
    }

    #[tokio::test]
    async fn test_send_failure_reports_command_error() {
        let platform = MockPlatform::new();
        platform.port.lock().unwrap().fail_send = Some(ResultCode::ErrFailure);
        let (printer, mut rx) = build(platform, fast_config());
        settle_probe().await;

        printer.set_template(receipt()).await.unwrap();
        printer.print().await.unwrap();

        match next_outcome(&mut rx).await {
            Outcome::Error(message) => {
                assert!(message.contains("send_data"));
                assert!(message.contains("ERR_FAILURE"));
            }
            other => panic!("expected transmission failure, got {other:?}"),
        }
        assert_no_more_outcomes(&mut rx).await;
    }

    #[tokio::test]
    async fn test_unhealthy_status_fails_the_job() {
        let platform = MockPlatform::new();
        platform.port.lock().unwrap().status_reply = Some(StatusSnapshot {
            cover_open: true,
            paper: PaperStatus::Empty,
            ..Default::default()
        });
        let (printer, mut rx) = build(platform, fast_config());
        settle_probe().await;

        printer.set_template(receipt()).await.unwrap();
        printer.print().await.unwrap();

        match next_outcome(&mut rx).await {
            Outcome::Error(message) => {
                assert!(message.contains("cover"));
                assert!(message.contains("Roll paper is empty"));
            }
            other => panic!("expected status failure, got {other:?}"),
        }
        assert_no_more_outcomes(&mut rx).await;
    }

    #[tokio::test]
    async fn test_silent_device_hits_status_timeout() {
        let platform = MockPlatform::new();
        platform.port.lock().unwrap().status_reply = None;
        let (printer, mut rx) = build(platform, fast_config());
        settle_probe().await;

        printer.set_template(receipt()).await.unwrap();
        printer.print().await.unwrap();

        match next_outcome(&mut rx).await {
            Outcome::Error(message) => assert!(message.contains("never reported print status")),
            other => panic!("expected status timeout, got {other:?}"),
        }
        assert_no_more_outcomes(&mut rx).await;
    }

    #[tokio::test]
    async fn test_radio_off_fails_the_job() {
        let platform = MockPlatform {
            radio_state: Some(RadioState::PoweredOff),
            ..MockPlatform::new()
        };
        let (printer, mut rx) = build(platform, fast_config());
        settle_probe().await;

        printer.set_template(receipt()).await.unwrap();
        printer.print().await.unwrap();

        match next_outcome(&mut rx).await {
            Outcome::Error(message) => assert!(message.contains("Bluetooth")),
            other => panic!("expected radio failure, got {other:?}"),
        }
        assert_no_more_outcomes(&mut rx).await;
    }

    #[tokio::test]
    async fn test_second_print_while_job_in_flight_is_busy() {
        let platform = MockPlatform {
            discovery_target: None,
            ..MockPlatform::new()
        };
        let configuration = Configuration {
            discovery_timeout: Duration::from_secs(5),
            ..fast_config()
        };
        let (printer, _rx) = build(platform, configuration);
        settle_probe().await;

        printer.set_template(receipt()).await.unwrap();
        printer.print().await.unwrap();

        let err = printer.print().await.unwrap_err();
        assert!(matches!(err, ReciboError::Busy));
    }

    #[tokio::test]
    async fn test_print_before_probe_settles_notifies_delegate() {
        let platform = MockPlatform::new();
        let configuration = Configuration {
            probe_grace: Duration::from_millis(500),
            ..fast_config()
        };
        let (printer, mut rx) = build(platform, configuration);

        printer.print().await.unwrap();

        match next_outcome(&mut rx).await {
            Outcome::Error(message) => assert!(message.contains("Printer not found")),
            other => panic!("expected setup failure, got {other:?}"),
        }
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let platform = MockPlatform::new();
        let port = platform.port.clone();
        let (delegate_tx, mut delegate_rx) = mpsc::unbounded_channel();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut runner = Runner {
            configuration: fast_config(),
            platform: Box::new(platform),
            delegate: Arc::new(ChannelDelegate(delegate_tx)),
            strings: Arc::new(EnglishStrings),
            tx,
            port: None,
            discovery: None,
            radio: None,
            state: JobState::Probing,
            device_found: false,
            generation: 0,
        };
        runner.setup_printer();

        runner.cleanup();
        runner.cleanup();

        assert_eq!(runner.state, JobState::CleanedUp);
        assert!(runner.discovery.is_none());
        assert!(runner.radio.is_none());
        assert_eq!(port.lock().unwrap().cleared, 2);
        assert!(delegate_rx.try_recv().is_err(), "cleanup must not notify");
    }
}
