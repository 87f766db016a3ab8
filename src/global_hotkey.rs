//! Global hotkey listener.
//!
//! [`HotkeyListener`] owns a background thread that registers OS-level hooks
//! for every key in the fixed bindable set (plus the pause and emergency-stop
//! control combos) and dispatches matching key presses to the click executor.
//! The listener is an explicit state object: `stopped` -> `running` ->
//! `stopped`, with idempotent `start`/`stop`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use global_hotkey::hotkey::{HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::clicker::{ActionExecutor, ClickExecutor, ACTION_PAUSE};
use crate::config::{CharSettings, ClickAction, Config};
use crate::error::{HotclickError, Result};
use crate::keys::HotkeyKey;

/// Control combo that toggles the paused state while the listener runs.
pub const PAUSE_HOTKEY: &str = "ctrl+alt+r";

/// Control combo that requests an emergency shutdown of the whole process.
pub const EMERGENCY_STOP_HOTKEY: &str = "ctrl+shift+x";

/// Minimum spacing between two dispatches of the same hotkey; absorbs OS
/// key-repeat storms.
const HOTKEY_COOLDOWN: Duration = Duration::from_millis(10);

/// Poll interval of the event loop.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long `start()` waits for the worker thread to finish registering.
const START_TIMEOUT: Duration = Duration::from_secs(5);

/// Listens for global hotkeys and runs the bound click sequences.
///
/// The configuration lives behind an `Arc<RwLock<_>>` shared with the worker
/// thread; swapping it through [`HotkeyListener::config_handle`] is observed
/// by the next key event.
pub struct HotkeyListener {
    config: Arc<RwLock<Config>>,
    paused: Arc<AtomicBool>,
    executions: Arc<AtomicU64>,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    worker: Option<Worker>,
}

struct Worker {
    shutdown: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

/// State shared between the listener handle and its worker thread.
struct ListenerShared {
    config: Arc<RwLock<Config>>,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    executions: Arc<AtomicU64>,
    stop_tx: watch::Sender<bool>,
}

impl HotkeyListener {
    pub fn new(config: Config) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            config: Arc::new(RwLock::new(config)),
            paused: Arc::new(AtomicBool::new(false)),
            executions: Arc::new(AtomicU64::new(0)),
            stop_tx,
            stop_rx,
            worker: None,
        }
    }

    /// Handle to the shared configuration. Writing through it while the
    /// listener runs is the reload path: the next key event reads the new
    /// bindings.
    pub fn config_handle(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    /// Receiver that flips to `true` when the emergency-stop combo fires.
    pub fn stop_receiver(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
        info!("actions {}", if paused { "paused" } else { "resumed" });
    }

    /// Total number of hotkey dispatches since the listener was created.
    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::Relaxed)
    }

    /// Spawn the worker thread and register all hooks.
    ///
    /// Calling `start` on a running listener logs a warning and is a no-op,
    /// so hooks are never registered twice.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            warn!("hotkey listener is already running");
            return Ok(());
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let shared = ListenerShared {
            config: Arc::clone(&self.config),
            paused: Arc::clone(&self.paused),
            shutdown: Arc::clone(&shutdown),
            executions: Arc::clone(&self.executions),
            stop_tx: self.stop_tx.clone(),
        };

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let handle = thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || listener_loop(shared, ready_tx))?;

        match ready_rx.recv_timeout(START_TIMEOUT) {
            Ok(Ok(())) => {
                self.worker = Some(Worker { shutdown, handle });
                info!("hotkey listener started");
                Ok(())
            }
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                shutdown.store(true, Ordering::Relaxed);
                let _ = handle.join();
                Err(HotclickError::hotkey(
                    "timed out waiting for the listener thread to start",
                ))
            }
        }
    }

    /// Unregister all hooks and join the worker thread.
    ///
    /// Stopping a stopped listener is a no-op.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            warn!("hotkey listener is not running");
            return;
        };

        worker.shutdown.store(true, Ordering::Relaxed);
        if worker.handle.join().is_err() {
            error!("hotkey listener thread panicked during shutdown");
        } else {
            info!("hotkey listener stopped");
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

/// Hooks registered by the worker, keyed for event lookup.
struct Registration {
    bindings: HashMap<u32, HotkeyKey>,
    hotkeys: Vec<HotKey>,
    pause_id: u32,
    stop_id: u32,
}

fn register_hooks(manager: &GlobalHotKeyManager) -> Result<Registration> {
    let mut registration = Registration {
        bindings: HashMap::new(),
        hotkeys: Vec::new(),
        pause_id: 0,
        stop_id: 0,
    };

    let outcome = (|| -> Result<()> {
        for key in HotkeyKey::ALL {
            let hotkey = HotKey::new(None, key.code());
            manager.register(hotkey).map_err(|e| {
                HotclickError::hotkey(format!("failed to register hotkey '{key}': {e}"))
            })?;
            registration.bindings.insert(hotkey.id(), key);
            registration.hotkeys.push(hotkey);
        }

        let pause = parse_hotkey(PAUSE_HOTKEY)?;
        manager.register(pause).map_err(|e| {
            HotclickError::hotkey(format!("failed to register pause hotkey: {e}"))
        })?;
        registration.pause_id = pause.id();
        registration.hotkeys.push(pause);

        let stop = parse_hotkey(EMERGENCY_STOP_HOTKEY)?;
        manager.register(stop).map_err(|e| {
            HotclickError::hotkey(format!("failed to register emergency stop hotkey: {e}"))
        })?;
        registration.stop_id = stop.id();
        registration.hotkeys.push(stop);

        Ok(())
    })();

    match outcome {
        Ok(()) => Ok(registration),
        Err(err) => {
            unregister_hooks(manager, &registration.hotkeys);
            Err(err)
        }
    }
}

fn unregister_hooks(manager: &GlobalHotKeyManager, hotkeys: &[HotKey]) {
    for hotkey in hotkeys {
        if let Err(e) = manager.unregister(*hotkey) {
            warn!("failed to unregister hotkey: {e}");
        }
    }
}

/// Body of the worker thread: register hooks, report readiness, then poll
/// the global event channel until shutdown.
fn listener_loop(shared: ListenerShared, ready_tx: mpsc::SyncSender<Result<()>>) {
    let manager = match GlobalHotKeyManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            let _ = ready_tx.send(Err(HotclickError::hotkey(format!(
                "failed to create hotkey manager: {e}"
            ))));
            return;
        }
    };

    let registration = match register_hooks(&manager) {
        Ok(registration) => registration,
        Err(err) => {
            let _ = ready_tx.send(Err(err));
            return;
        }
    };

    let mut executor = match ClickExecutor::new() {
        Ok(executor) => executor,
        Err(err) => {
            unregister_hooks(&manager, &registration.hotkeys);
            let _ = ready_tx.send(Err(err));
            return;
        }
    };

    let receiver = GlobalHotKeyEvent::receiver();
    // Drop events queued before this run of the listener.
    while receiver.try_recv().is_ok() {}
    let _ = ready_tx.send(Ok(()));

    let mut last_fired: HashMap<HotkeyKey, Instant> = HashMap::new();

    while !shared.shutdown.load(Ordering::Relaxed) {
        while let Ok(event) = receiver.try_recv() {
            if event.state != HotKeyState::Pressed {
                continue;
            }

            if event.id == registration.pause_id {
                let was_paused = shared.paused.fetch_xor(true, Ordering::Relaxed);
                info!("actions {}", if was_paused { "resumed" } else { "paused" });
                continue;
            }
            if event.id == registration.stop_id {
                warn!("emergency stop hotkey pressed");
                let _ = shared.stop_tx.send(true);
                continue;
            }

            let Some(&key) = registration.bindings.get(&event.id) else {
                continue;
            };
            if shared.paused.load(Ordering::Relaxed) {
                debug!(%key, "skipping hotkey, actions are paused");
                continue;
            }
            if let Some(last) = last_fired.get(&key) {
                if last.elapsed() < HOTKEY_COOLDOWN {
                    debug!(%key, "skipping hotkey, cooldown active");
                    continue;
                }
            }
            last_fired.insert(key, Instant::now());

            // Snapshot the binding so the lock is not held while clicking.
            let (actions, chars) = match shared.config.read() {
                Ok(config) => (
                    config.hotkeys.get(&key).cloned().unwrap_or_default(),
                    config.char_settings.clone(),
                ),
                Err(_) => {
                    error!("configuration lock poisoned, dropping event");
                    continue;
                }
            };
            if actions.is_empty() {
                debug!(%key, "no actions bound");
                continue;
            }

            shared.executions.fetch_add(1, Ordering::Relaxed);
            info!(%key, actions = actions.len(), "executing hotkey binding");
            run_binding(key, &actions, &chars, &mut executor);
        }

        thread::sleep(POLL_INTERVAL);
    }

    unregister_hooks(&manager, &registration.hotkeys);
}

/// Run one hotkey's actions strictly in list order.
///
/// A failsafe abort cancels the remaining actions of the binding; any other
/// execution error is logged and that action is skipped. An action whose
/// char slot is absent or empty is disabled and skipped. Returns the number
/// of actions executed.
pub(crate) fn run_binding(
    key: HotkeyKey,
    actions: &[ClickAction],
    chars: &CharSettings,
    executor: &mut dyn ActionExecutor,
) -> usize {
    let mut executed = 0;

    for (index, action) in actions.iter().enumerate() {
        let text = chars.get(&action.char).map(String::as_str).unwrap_or("");
        if text.is_empty() {
            debug!(%key, index, char = %action.char, "skipping action, char slot is empty");
            continue;
        }

        if executed > 0 {
            thread::sleep(ACTION_PAUSE);
        }

        match executor.execute(action, text) {
            Ok(()) => executed += 1,
            Err(HotclickError::FailsafeTriggered { x, y }) => {
                warn!(%key, index, x, y, "failsafe triggered, aborting remaining actions");
                break;
            }
            Err(err) => {
                error!(%key, index, %err, "action failed, skipping");
            }
        }
    }

    executed
}

/// Parse a `"ctrl+shift+x"` style combo into a registrable hotkey.
fn parse_hotkey(combo: &str) -> Result<HotKey> {
    let lowered = combo.to_lowercase();
    let parts: Vec<&str> = lowered.split('+').map(|s| s.trim()).collect();

    let mut modifiers = Modifiers::empty();
    let mut code = None;

    for part in &parts {
        match *part {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "meta" | "cmd" | "super" => modifiers |= Modifiers::SUPER,
            key => {
                if code.is_some() {
                    return Err(HotclickError::invalid_key(
                        combo,
                        "more than one non-modifier key",
                    ));
                }
                code = Some(parse_key_code(key)?);
            }
        }
    }

    let code = code
        .ok_or_else(|| HotclickError::invalid_key(combo, "no non-modifier key in combo"))?;

    Ok(HotKey::new(Some(modifiers), code))
}

fn parse_key_code(key: &str) -> Result<global_hotkey::hotkey::Code> {
    use global_hotkey::hotkey::Code;

    // Keys from the bindable set parse through their canonical names.
    if let Ok(bindable) = key.parse::<HotkeyKey>() {
        return Ok(bindable.code());
    }

    let code = match key {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        _ => return Err(HotclickError::invalid_key(key, "unsupported key")),
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MouseButton;

    #[derive(Default)]
    struct MockExecutor {
        executed: Vec<(i32, i32, String)>,
        attempts: usize,
        failsafe_at: Option<usize>,
        fail_at: Option<usize>,
    }

    impl ActionExecutor for MockExecutor {
        fn execute(&mut self, action: &ClickAction, text: &str) -> Result<()> {
            let index = self.attempts;
            self.attempts += 1;
            if self.failsafe_at == Some(index) {
                return Err(HotclickError::FailsafeTriggered {
                    x: action.x,
                    y: action.y,
                });
            }
            if self.fail_at == Some(index) {
                return Err(HotclickError::click_failed(action.x, action.y, "boom"));
            }
            self.executed.push((action.x, action.y, text.to_string()));
            Ok(())
        }
    }

    fn action(x: i32, y: i32, char_ref: &str) -> ClickAction {
        ClickAction {
            x,
            y,
            button: MouseButton::Left,
            repeat: 1,
            char: char_ref.to_string(),
        }
    }

    fn chars() -> CharSettings {
        let mut chars = CharSettings::new();
        chars.insert("char1".to_string(), "alpha".to_string());
        chars.insert("char2".to_string(), "bravo".to_string());
        chars.insert("char5".to_string(), String::new());
        chars
    }

    #[test]
    fn test_actions_run_in_list_order() {
        let actions = vec![action(1, 1, "char1"), action(2, 2, "char2")];
        let mut executor = MockExecutor::default();

        let executed = run_binding(HotkeyKey::F1, &actions, &chars(), &mut executor);

        assert_eq!(executed, 2);
        assert_eq!(
            executor.executed,
            vec![
                (1, 1, "alpha".to_string()),
                (2, 2, "bravo".to_string()),
            ]
        );
    }

    #[test]
    fn test_failsafe_aborts_remaining_actions() {
        let actions = vec![
            action(1, 1, "char1"),
            action(2, 2, "char1"),
            action(3, 3, "char1"),
        ];
        let mut executor = MockExecutor {
            failsafe_at: Some(1),
            ..Default::default()
        };

        let executed = run_binding(HotkeyKey::F2, &actions, &chars(), &mut executor);

        assert_eq!(executed, 1);
        assert_eq!(executor.executed, vec![(1, 1, "alpha".to_string())]);
        // The third action must never have been attempted.
        assert_eq!(executor.attempts, 2);
    }

    #[test]
    fn test_failed_action_is_skipped_not_fatal() {
        let actions = vec![action(1, 1, "char1"), action(2, 2, "char2")];
        let mut executor = MockExecutor {
            fail_at: Some(0),
            ..Default::default()
        };

        let executed = run_binding(HotkeyKey::F3, &actions, &chars(), &mut executor);

        assert_eq!(executed, 1);
        assert_eq!(executor.executed, vec![(2, 2, "bravo".to_string())]);
        assert_eq!(executor.attempts, 2);
    }

    #[test]
    fn test_empty_or_missing_char_slot_skips_action() {
        let actions = vec![
            action(1, 1, "char5"),   // empty payload
            action(2, 2, "nochar"),  // no such slot
            action(3, 3, "char1"),
        ];
        let mut executor = MockExecutor::default();

        let executed = run_binding(HotkeyKey::Digit0, &actions, &chars(), &mut executor);

        assert_eq!(executed, 1);
        assert_eq!(executor.executed, vec![(3, 3, "alpha".to_string())]);
        assert_eq!(executor.attempts, 1);
    }

    #[test]
    fn test_parse_hotkey_combos() {
        assert!(parse_hotkey(PAUSE_HOTKEY).is_ok());
        assert!(parse_hotkey(EMERGENCY_STOP_HOTKEY).is_ok());
        assert!(parse_hotkey("Ctrl+Shift+Q").is_ok());
        assert!(parse_hotkey("f1").is_ok());

        assert!(parse_hotkey("").is_err());
        assert!(parse_hotkey("ctrl").is_err());
        assert!(parse_hotkey("ctrl+x+y").is_err());
        assert!(parse_hotkey("ctrl+kp_enter").is_err());
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut listener = HotkeyListener::new(Config::default());
        assert!(!listener.is_running());
        listener.stop();
        listener.stop();
        assert!(!listener.is_running());
    }

    #[test]
    fn test_pause_flag() {
        let listener = HotkeyListener::new(Config::default());
        assert!(!listener.is_paused());
        listener.set_paused(true);
        assert!(listener.is_paused());
        listener.set_paused(false);
        assert!(!listener.is_paused());
    }

    #[test]
    fn test_fresh_listener_state() {
        let listener = HotkeyListener::new(Config::default());
        assert_eq!(listener.executions(), 0);
        assert!(!*listener.stop_receiver().borrow());
    }
}
