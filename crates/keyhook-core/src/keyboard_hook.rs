use crate::config::{BindingSet, Profile};
use crate::engine::{HookContext, HOOK_CONTEXT};
use crate::history::HistoryEntry;
use crate::host::{Host, HookNotification, NotificationQueue};
use crate::types::{
    Disposition, InjectKind, KeyEdge, KeyboardEvent, MouseAction, MouseButton, MouseEvent, Sc,
    SyntheticEvent, ToggleState, Vk,
};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyState, MapVirtualKeyW, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, MAPVK_VK_TO_VSC, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetForegroundWindow, GetMessageW, GetWindowTextW,
    PeekMessageW, SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, HHOOK,
    KBDLLHOOKSTRUCT, LLKHF_EXTENDED, LLKHF_INJECTED, LLMHF_INJECTED, MSG, MSLLHOOKSTRUCT,
    PEEK_MESSAGE_REMOVE_TYPE, WH_KEYBOARD_LL, WH_MOUSE_LL, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP,
    WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_NCXBUTTONDOWN, WM_NCXBUTTONUP,
    WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
};

/// Magic number to identify our own injected events.
const INJECTED_EXTRA_INFO: usize = 0xFFC3C3C3;
const XBUTTON1: u16 = 0x0001;
/// Notifications beyond this many undrained ones are dropped.
const NOTIFICATION_CAPACITY: usize = 1024;

lazy_static::lazy_static! {
    static ref KEYBOARD_HOOK: Mutex<Option<HHOOK>> = Mutex::new(None);
    static ref MOUSE_HOOK: Mutex<Option<HHOOK>> = Mutex::new(None);
    static ref NOTIFICATIONS: NotificationQueue = NotificationQueue::new(NOTIFICATION_CAPACITY);
}

static FORWARD_HISTORY: AtomicBool = AtomicBool::new(false);

/// Receiving end for hotkey (and optionally history) notifications.
/// The queue is bounded; the hook never blocks on it and drops what does not fit.
pub fn notifications() -> Receiver<HookNotification> {
    NOTIFICATIONS.receiver()
}

pub fn set_history_forwarding(enabled: bool) {
    FORWARD_HISTORY.store(enabled, Ordering::Relaxed);
}

/// Host backed by the Win32 API. Injections are collected and sent only
/// after the context lock is released.
#[derive(Default)]
struct WinHost {
    pending: Vec<SyntheticEvent>,
}

impl Host for WinHost {
    fn inject(&mut self, event: SyntheticEvent) {
        self.pending.push(event);
    }

    fn is_toggled(&self, vk: Vk) -> bool {
        unsafe { GetKeyState(vk as i32) & 1 != 0 }
    }

    fn notify_hotkey(&mut self, id: u16, extra: bool) {
        NOTIFICATIONS.push(HookNotification::Hotkey { id, extra });
    }

    fn foreground_title(&self) -> String {
        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0 == 0 {
                return String::new();
            }
            let mut buf = [0u16; 256];
            let len = GetWindowTextW(hwnd, &mut buf).max(0) as usize;
            String::from_utf16_lossy(&buf[..len])
        }
    }

    fn scan_code_for(&self, vk: Vk) -> Sc {
        unsafe { MapVirtualKeyW(vk as u32, MAPVK_VK_TO_VSC) as Sc }
    }

    fn on_history(&mut self, entry: &HistoryEntry) {
        if FORWARD_HISTORY.load(Ordering::Relaxed) {
            NOTIFICATIONS.push(HookNotification::History(entry.clone()));
        }
    }
}

/// Compiles the bindings and installs the low-level hooks.
/// This must be called from a thread that pumps messages (GetMessage/PeekMessage).
pub fn install_hooks(profile: Profile, bindings: &BindingSet) -> anyhow::Result<()> {
    info!("Installing hooks...");
    let keys = bindings.compile()?;
    let want_mouse = profile.mouse_hook;
    *HOOK_CONTEXT.lock() = Some(HookContext::new(profile, keys));

    let keyboard = unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), HINSTANCE::default(), 0) }?;
    if keyboard.is_invalid() {
        return Err(anyhow::anyhow!("Failed to install keyboard hook"));
    }
    *KEYBOARD_HOOK.lock() = Some(keyboard);
    info!("Keyboard hook installed. Handle: {:?}", keyboard);

    if want_mouse {
        let mouse = unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_proc), HINSTANCE::default(), 0) }?;
        if mouse.is_invalid() {
            uninstall_hooks();
            return Err(anyhow::anyhow!("Failed to install mouse hook"));
        }
        *MOUSE_HOOK.lock() = Some(mouse);
        info!("Mouse hook installed. Handle: {:?}", mouse);
    }
    Ok(())
}

pub fn uninstall_hooks() {
    for (name, slot) in [("Keyboard", &*KEYBOARD_HOOK), ("Mouse", &*MOUSE_HOOK)] {
        if let Some(h) = slot.lock().take() {
            unsafe {
                let _ = UnhookWindowsHookEx(h);
            }
            info!("{} hook uninstalled.", name);
        }
    }
    if let Some(ctx) = HOOK_CONTEXT.lock().as_mut() {
        ctx.reset_runtime_state();
    }
}

/// Read-only access to the live context, for status displays.
pub fn with_context<R>(f: impl FnOnce(&HookContext) -> R) -> Option<R> {
    HOOK_CONTEXT.lock().as_ref().map(f)
}

/// Changes a lock key's forced state while the hook runs.
pub fn set_toggle_state(vk: Vk, state: ToggleState) -> bool {
    match with_context(|ctx| ctx.toggle_slot(vk)).flatten() {
        Some(slot) => {
            slot.set(state);
            true
        }
        None => false,
    }
}

/// Runs a blocking message loop.
/// This is a convenience helper for creating a hook thread.
pub fn run_event_loop() {
    info!("Starting message loop...");
    let mut msg = MSG::default();
    unsafe {
        // Force message queue creation
        let _ = PeekMessageW(&mut msg, None, 0, 0, PEEK_MESSAGE_REMOVE_TYPE(0));

        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
    info!("Message loop exited.");
}

unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code < 0 {
        return CallNextHookEx(None, code, wparam, lparam);
    }

    let kbd = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
    let msg = wparam.0 as u32;
    let event = KeyboardEvent {
        vk: kbd.vkCode as Vk,
        scan_code: kbd.scanCode as u16,
        extended: kbd.flags.0 & LLKHF_EXTENDED.0 != 0,
        edge: if msg == WM_KEYUP || msg == WM_SYSKEYUP { KeyEdge::Up } else { KeyEdge::Down },
        injected: kbd.flags.0 & LLKHF_INJECTED.0 != 0,
        self_generated: kbd.dwExtraInfo == INJECTED_EXTRA_INFO,
        time: kbd.time,
    };

    let mut host = WinHost::default();
    let disposition = match HOOK_CONTEXT.lock().as_mut() {
        Some(ctx) => ctx.on_keyboard(&event, &mut host),
        None => Disposition::Allow,
    };

    if disposition == Disposition::AllowWithModifierDisguise {
        let mut sc = (kbd.scanCode & 0xFF) as Sc;
        if event.extended {
            sc |= 0x100;
        }
        host.pending.extend(SyntheticEvent::disguised_release(event.vk, sc));
    }
    flush(&host.pending);

    match disposition {
        Disposition::Allow => CallNextHookEx(None, code, wparam, lparam),
        Disposition::Suppress | Disposition::AllowWithModifierDisguise => LRESULT(1),
    }
}

unsafe extern "system" fn mouse_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code < 0 {
        return CallNextHookEx(None, code, wparam, lparam);
    }

    let ms = &*(lparam.0 as *const MSLLHOOKSTRUCT);
    let high_word = (ms.mouseData >> 16) as u16;
    let xbutton = if high_word == XBUTTON1 { MouseButton::X1 } else { MouseButton::X2 };
    let action = match wparam.0 as u32 {
        WM_MOUSEMOVE => MouseAction::Move,
        WM_MOUSEWHEEL => MouseAction::Wheel(high_word as i16),
        WM_LBUTTONDOWN => MouseAction::Button(MouseButton::Left, KeyEdge::Down),
        WM_LBUTTONUP => MouseAction::Button(MouseButton::Left, KeyEdge::Up),
        WM_RBUTTONDOWN => MouseAction::Button(MouseButton::Right, KeyEdge::Down),
        WM_RBUTTONUP => MouseAction::Button(MouseButton::Right, KeyEdge::Up),
        WM_MBUTTONDOWN => MouseAction::Button(MouseButton::Middle, KeyEdge::Down),
        WM_MBUTTONUP => MouseAction::Button(MouseButton::Middle, KeyEdge::Up),
        WM_XBUTTONDOWN | WM_NCXBUTTONDOWN => MouseAction::Button(xbutton, KeyEdge::Down),
        WM_XBUTTONUP | WM_NCXBUTTONUP => MouseAction::Button(xbutton, KeyEdge::Up),
        _ => return CallNextHookEx(None, code, wparam, lparam),
    };
    let event = MouseEvent {
        action,
        injected: ms.flags & LLMHF_INJECTED != 0,
        self_generated: ms.dwExtraInfo == INJECTED_EXTRA_INFO,
        time: ms.time,
    };

    let mut host = WinHost::default();
    let disposition = match HOOK_CONTEXT.lock().as_mut() {
        Some(ctx) => ctx.on_mouse(&event, &mut host),
        None => Disposition::Allow,
    };
    flush(&host.pending);

    match disposition {
        Disposition::Allow => CallNextHookEx(None, code, wparam, lparam),
        _ => LRESULT(1),
    }
}

fn flush(events: &[SyntheticEvent]) {
    for event in events {
        match event.kind {
            InjectKind::Down => send_key(event.vk, event.sc, false),
            InjectKind::Up => send_key(event.vk, event.sc, true),
            InjectKind::DownAndUp => {
                send_key(event.vk, event.sc, false);
                send_key(event.vk, event.sc, true);
            }
        }
    }
}

/// Inject a key event tagged with our marker.
/// up: true for KeyUp, false for KeyDown.
fn send_key(vk: Vk, sc: Sc, up: bool) {
    let sc = if sc == 0 {
        unsafe { MapVirtualKeyW(vk as u32, MAPVK_VK_TO_VSC) as Sc }
    } else {
        sc
    };
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if sc & 0x100 != 0 {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    if up {
        flags |= KEYEVENTF_KEYUP;
    }

    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk as u16),
                wScan: sc & 0xFF,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: INJECTED_EXTRA_INFO,
            },
        },
    };

    unsafe {
        SendInput(&[input], std::mem::size_of::<INPUT>() as i32);
    }
}
