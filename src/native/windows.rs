//! Win32 backend
//!
//! Wraps an HWND owned by the host toolkit and creates the layered shadow
//! companion. [`MessageHook`] subclasses the frame (and the embedded child)
//! so every message goes through [`wndproc::dispatch`] before the host's own
//! window procedure sees it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Once;

use anyhow::{anyhow, Context};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, RECT, SIZE, WPARAM};
use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWA_TRANSITIONS_FORCEDISABLED};
use windows::Win32::Graphics::Gdi::{
    CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, GetMonitorInfoW,
    MonitorFromWindow, ReleaseDC, SelectObject, AC_SRC_ALPHA, AC_SRC_OVER, BITMAPINFO,
    BITMAPINFOHEADER, BI_RGB, BLENDFUNCTION, DIB_RGB_COLORS, MONITORINFO,
    MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::{GetDpiForWindow, GetSystemMetricsForDpi};
use windows::Win32::UI::Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass};
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::child::ChildMessage;
use crate::config::colors::rgba_to_bgra_u32;
use crate::controller::FramelessWindow;
use crate::geometry::{pixel_ratio_for_dpi, Rect};
use crate::native::wndproc::{self, DeferredEvents, Reply};
use crate::native::Placement;
use crate::shadow::paint::ShadowFrame;
use crate::state::ShowState;
use crate::traits::{ChildSurface, NativeWindow, PlacementSource, ShadowSurface};

const SHADOW_CLASS: PCWSTR = w!("FrameChromeShadow");

static REGISTER_SHADOW_CLASS: Once = Once::new();

fn hwnd_from(value: isize) -> HWND {
    HWND(value as *mut std::ffi::c_void)
}

fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn rect_from_win32(r: &RECT) -> Rect {
    Rect::new(r.left, r.top, r.right - r.left, r.bottom - r.top)
}

fn rect_to_win32(r: Rect) -> RECT {
    RECT {
        left: r.left(),
        top: r.top(),
        right: r.right(),
        bottom: r.bottom(),
    }
}

fn window_rect(hwnd: HWND) -> Option<Rect> {
    let mut rect = RECT::default();
    unsafe { GetWindowRect(hwnd, &mut rect).ok()? };
    Some(rect_from_win32(&rect))
}

// ============================================================================
// Main window
// ============================================================================

/// Top-level frameless window owned by the host toolkit
pub struct Win32Window {
    hwnd: isize,
    restore_rect: Option<Rect>,
}

impl Win32Window {
    pub fn from_hwnd(hwnd: isize) -> anyhow::Result<Self> {
        if hwnd == 0 {
            return Err(anyhow!("Null window handle"));
        }
        Ok(Self {
            hwnd,
            restore_rect: None,
        })
    }

    fn hwnd(&self) -> HWND {
        hwnd_from(self.hwnd)
    }

    fn monitor_rect(&self) -> Option<Rect> {
        unsafe {
            let monitor = MonitorFromWindow(self.hwnd(), MONITOR_DEFAULTTONEAREST);
            let mut info = MONITORINFO {
                cbSize: std::mem::size_of::<MONITORINFO>() as u32,
                ..Default::default()
            };
            if GetMonitorInfoW(monitor, &mut info).as_bool() {
                Some(rect_from_win32(&info.rcMonitor))
            } else {
                None
            }
        }
    }
}

impl PlacementSource for Win32Window {
    fn query_actual_window_placement(&self) -> anyhow::Result<Placement> {
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        unsafe { GetWindowPlacement(self.hwnd(), &mut placement) }
            .map_err(|e| anyhow!("{}", e.message()))
            .context("GetWindowPlacement failed")?;

        let show = match SHOW_WINDOW_CMD(placement.showCmd as _) {
            SW_SHOWMAXIMIZED => ShowState::Maximized,
            SW_SHOWMINIMIZED => ShowState::Minimized,
            _ => ShowState::Normal,
        };
        Ok(Placement {
            show,
            normal_geometry: rect_from_win32(&placement.rcNormalPosition),
        })
    }
}

impl NativeWindow for Win32Window {
    fn frame_geometry(&self) -> Rect {
        window_rect(self.hwnd()).unwrap_or_else(|| {
            tracing::warn!(hwnd = self.hwnd, "GetWindowRect failed");
            Rect::default()
        })
    }

    fn set_frame_geometry(&mut self, rect: Rect) {
        unsafe {
            if let Err(e) = SetWindowPos(
                self.hwnd(),
                None,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                SWP_NOZORDER | SWP_NOACTIVATE,
            ) {
                tracing::warn!(error = %e, "SetWindowPos failed");
            }
        }
    }

    fn apply_show_state(&mut self, state: ShowState) {
        let hwnd = self.hwnd();
        match state {
            ShowState::FullScreen => {
                if self.restore_rect.is_none() {
                    self.restore_rect = Some(self.frame_geometry());
                }
                if let Some(monitor) = self.monitor_rect() {
                    unsafe {
                        let _ = ShowWindow(hwnd, SW_RESTORE);
                    }
                    self.set_frame_geometry(monitor);
                }
            }
            ShowState::Maximized => unsafe {
                let _ = ShowWindow(hwnd, SW_MAXIMIZE);
            },
            ShowState::Minimized => unsafe {
                let _ = ShowWindow(hwnd, SW_MINIMIZE);
            },
            ShowState::Normal => {
                unsafe {
                    let _ = ShowWindow(hwnd, SW_RESTORE);
                }
                if let Some(rect) = self.restore_rect.take() {
                    self.set_frame_geometry(rect);
                }
            }
        }
    }

    fn set_visible(&mut self, visible: bool) {
        unsafe {
            let _ = ShowWindow(self.hwnd(), if visible { SW_SHOW } else { SW_HIDE });
        }
    }

    fn is_visible(&self) -> bool {
        unsafe { IsWindowVisible(self.hwnd()).as_bool() }
    }

    fn set_title(&mut self, title: &str) {
        let wide = wide_string(title);
        unsafe {
            if let Err(e) = SetWindowTextW(self.hwnd(), PCWSTR(wide.as_ptr())) {
                tracing::warn!(error = %e, "SetWindowTextW failed");
            }
        }
    }

    fn pixel_ratio(&self) -> f64 {
        pixel_ratio_for_dpi(unsafe { GetDpiForWindow(self.hwnd()) })
    }

    fn handle_value(&self) -> isize {
        self.hwnd
    }

    fn destroy(&mut self) {
        if self.hwnd == 0 {
            return;
        }
        unsafe {
            if let Err(e) = DestroyWindow(self.hwnd()) {
                tracing::warn!(error = %e, "DestroyWindow failed for main window");
            }
        }
        self.hwnd = 0;
    }
}

// ============================================================================
// Shadow surface
// ============================================================================

unsafe extern "system" fn shadow_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_NCHITTEST => LRESULT(HTTRANSPARENT as isize),
        WM_MOUSEACTIVATE => LRESULT(MA_NOACTIVATE as isize),
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn register_shadow_class() -> anyhow::Result<()> {
    let instance = unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW failed")?;
    REGISTER_SHADOW_CLASS.call_once(|| {
        let class = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(shadow_wnd_proc),
            hInstance: instance.into(),
            lpszClassName: SHADOW_CLASS,
            ..Default::default()
        };
        if unsafe { RegisterClassExW(&class) } == 0 {
            tracing::error!("RegisterClassExW failed for shadow window class");
        }
    });
    Ok(())
}

/// Layered, click-through popup owned by the main window
pub struct Win32ShadowSurface {
    hwnd: isize,
    owner: isize,
    geometry: Rect,
}

impl Win32ShadowSurface {
    pub fn create(owner: isize) -> anyhow::Result<Self> {
        register_shadow_class()?;
        let instance = unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW failed")?;

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE,
                SHADOW_CLASS,
                w!(""),
                WS_POPUP,
                0,
                0,
                0,
                0,
                Some(hwnd_from(owner)),
                None,
                Some(instance.into()),
                None,
            )
        }
        .context("CreateWindowExW failed for shadow window")?;

        let disabled: i32 = 1;
        unsafe {
            let _ = DwmSetWindowAttribute(
                hwnd,
                DWMWA_TRANSITIONS_FORCEDISABLED,
                &disabled as *const i32 as *const std::ffi::c_void,
                std::mem::size_of::<i32>() as u32,
            );
        }

        tracing::debug!(owner, shadow = hwnd.0 as isize, "Shadow window created");
        Ok(Self {
            hwnd: hwnd.0 as isize,
            owner,
            geometry: Rect::default(),
        })
    }

    fn hwnd(&self) -> HWND {
        hwnd_from(self.hwnd)
    }
}

impl ShadowSurface for Win32ShadowSurface {
    fn set_geometry(&mut self, rect: Rect) {
        self.geometry = rect;
        unsafe {
            let _ = SetWindowPos(
                self.hwnd(),
                None,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn set_visible(&mut self, visible: bool) {
        unsafe {
            let _ = ShowWindow(self.hwnd(), if visible { SW_SHOWNOACTIVATE } else { SW_HIDE });
        }
    }

    fn present(&mut self, frame: &ShadowFrame) {
        if frame.width == 0 || frame.height == 0 {
            return;
        }
        let width = frame.width as i32;
        let height = frame.height as i32;

        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };

        unsafe {
            let hdc_screen = GetDC(None);
            let mut bits: *mut u32 = std::ptr::null_mut();
            let hbm = match CreateDIBSection(
                Some(hdc_screen),
                &bmi,
                DIB_RGB_COLORS,
                &mut bits as *mut _ as *mut _,
                None,
                0,
            ) {
                Ok(hbm) => hbm,
                Err(e) => {
                    tracing::warn!(error = %e, "CreateDIBSection failed for shadow");
                    let _ = ReleaseDC(None, hdc_screen);
                    return;
                }
            };

            let len = (frame.width * frame.height) as usize;
            let dst = std::slice::from_raw_parts_mut(bits, len);
            for (i, px) in frame.pixels.chunks_exact(4).enumerate() {
                dst[i] = rgba_to_bgra_u32([px[0], px[1], px[2], px[3]]);
            }

            let mem_dc = CreateCompatibleDC(Some(hdc_screen));
            let old_bmp = SelectObject(mem_dc, hbm.into());

            let pt_dst = POINT {
                x: self.geometry.x,
                y: self.geometry.y,
            };
            let pt_src = POINT { x: 0, y: 0 };
            let size = SIZE {
                cx: width,
                cy: height,
            };
            let blend = BLENDFUNCTION {
                BlendOp: AC_SRC_OVER as u8,
                SourceConstantAlpha: 255,
                AlphaFormat: AC_SRC_ALPHA as u8,
                ..Default::default()
            };

            if let Err(e) = UpdateLayeredWindow(
                self.hwnd(),
                Some(hdc_screen),
                Some(&pt_dst),
                Some(&size),
                Some(mem_dc),
                Some(&pt_src),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            ) {
                tracing::warn!(error = %e, "UpdateLayeredWindow failed");
            }

            let _ = SelectObject(mem_dc, old_bmp);
            let _ = DeleteDC(mem_dc);
            let _ = DeleteObject(hbm.into());
            let _ = ReleaseDC(None, hdc_screen);
        }
    }

    fn stack_below_owner(&mut self) {
        // SetWindowPos inserts after (below) the given window
        unsafe {
            let _ = SetWindowPos(
                self.hwnd(),
                Some(hwnd_from(self.owner)),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            );
        }
    }

    fn destroy(&mut self) {
        if self.hwnd == 0 {
            return;
        }
        unsafe {
            let _ = DestroyWindow(self.hwnd());
        }
        self.hwnd = 0;
    }
}

// ============================================================================
// Embedded child
// ============================================================================

/// Native child window embedded in the frame's client area
pub struct Win32ChildSurface {
    hwnd: isize,
    parent: isize,
}

impl Win32ChildSurface {
    pub fn from_hwnd(hwnd: isize, parent: isize) -> anyhow::Result<Self> {
        if hwnd == 0 || parent == 0 {
            return Err(anyhow!("Null child or parent handle"));
        }
        Ok(Self { hwnd, parent })
    }
}

impl ChildSurface for Win32ChildSurface {
    fn set_geometry(&mut self, rect: Rect) {
        // Child coordinates are relative to the parent's top-left
        let origin = window_rect(hwnd_from(self.parent))
            .map(|r| r.position())
            .unwrap_or_default();
        unsafe {
            let _ = SetWindowPos(
                hwnd_from(self.hwnd),
                None,
                rect.x - origin.x,
                rect.y - origin.y,
                rect.width,
                rect.height,
                SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn post_to_parent(&mut self, message: &ChildMessage) {
        let (msg, wparam, lparam) = match *message {
            ChildMessage::SysKeyDown(vk) => (WM_SYSKEYDOWN, WPARAM(vk as usize), LPARAM(0)),
            ChildMessage::SysKeyUp(vk) => (WM_SYSKEYUP, WPARAM(vk as usize), LPARAM(0)),
            ChildMessage::SysChar(c) => (WM_SYSCHAR, WPARAM(c as usize), LPARAM(0)),
            ChildMessage::SysCommand(cmd) => (WM_SYSCOMMAND, WPARAM(cmd as usize), LPARAM(0)),
            ChildMessage::ContextMenu(p) => (
                WM_CONTEXTMENU,
                WPARAM(self.parent as usize),
                LPARAM(wndproc::lparam_from_point(p)),
            ),
            _ => return,
        };
        unsafe {
            if let Err(e) = PostMessageW(Some(hwnd_from(self.parent)), msg, wparam, lparam) {
                tracing::warn!(error = %e, msg, "Failed to forward child message to parent");
            }
        }
    }

    fn destroy(&mut self) {
        if self.hwnd == 0 {
            return;
        }
        unsafe {
            let _ = DestroyWindow(hwnd_from(self.hwnd));
        }
        self.hwnd = 0;
    }
}

// ============================================================================
// Message interception
// ============================================================================

const FRAME_SUBCLASS_ID: usize = 1;
const CHILD_SUBCLASS_ID: usize = 2;

/// Re-entrant rounds drained after one outer message
const MAX_DEFERRED_ROUNDS: usize = 8;

struct Hook {
    window: Weak<RefCell<FramelessWindow>>,
    deferred: RefCell<DeferredEvents>,
}

thread_local! {
    // Subclass procs run on the window's thread only
    static HOOKS: RefCell<HashMap<isize, Rc<Hook>>> = RefCell::new(HashMap::new());
}

fn hook_for(hwnd: HWND) -> Option<Rc<Hook>> {
    HOOKS.with(|hooks| hooks.borrow().get(&(hwnd.0 as isize)).cloned())
}

fn unhook(hwnd: isize) {
    HOOKS.with(|hooks| {
        hooks.borrow_mut().remove(&hwnd);
    });
}

/// Subclass installed on the frame and, optionally, the embedded child.
///
/// Dropping the hook removes both subclasses.
pub struct MessageHook {
    frame: isize,
    child: Option<isize>,
}

impl MessageHook {
    /// Subclass the window's HWND and force a frame recalculation so the
    /// native caption and borders go away.
    ///
    /// # Arguments
    /// * `window` - Shared window; the hook keeps only a weak reference
    /// * `child` - HWND of the embedded child, if any
    pub fn install(
        window: &Rc<RefCell<FramelessWindow>>,
        child: Option<isize>,
    ) -> anyhow::Result<Self> {
        let frame = window.borrow().native_handle();
        if frame == 0 {
            return Err(anyhow!("Window has no native handle"));
        }

        let hook = Rc::new(Hook {
            window: Rc::downgrade(window),
            deferred: RefCell::new(DeferredEvents::new()),
        });
        HOOKS.with(|hooks| hooks.borrow_mut().insert(frame, hook.clone()));

        let installed = unsafe {
            SetWindowSubclass(
                hwnd_from(frame),
                Some(frame_subclass_proc),
                FRAME_SUBCLASS_ID,
                0,
            )
        };
        if !installed.as_bool() {
            unhook(frame);
            return Err(anyhow!("SetWindowSubclass failed for frame {:#x}", frame));
        }
        let mut installed_hook = Self { frame, child: None };

        if let Some(child) = child {
            HOOKS.with(|hooks| hooks.borrow_mut().insert(child, hook.clone()));
            let ok = unsafe {
                SetWindowSubclass(
                    hwnd_from(child),
                    Some(child_subclass_proc),
                    CHILD_SUBCLASS_ID,
                    0,
                )
            };
            if !ok.as_bool() {
                unhook(child);
                return Err(anyhow!("SetWindowSubclass failed for child {:#x}", child));
            }
            installed_hook.child = Some(child);
        }

        unsafe {
            if let Err(e) = SetWindowPos(
                hwnd_from(frame),
                None,
                0,
                0,
                0,
                0,
                SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            ) {
                tracing::warn!(error = %e, "Frame recalculation failed");
            }
        }
        tracing::info!(frame, ?child, "Message hook installed");
        Ok(installed_hook)
    }
}

impl Drop for MessageHook {
    fn drop(&mut self) {
        unsafe {
            let _ = RemoveWindowSubclass(
                hwnd_from(self.frame),
                Some(frame_subclass_proc),
                FRAME_SUBCLASS_ID,
            );
            if let Some(child) = self.child {
                let _ = RemoveWindowSubclass(
                    hwnd_from(child),
                    Some(child_subclass_proc),
                    CHILD_SUBCLASS_ID,
                );
            }
        }
        unhook(self.frame);
        if let Some(child) = self.child {
            unhook(child);
        }
        tracing::debug!(frame = self.frame, "Message hook removed");
    }
}

/// Resize frame plus padded border, hidden off-monitor when maximized
fn frame_thickness(hwnd: HWND) -> i32 {
    unsafe {
        let dpi = GetDpiForWindow(hwnd);
        GetSystemMetricsForDpi(SM_CXFRAME, dpi) + GetSystemMetricsForDpi(SM_CXPADDEDBORDER, dpi)
    }
}

/// Answer for a message that arrives while the window is already borrowed
fn reentrant_reply(hwnd: HWND, msg: u32) -> Reply {
    match msg {
        WM_NCCALCSIZE => Reply::RemoveFrame {
            maximized: unsafe { IsZoomed(hwnd).as_bool() },
        },
        WM_CLOSE => Reply::Handled(0),
        _ => Reply::Default,
    }
}

unsafe fn apply_reply(
    hwnd: HWND,
    window: &RefCell<FramelessWindow>,
    reply: Reply,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match reply {
        Reply::Handled(code) => LRESULT(code),
        Reply::Default => DefSubclassProc(hwnd, msg, wparam, lparam),
        Reply::RemoveFrame { maximized } => {
            // wparam TRUE: NCCALCSIZE_PARAMS, whose first rect is the proposed client
            let proposed = if wparam.0 != 0 {
                let params = lparam.0 as *mut NCCALCSIZE_PARAMS;
                if params.is_null() {
                    return DefSubclassProc(hwnd, msg, wparam, lparam);
                }
                &mut (*params).rgrc[0]
            } else {
                let rect = lparam.0 as *mut RECT;
                if rect.is_null() {
                    return DefSubclassProc(hwnd, msg, wparam, lparam);
                }
                &mut *rect
            };
            let client = wndproc::frameless_client_area(
                rect_from_win32(proposed),
                maximized,
                frame_thickness(hwnd),
            );
            *proposed = rect_to_win32(client);
            LRESULT(0)
        }
        Reply::TrackLimits(limits) => {
            let info = lparam.0 as *mut MINMAXINFO;
            if info.is_null() {
                return DefSubclassProc(hwnd, msg, wparam, lparam);
            }
            (*info).ptMinTrackSize = POINT {
                x: limits.min_width,
                y: limits.min_height,
            };
            (*info).ptMaxTrackSize = POINT {
                x: limits.max_width,
                y: limits.max_height,
            };
            LRESULT(0)
        }
        Reply::ApplySuggestedRect => {
            let suggested = lparam.0 as *const RECT;
            if suggested.is_null() {
                return LRESULT(0);
            }
            let rect = rect_from_win32(&*suggested);
            match window.try_borrow_mut() {
                Ok(mut w) => w.set_geometry(rect),
                Err(_) => {
                    let _ = SetWindowPos(
                        hwnd,
                        None,
                        rect.x,
                        rect.y,
                        rect.width,
                        rect.height,
                        SWP_NOZORDER | SWP_NOACTIVATE,
                    );
                }
            }
            LRESULT(0)
        }
    }
}

/// Pump events that were deferred while the window was borrowed
fn drain_deferred(hook: &Hook, window: &RefCell<FramelessWindow>) {
    let Ok(mut w) = window.try_borrow_mut() else {
        return;
    };
    for _ in 0..MAX_DEFERRED_ROUNDS {
        let mut pending = std::mem::take(&mut *hook.deferred.borrow_mut());
        if pending.is_empty() {
            return;
        }
        w.pump(&mut pending);
    }
    let dropped = std::mem::take(&mut *hook.deferred.borrow_mut()).len();
    if dropped > 0 {
        tracing::warn!(dropped, "Deferred message chain did not settle");
    }
}

unsafe extern "system" fn frame_subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _uidsubclass: usize,
    _dwrefdata: usize,
) -> LRESULT {
    if msg == WM_NCDESTROY {
        unhook(hwnd.0 as isize);
        let _ = RemoveWindowSubclass(hwnd, Some(frame_subclass_proc), FRAME_SUBCLASS_ID);
        return DefSubclassProc(hwnd, msg, wparam, lparam);
    }

    let Some(hook) = hook_for(hwnd) else {
        return DefSubclassProc(hwnd, msg, wparam, lparam);
    };
    let Some(window) = hook.window.upgrade() else {
        return DefSubclassProc(hwnd, msg, wparam, lparam);
    };

    let reply = match window.try_borrow_mut() {
        Ok(mut w) => wndproc::dispatch(&mut w, msg, wparam.0, lparam.0),
        Err(_) => {
            // Sent from inside a handler (SetWindowPos, ShowWindow, DestroyWindow)
            hook.deferred.borrow_mut().defer(msg, wparam.0, lparam.0);
            reentrant_reply(hwnd, msg)
        }
    };
    let result = apply_reply(hwnd, &window, reply, msg, wparam, lparam);
    drain_deferred(&hook, &window);
    result
}

unsafe extern "system" fn child_subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _uidsubclass: usize,
    _dwrefdata: usize,
) -> LRESULT {
    if msg == WM_NCDESTROY {
        unhook(hwnd.0 as isize);
        let _ = RemoveWindowSubclass(hwnd, Some(child_subclass_proc), CHILD_SUBCLASS_ID);
        return DefSubclassProc(hwnd, msg, wparam, lparam);
    }

    let Some(window) = hook_for(hwnd).and_then(|hook| hook.window.upgrade()) else {
        return DefSubclassProc(hwnd, msg, wparam, lparam);
    };
    let reply = match window.try_borrow_mut() {
        Ok(mut w) => wndproc::dispatch_child(&mut w, msg, wparam.0, lparam.0),
        Err(_) => Reply::Default,
    };
    match reply {
        Reply::Handled(code) => LRESULT(code),
        _ => DefSubclassProc(hwnd, msg, wparam, lparam),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_conversion_keeps_edges() {
        let rect = Rect::new(-8, -8, 1936, 1056);
        let win32 = rect_to_win32(rect);
        assert_eq!((win32.left, win32.top, win32.right, win32.bottom), (-8, -8, 1928, 1048));
        assert_eq!(rect_from_win32(&win32), rect);
    }

    #[test]
    fn test_message_ids_match_win32_headers() {
        use crate::native::wndproc::msg;
        assert_eq!(msg::WM_NCCALCSIZE, WM_NCCALCSIZE);
        assert_eq!(msg::WM_NCHITTEST, WM_NCHITTEST);
        assert_eq!(msg::WM_GETMINMAXINFO, WM_GETMINMAXINFO);
        assert_eq!(msg::WM_DPICHANGED, WM_DPICHANGED);
        assert_eq!(msg::WM_PARENTNOTIFY, WM_PARENTNOTIFY);
        assert_eq!(msg::WM_EXITSIZEMOVE, WM_EXITSIZEMOVE);
    }

    #[test]
    fn test_hit_codes_match_win32_headers() {
        use crate::native::wndproc::ht;
        assert_eq!(ht::HTTRANSPARENT, HTTRANSPARENT as isize);
        assert_eq!(ht::HTCAPTION, HTCAPTION as isize);
        assert_eq!(ht::HTMAXBUTTON, HTMAXBUTTON as isize);
        assert_eq!(ht::HTCLOSE, HTCLOSE as isize);
        assert_eq!(ht::HTBOTTOMRIGHT, HTBOTTOMRIGHT as isize);
    }

    #[test]
    fn test_unknown_window_has_no_hook() {
        assert!(hook_for(hwnd_from(0x1234)).is_none());
    }
}
