use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    MB_ICONERROR, MB_OK, MB_SETFOREGROUND, MessageBoxW,
};
use windows::core::HSTRING;

use crate::launcher::Notifier;

/// Blocking OK/Error message box, the only error surface the user sees.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageBoxNotifier;

impl Notifier for MessageBoxNotifier {
    fn notify_error(&self, caption: &str, message: &str) {
        let text = HSTRING::from(message);
        let caption = HSTRING::from(caption);
        unsafe {
            let _ = MessageBoxW(
                HWND::default(),
                &text,
                &caption,
                MB_OK | MB_ICONERROR | MB_SETFOREGROUND,
            );
        }
    }
}
