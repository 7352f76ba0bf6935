//! Terminal settings around the password prompt.
//!
//! The prompt turns echo off and turns it back on only when its read
//! returns. Ctrl-C abandons that read, so the settings captured before the
//! run are put back by hand on the interrupt path.

#[cfg(unix)]
pub use unix::TerminalMode;

#[cfg(not(unix))]
pub use fallback::TerminalMode;

#[cfg(unix)]
mod unix {
    use std::fs::{File, OpenOptions};
    use std::io::{self, IsTerminal};
    use std::mem::MaybeUninit;
    use std::os::fd::{AsRawFd, RawFd};

    use tracing::debug;

    /// Device the prompt reads from: stdin when it is a terminal, otherwise
    /// the controlling terminal.
    enum Device {
        Stdin,
        Tty(File),
    }

    impl Device {
        fn open() -> io::Result<Self> {
            if io::stdin().is_terminal() {
                Ok(Self::Stdin)
            } else {
                OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open("/dev/tty")
                    .map(Self::Tty)
            }
        }

        fn raw_fd(&self) -> RawFd {
            match self {
                Self::Stdin => io::stdin().as_raw_fd(),
                Self::Tty(file) => file.as_raw_fd(),
            }
        }
    }

    /// Terminal settings saved before prompting.
    pub struct TerminalMode {
        saved: Option<(Device, libc::termios)>,
    }

    impl TerminalMode {
        /// Saves the current settings of the prompt's terminal, if there is one.
        pub fn capture() -> Self {
            let saved = Device::open().and_then(|device| {
                let termios = get_attr(device.raw_fd())?;
                Ok((device, termios))
            });
            match saved {
                Ok(saved) => Self { saved: Some(saved) },
                Err(err) => {
                    debug!("No terminal to restore: {err}");
                    Self { saved: None }
                }
            }
        }

        /// Puts the saved settings back.
        pub fn restore(&self) {
            if let Some((device, termios)) = &self.saved
                && let Err(err) = set_attr(device.raw_fd(), termios)
            {
                debug!("Failed to restore terminal settings: {err}");
            }
        }

        #[cfg(test)]
        fn from_file(file: File) -> io::Result<Self> {
            let device = Device::Tty(file);
            let termios = get_attr(device.raw_fd())?;
            Ok(Self {
                saved: Some((device, termios)),
            })
        }
    }

    #[allow(unsafe_code)]
    fn get_attr(fd: RawFd) -> io::Result<libc::termios> {
        let mut termios = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: `termios` is valid for writes and is initialized on success.
        if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: tcgetattr returned 0.
        Ok(unsafe { termios.assume_init() })
    }

    #[allow(unsafe_code)]
    fn set_attr(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
        // SAFETY: `termios` points to a fully initialized struct.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(test)]
    #[allow(clippy::unwrap_used, unsafe_code)]
    mod tests {
        use std::os::fd::{FromRawFd, OwnedFd};
        use std::ptr;

        use super::*;

        fn pty() -> (File, File) {
            let (mut master, mut slave) = (-1, -1);
            // SAFETY: out-pointers are valid; the optional arguments are null.
            let rc = unsafe {
                libc::openpty(
                    &raw mut master,
                    &raw mut slave,
                    ptr::null_mut(),
                    ptr::null(),
                    ptr::null(),
                )
            };
            assert_eq!(rc, 0, "openpty: {}", io::Error::last_os_error());
            // SAFETY: openpty returned two fresh descriptors we now own.
            unsafe {
                (
                    File::from(OwnedFd::from_raw_fd(master)),
                    File::from(OwnedFd::from_raw_fd(slave)),
                )
            }
        }

        fn echo_enabled(file: &File) -> bool {
            get_attr(file.as_raw_fd()).unwrap().c_lflag & libc::ECHO != 0
        }

        #[test]
        fn restore_turns_echo_back_on() {
            let (_master, slave) = pty();
            let observer = slave.try_clone().unwrap();
            assert!(echo_enabled(&observer));

            let mode = TerminalMode::from_file(slave).unwrap();

            // What the password prompt does before it blocks on the read.
            let mut silent = get_attr(observer.as_raw_fd()).unwrap();
            silent.c_lflag &= !libc::ECHO;
            set_attr(observer.as_raw_fd(), &silent).unwrap();
            assert!(!echo_enabled(&observer));

            mode.restore();
            assert!(echo_enabled(&observer));
        }

        #[test]
        fn restore_without_terminal_is_a_no_op() {
            TerminalMode { saved: None }.restore();
        }
    }
}

#[cfg(not(unix))]
mod fallback {
    /// Terminal settings saved before prompting.
    pub struct TerminalMode;

    impl TerminalMode {
        /// Nothing to save on this platform.
        pub const fn capture() -> Self {
            Self
        }

        /// Nothing to restore on this platform.
        pub const fn restore(&self) {}
    }
}
