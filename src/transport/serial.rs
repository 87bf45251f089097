//! # Serial Transport
//!
//! Opens the printer's serial device (a USB-serial adapter or a bound
//! Bluetooth RFCOMM node such as `/dev/rfcomm0`) for raw binary writes.
//!
//! ## Bluetooth Setup (Linux)
//!
//! ```bash
//! $ bluetoothctl
//! [bluetooth]# pair 00:11:62:XX:XX:XX
//! $ sudo rfcomm bind 0 00:11:62:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so raster bytes pass through unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, etc. cleared
//! - **No output processing**: OPOST cleared (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **No echo, non-canonical**: ECHO, ECHONL, ICANON cleared
//! - **Baud rate**: applied to both directions

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::spool::{Connector, PrinterPort};
use crate::error::TicketError;

/// Opens [`SerialPort`]s on a fixed device path.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    path: PathBuf,
    baud_rate: u32,
}

impl SerialConnector {
    pub fn new<P: Into<PathBuf>>(path: P, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
        }
    }
}

#[async_trait]
impl Connector for SerialConnector {
    async fn open(&self) -> Result<Box<dyn PrinterPort>, TicketError> {
        let path = self.path.clone();
        let baud_rate = self.baud_rate;
        let port = tokio::task::spawn_blocking(move || SerialPort::open(&path, baud_rate))
            .await
            .map_err(|e| TicketError::Connection(format!("Open task failed: {}", e)))??;
        Ok(Box::new(port))
    }
}

/// An open serial device.
///
/// Each operation runs on the blocking pool so a slow device never stalls
/// the async runtime.
pub struct SerialPort {
    file: Option<File>,
    path: PathBuf,
}

impl SerialPort {
    /// Open and configure the device.
    ///
    /// ## Errors
    ///
    /// Returns [`TicketError::Connection`] if:
    /// - The device doesn't exist
    /// - Permission denied (may need root or dialout group)
    /// - TTY configuration fails
    pub fn open(path: &Path, baud_rate: u32) -> Result<Self, TicketError> {
        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            TicketError::Connection(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(&file, baud_rate)
            .map_err(|e| TicketError::Connection(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(port = %path.display(), baud_rate, "serial port opened");
        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
        })
    }

    fn take_file(&mut self) -> Result<File, TicketError> {
        self.file
            .take()
            .ok_or_else(|| TicketError::Transport(format!("{} is closed", self.path.display())))
    }

    /// Run a blocking operation on the file, handing it back afterwards.
    async fn with_file<F>(&mut self, op: F) -> Result<(), TicketError>
    where
        F: FnOnce(&mut File) -> io::Result<()> + Send + 'static,
    {
        let mut file = self.take_file()?;
        let (file, result) = tokio::task::spawn_blocking(move || {
            let result = op(&mut file);
            (file, result)
        })
        .await
        .map_err(|e| TicketError::Transport(format!("I/O task failed: {}", e)))?;
        self.file = Some(file);
        result.map_err(|e| TicketError::Transport(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl PrinterPort for SerialPort {
    async fn write(&mut self, data: &[u8]) -> Result<(), TicketError> {
        let data = data.to_vec();
        self.with_file(move |file| file.write_all(&data)).await
    }

    async fn drain(&mut self) -> Result<(), TicketError> {
        self.with_file(|file| {
            file.flush()?;
            drain_file(file)
        })
        .await
    }

    async fn close(&mut self) -> Result<(), TicketError> {
        let file = self.take_file()?;
        tokio::task::spawn_blocking(move || file.sync_all().or_else(ignore_unsupported))
            .await
            .map_err(|e| TicketError::Transport(format!("Close task failed: {}", e)))?
            .map_err(|e| TicketError::Transport(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!(port = %self.path.display(), "serial port closed");
        Ok(())
    }
}

/// TTYs reject fsync with EINVAL; that is not a close failure.
fn ignore_unsupported(e: io::Error) -> io::Result<()> {
    if e.raw_os_error() == Some(libc::EINVAL) {
        Ok(())
    } else {
        Err(e)
    }
}

/// Block until everything written to `file` has been transmitted.
///
/// Regular files (used in tests) report ENOTTY, which counts as drained.
#[cfg(unix)]
fn drain_file(file: &File) -> io::Result<()> {
    let result = unsafe { libc::tcdrain(file.as_raw_fd()) };
    if result != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ENOTTY) {
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn drain_file(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Map a numeric baud rate to its termios constant.
#[cfg(unix)]
pub fn baud_constant(baud_rate: u32) -> Option<libc::speed_t> {
    let speed = match baud_rate {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        _ => return None,
    };
    Some(speed)
}

/// Configure a file descriptor for raw TTY mode at the given baud rate.
///
/// IXON/IXOFF/IXANY are cleared to disable XON/XOFF software flow control:
/// 0x11 and 0x13 appear freely in packed raster data.
///
/// Descriptors that are not terminals are left untouched.
#[cfg(unix)]
fn configure_tty_raw(file: &File, baud_rate: u32) -> io::Result<()> {
    use std::mem::MaybeUninit;

    let fd = file.as_raw_fd();
    let speed = baud_constant(baud_rate).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unsupported baud rate {}", baud_rate),
        )
    })?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ENOTTY) {
            return Ok(());
        }
        return Err(err);
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    unsafe {
        if libc::cfsetispeed(&mut termios, speed) != 0 || libc::cfsetospeed(&mut termios, speed) != 0 {
            return Err(io::Error::last_os_error());
        }
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File, _baud_rate: u32) -> io::Result<()> {
    // No termios here; the device driver owns line settings
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
