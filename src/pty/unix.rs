//! Unix PTY implementation
//!
//! Implements PTY creation and child process management using POSIX APIs.

use std::ffi::{CStr, CString};
use std::os::unix::io::{AsRawFd, RawFd};

use nix::errno::Errno;
use nix::fcntl::{fcntl, open, FcntlArg, FdFlag, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execve, fork, read, setsid, write, ForkResult, Pid};

use super::{PtyError, PtyResult, ReadOutcome, Session, WindowSize};
use crate::app::ShellConfig;

/// Exit status of a child that could not exec any shell
const EXEC_FAILED: i32 = 127;

/// On Linux these go straight to `open`, so close-on-exec is set atomically
#[cfg(target_os = "linux")]
const MASTER_FLAGS: OFlag = OFlag::O_RDWR.union(OFlag::O_NOCTTY).union(OFlag::O_CLOEXEC);
#[cfg(not(target_os = "linux"))]
const MASTER_FLAGS: OFlag = OFlag::O_RDWR.union(OFlag::O_NOCTTY);

/// A running child and the master side of its PTY
struct Child {
    master: PtyMaster,
    pid: Pid,
    /// Set once `waitpid` has collected the exit status
    reaped: bool,
}

/// A shell process attached to a pseudoterminal
///
/// A child that has not exited by the time of `close` is kept in a list and
/// reaped by later `spawn` or `poll_exit` calls, or on drop. A host that
/// leaves a session inert for a long time can call `poll_exit` to collect it.
pub struct PtySession {
    shell: ShellConfig,
    size: WindowSize,
    child: Option<Child>,
    /// Children signalled on close that had not exited yet
    unreaped: Vec<Pid>,
}

impl PtySession {
    /// Create an inactive session that will run `shell` at `size`
    pub fn new(shell: ShellConfig, size: WindowSize) -> Self {
        Self {
            shell,
            size,
            child: None,
            unreaped: Vec::new(),
        }
    }

    pub fn size(&self) -> WindowSize {
        self.size
    }

    /// Get the child process ID while active
    pub fn child_pid(&self) -> Option<Pid> {
        self.child.as_ref().map(|child| child.pid)
    }

    /// Get the raw file descriptor of the PTY master while active
    pub fn master_fd(&self) -> Option<RawFd> {
        self.child.as_ref().map(|child| child.master.as_raw_fd())
    }

    /// Number of closed children still waiting to be reaped
    pub fn lingering(&self) -> usize {
        self.unreaped.len()
    }

    /// Retry reaping children that outlived their close
    fn reap_lingering(&mut self) {
        self.unreaped.retain(|&pid| {
            matches!(
                waitpid(pid, Some(WaitPidFlag::WNOHANG)),
                Ok(WaitStatus::StillAlive) | Err(Errno::EINTR)
            )
        });
    }
}

impl Session for PtySession {
    fn spawn(&mut self) -> PtyResult<()> {
        if self.child.is_some() {
            return Err(PtyError::AlreadyActive);
        }
        self.reap_lingering();

        // Everything the child needs is allocated before the fork
        let launch = Launch::prepare(&self.shell)?;

        let master = posix_openpt(MASTER_FLAGS).map_err(PtyError::OpenMaster)?;
        // Shells spawned later for other sessions must not inherit this master
        set_cloexec(master.as_raw_fd())?;
        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        // SAFETY: ptsname is not thread-safe, but we're calling it immediately
        // after unlockpt and before any other use of this master
        let slave_name = unsafe { ptsname(&master) }.map_err(PtyError::PtsName)?;
        let slave_name =
            CString::new(slave_name).map_err(|e| PtyError::InvalidShellPath(e.to_string()))?;

        set_window_size(master.as_raw_fd(), self.size)?;

        // SAFETY: the child only makes async-signal-safe calls before exec
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);
                exec_shell(&slave_name, &launch)
            },
            ForkResult::Parent { child } => {
                if let Err(e) = set_nonblocking(master.as_raw_fd()) {
                    let _ = kill(child, Signal::SIGKILL);
                    self.unreaped.push(child);
                    self.reap_lingering();
                    return Err(e);
                }

                tracing::debug!(pid = child.as_raw(), "spawned shell");
                self.child = Some(Child {
                    master,
                    pid: child,
                    reaped: false,
                });
                Ok(())
            },
        }
    }

    fn write(&mut self, data: &[u8]) -> PtyResult<usize> {
        let Some(fd) = self.master_fd() else {
            return Ok(0);
        };

        let mut written = 0;
        while written < data.len() {
            match write(fd, &data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                // EAGAIN and EWOULDBLOCK are the same value on Linux
                Err(Errno::EAGAIN) => break,
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    tracing::warn!("write to shell failed: {}", e);
                    self.close();
                    return Err(PtyError::Write(e));
                },
            }
        }
        Ok(written)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> ReadOutcome {
        let Some(fd) = self.master_fd() else {
            return ReadOutcome::Closed;
        };

        match read(fd, buf) {
            Ok(0) => ReadOutcome::Closed,
            Ok(n) => ReadOutcome::Data(n),
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => ReadOutcome::Empty,
            Err(e) => {
                // EIO once every slave descriptor is closed
                tracing::debug!("read from shell ended: {}", e);
                ReadOutcome::Closed
            },
        }
    }

    fn poll_exit(&mut self) -> bool {
        self.reap_lingering();

        let Some(child) = self.child.as_mut() else {
            return true;
        };
        if child.reaped {
            return true;
        }

        match waitpid(child.pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::EINTR) => false,
            Ok(status) => {
                tracing::info!(pid = child.pid.as_raw(), ?status, "shell exited");
                child.reaped = true;
                true
            },
            Err(e) => {
                tracing::debug!(pid = child.pid.as_raw(), "waitpid failed: {}", e);
                child.reaped = true;
                true
            },
        }
    }

    fn close(&mut self) {
        let Some(Child {
            master,
            pid,
            reaped,
        }) = self.child.take()
        else {
            return;
        };

        drop(master);

        if !reaped {
            let _ = kill(pid, Signal::SIGTERM);
            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) | Err(Errno::EINTR) => self.unreaped.push(pid),
                _ => {},
            }
        }

        tracing::debug!(pid = pid.as_raw(), "closed shell session");
    }

    fn is_active(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        self.close();
        self.reap_lingering();
    }
}

/// Pre-built exec arguments: candidate programs in order, and the environment
struct Launch {
    programs: Vec<(CString, Vec<CString>)>,
    env: Vec<CString>,
}

impl Launch {
    fn prepare(shell: &ShellConfig) -> PtyResult<Self> {
        let cstring = |s: &str| CString::new(s).map_err(|_| PtyError::InvalidShellPath(s.to_string()));

        let mut programs = Vec::new();
        for path in shell.candidates() {
            let program = cstring(path)?;
            let name = path.rsplit('/').next().unwrap_or(path);
            let mut argv = vec![cstring(name)?];
            for arg in &shell.args {
                argv.push(cstring(arg)?);
            }
            programs.push((program, argv));
        }

        let mut env = Vec::new();
        for (key, value) in std::env::vars() {
            if key == "TERM" || key == "COLORTERM" {
                continue;
            }
            if let Ok(entry) = CString::new(format!("{}={}", key, value)) {
                env.push(entry);
            }
        }
        env.push(cstring(&format!("TERM={}", shell.term))?);
        env.push(cstring(&format!("COLORTERM={}", shell.colorterm))?);

        Ok(Self { programs, env })
    }
}

/// Child side of the fork: attach to the slave and exec a shell
fn exec_shell(slave_name: &CStr, launch: &Launch) -> ! {
    let _ = setsid();

    if let Ok(slave_fd) = open(slave_name, OFlag::O_RDWR, Mode::empty()) {
        // SAFETY: TIOCSCTTY is a valid ioctl for setting controlling terminal
        unsafe {
            libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0);
        }

        let _ = dup2(slave_fd, STDIN_FILENO);
        let _ = dup2(slave_fd, STDOUT_FILENO);
        let _ = dup2(slave_fd, STDERR_FILENO);
        if slave_fd > STDERR_FILENO {
            let _ = close(slave_fd);
        }

        for (program, argv) in &launch.programs {
            // execve only returns on error; fall through to the next shell
            let _ = execve(program, argv, &launch.env);
        }
    }

    // SAFETY: _exit skips atexit handlers and destructors of the parent's state
    unsafe { libc::_exit(EXEC_FAILED) }
}

fn set_cloexec(fd: RawFd) -> PtyResult<()> {
    fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map_err(PtyError::OpenMaster)?;
    Ok(())
}

fn set_nonblocking(fd: RawFd) -> PtyResult<()> {
    let flags = fcntl(fd, FcntlArg::F_GETFL).map_err(PtyError::SetNonBlocking)?;
    let flags = OFlag::from_bits_truncate(flags);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK)).map_err(PtyError::SetNonBlocking)?;
    Ok(())
}

/// Set the window size on a PTY file descriptor
fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };

    // SAFETY: TIOCSWINSZ is a valid ioctl for setting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(Errno::last()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
fn get_window_size(fd: RawFd) -> PtyResult<WindowSize> {
    let mut winsize = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ is a valid ioctl for getting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(Errno::last()))
    } else {
        Ok(WindowSize {
            rows: winsize.ws_row,
            cols: winsize.ws_col,
            pixel_width: winsize.ws_xpixel,
            pixel_height: winsize.ws_ypixel,
        })
    }
}
