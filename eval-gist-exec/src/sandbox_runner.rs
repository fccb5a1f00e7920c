use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Interval between checks on a runner that has a timeout.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A failure while talking to the sandbox runner. Failures of the executed program are not
/// reported here: they are part of the runner's answer.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The runner executable cannot be found in `$PATH`.
    #[error("Runner {path:?} not found")]
    NotFound {
        /// The name that was searched.
        path: PathBuf,
        /// Why it wasn't found.
        #[source]
        source: which::Error,
    },
    /// The runner process cannot be started.
    #[error("Failed to spawn runner {path:?}")]
    Spawn {
        /// The path of the runner.
        path: PathBuf,
        /// The error from the OS.
        #[source]
        source: std::io::Error,
    },
    /// Sending the request or receiving the answer failed.
    #[error("I/O error talking to the runner")]
    Io(#[from] std::io::Error),
    /// The runner exited unsuccessfully.
    #[error("Runner exited with {status}: {stderr}")]
    Exited {
        /// The exit status of the runner.
        status: ExitStatus,
        /// What the runner wrote to its standard error.
        stderr: String,
    },
    /// The runner didn't exit in time and got killed.
    #[error("Runner did not exit within {0:?}")]
    TimedOut(Duration),
    /// The runner refused the request.
    #[error("Runner rejected the request: {0}")]
    Rejected(String),
}

/// Something able to run a serialized execution request and return the serialized result.
///
/// The runner is a pure transform from bytes to bytes: it keeps no state between calls and it's
/// the only component that actually runs the untrusted programs.
pub trait SandboxRunner: Send + Sync {
    /// Run the request encoded in `input`, blocking until the answer is ready.
    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, RunnerError>;
}

impl<S: SandboxRunner + ?Sized> SandboxRunner for Arc<S> {
    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, RunnerError> {
        self.as_ref().execute(input)
    }
}

/// A fake runner that doesn't run anything and always fails.
#[derive(Default, Debug)]
pub struct ErrorSandboxRunner;

impl SandboxRunner for ErrorSandboxRunner {
    fn execute(&self, _input: &[u8]) -> Result<Vec<u8>, RunnerError> {
        Err(RunnerError::Rejected("Nope".to_owned()))
    }
}

/// A runner backed by a function, useful for embedding a runner in-process.
pub struct FnSandboxRunner<F>(pub F);

impl<F> SandboxRunner for FnSandboxRunner<F>
where
    F: Fn(&[u8]) -> Result<Vec<u8>, RunnerError> + Send + Sync,
{
    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, RunnerError> {
        (self.0)(input)
    }
}

/// A runner that spawns an external executable for each request, writing the request to its
/// standard input and reading the answer from its standard output.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// The absolute path of the runner executable.
    path: PathBuf,
    /// Kill the runner if it doesn't exit within this time.
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Make a runner for the executable at `path`. A bare name is searched in `$PATH`, a relative
    /// path is made absolute with respect to the current directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<ProcessRunner, RunnerError> {
        let path = path.as_ref();
        let resolved = if path.components().count() == 1 && !path.exists() {
            which::which(path).map_err(|source| RunnerError::NotFound {
                path: path.to_owned(),
                source,
            })?
        } else if path.is_absolute() {
            path.to_owned()
        } else {
            std::env::current_dir()?.join(path)
        };
        debug!("Using runner at {}", resolved.display());
        Ok(ProcessRunner {
            path: resolved,
            timeout: None,
        })
    }

    /// Kill the runner and fail if a request takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The path of the runner executable.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the runner to exit, killing it if it's still running after the timeout.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, RunnerError> {
        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => return Ok(child.wait()?),
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!("Runner still running after {:?}, killing it", timeout);
                // it may have exited in the meantime
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunnerError::TimedOut(timeout));
            }
            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }
}

impl SandboxRunner for ProcessRunner {
    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, RunnerError> {
        trace!("Runner input: {}", String::from_utf8_lossy(input));
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let input = input.to_vec();
        let writer = thread::Builder::new()
            .name("Runner stdin".into())
            .spawn(move || -> std::io::Result<()> {
                if let Some(mut stdin) = stdin {
                    stdin.write_all(&input)?;
                }
                Ok(())
            })?;
        let stdout = spawn_reader("Runner stdout", child.stdout.take())?;
        let stderr = spawn_reader("Runner stderr", child.stderr.take())?;

        let status = self.wait(&mut child)?;
        match join(writer)? {
            // the runner is allowed to exit without reading the whole request
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
            res => res?,
        }
        let stdout = join(stdout)??;
        let stderr = join(stderr)??;
        trace!("Runner output: {}", String::from_utf8_lossy(&stdout));
        if !status.success() {
            return Err(RunnerError::Exited {
                status,
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            });
        }
        Ok(stdout)
    }
}

/// Read the whole content of a pipe of the child in a separate thread.
fn spawn_reader<R: Read + Send + 'static>(
    name: &str,
    pipe: Option<R>,
) -> Result<JoinHandle<std::io::Result<Vec<u8>>>, RunnerError> {
    Ok(thread::Builder::new().name(name.into()).spawn(move || {
        let mut buffer = vec![];
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buffer)?;
        }
        Ok(buffer)
    })?)
}

/// Join a helper thread, turning its panic into an error.
fn join<T>(handle: JoinHandle<T>) -> Result<T, RunnerError> {
    let name = handle.thread().name().unwrap_or("runner helper").to_owned();
    handle
        .join()
        .map_err(|_| std::io::Error::new(ErrorKind::Other, format!("{name} thread panicked")).into())
}
