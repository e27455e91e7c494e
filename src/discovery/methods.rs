//! Discovery methods implementation - ICMP echo via the system ping

use super::*;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

/// Extra time granted to the ping process on top of its own wait limit
pub const PROCESS_GRACE: Duration = Duration::from_secs(1);

/// ICMP echo discovery.
///
/// Uses the system `ping` binary so no raw-socket privileges are needed.
/// One echo request per call, no retries.
#[derive(Debug, Clone)]
pub struct IcmpEchoProber {
    timeout: Duration,
    program: String,
}

impl Default for IcmpEchoProber {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl IcmpEchoProber {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            program: "ping".to_string(),
        }
    }

    /// Use a different ping executable (full path or name on `PATH`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Platform-specific arguments for a single echo request
    fn ping_args(&self, target: IpAddr) -> Vec<String> {
        let millis = self.timeout.as_millis().max(1);

        let mut args = if cfg!(windows) {
            vec!["-n".to_string(), "1".to_string(), "-w".to_string(), millis.to_string()]
        } else if cfg!(target_os = "macos") {
            vec!["-c".to_string(), "1".to_string(), "-W".to_string(), millis.to_string()]
        } else {
            // iputils takes whole seconds
            let secs = ((millis + 999) / 1000).max(1);
            vec!["-c".to_string(), "1".to_string(), "-W".to_string(), secs.to_string()]
        };

        if target.is_ipv6() && !cfg!(windows) {
            args.insert(0, "-6".to_string());
        }

        args.push(target.to_string());
        args
    }

    async fn ping_host(&self, target: IpAddr) -> std::io::Result<bool> {
        let mut child = Command::new(&self.program)
            .args(self.ping_args(target))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        match timeout(self.timeout + PROCESS_GRACE, child.wait()).await {
            Ok(status) => Ok(status?.success()),
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("{} did not exit in time", self.program),
            )),
        }
    }
}

#[async_trait::async_trait]
impl HostProber for IcmpEchoProber {
    async fn probe(&self, address: IpAddr) -> HostResult {
        let start_time = Instant::now();

        match self.ping_host(address).await {
            Ok(true) => HostResult::reachable(address).with_response_time(start_time.elapsed()),
            Ok(false) => HostResult::unreachable(address),
            Err(e) => {
                log::debug!("Probe of {} failed: {}", address, e);
                HostResult::unreachable(address)
            }
        }
    }

    fn method_name(&self) -> &str {
        "icmp-echo"
    }
}
