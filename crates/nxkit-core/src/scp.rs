// SCP over libssh2.
//
// Each call opens a fresh TCP connection and SSH session, authenticates with
// the same username and password used for NX-API, and closes the channel
// when the copy completes.

use std::fs::File;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use ssh2::Session;
use tracing::debug;

use crate::device::Device;
use crate::file_copy::{DEFAULT_SCP_PORT, ScpTransport};

/// SCP transport backed by the `ssh2` crate.
#[derive(Debug, Clone)]
pub struct Ssh2Scp {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    timeout: Duration,
}

impl Ssh2Scp {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SCP_PORT,
            username: username.into(),
            password,
            timeout: Duration::from_secs(30),
        }
    }

    /// Reuse the host, credentials and timeout a device already has.
    pub fn for_device(device: &Device) -> Self {
        let endpoint = device.endpoint();
        let creds = endpoint.credentials();
        Self {
            host: endpoint.host().to_owned(),
            port: DEFAULT_SCP_PORT,
            username: creds.username().to_owned(),
            password: creds.password().clone(),
            timeout: endpoint.timeout(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn connect(&self) -> io::Result<Session> {
        let tcp = TcpStream::connect((self.host.as_str(), self.port))?;
        tcp.set_read_timeout(Some(self.timeout))?;
        tcp.set_write_timeout(Some(self.timeout))?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.set_timeout(u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX));
        session.handshake()?;
        session.userauth_password(&self.username, self.password.expose_secret())?;
        debug!(host = %self.host, port = self.port, "SSH session established");
        Ok(session)
    }
}

impl ScpTransport for Ssh2Scp {
    fn put(&self, local: &Path, remote: &str) -> io::Result<()> {
        let mut file = File::open(local)?;
        let size = file.metadata()?.len();
        let session = self.connect()?;

        let mut channel = session.scp_send(Path::new(remote), 0o644, size, None)?;
        io::copy(&mut file, &mut channel)?;
        channel.flush()?;
        channel.send_eof()?;
        channel.wait_eof()?;
        channel.close()?;
        channel.wait_close()?;
        Ok(())
    }

    fn get(&self, remote: &str, local: &Path) -> io::Result<()> {
        let session = self.connect()?;
        let (mut channel, _stat) = session.scp_recv(Path::new(remote))?;

        let mut contents = Vec::new();
        channel.read_to_end(&mut contents)?;
        channel.send_eof()?;
        channel.wait_eof()?;
        channel.close()?;
        channel.wait_close()?;

        File::create(local)?.write_all(&contents)
    }
}
