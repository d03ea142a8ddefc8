use std::env;
use std::net::TcpStream;
use std::time::Duration;

use inquire::Text;
use rigol_dp932a::{
    client::ScpiClient,
    dp932a::Dp932a,
    types::{CommonAnalysis, CommonAnalysisType, Output},
};

// Configuration constants - adjust these for your setup
const SCPI_PORT: u16 = 5555;
// Analyzer commands can take a while to be acknowledged, a reasonably large time out is required.
const SOCKET_TIMEOUT_MS: u64 = 2000;
const OUTPUT: Output = Output::new(5.0, 0.1);
const OCP_LEVEL_A: f64 = 0.15;
const STABILIZATION_DELAY_MS: u64 = 1000;

pub struct StreamWrapper(TcpStream);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::ConnectionRefused => embedded_io::ErrorKind::ConnectionRefused,
            std::io::ErrorKind::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
            std::io::ErrorKind::ConnectionAborted => embedded_io::ErrorKind::ConnectionAborted,
            std::io::ErrorKind::NotConnected => embedded_io::ErrorKind::NotConnected,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                embedded_io::ErrorKind::TimedOut
            }
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for StreamWrapper {
    type Error = IoError;
}

impl embedded_io::Read for StreamWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for StreamWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

fn main() {
    env_logger::init();

    // Get instrument host from command line arg or interactive prompt
    let host = env::args().nth(1).unwrap_or_else(|| {
        Text::new("Instrument host or IP address:")
            .prompt()
            .expect("Failed to read host")
    });

    println!("Connecting to {}:{}", host, SCPI_PORT);

    let stream = TcpStream::connect((host.as_str(), SCPI_PORT)).expect("Failed to connect");
    let timeout = Some(Duration::from_millis(SOCKET_TIMEOUT_MS));
    stream.set_read_timeout(timeout).unwrap();
    stream.set_write_timeout(timeout).unwrap();

    let psu = Dp932a::new(ScpiClient::<_, 256>::new(StreamWrapper(stream)));
    println!("Connected to: {:?}", psu.identification());

    // Make the right instrument on the bench stand out.
    psu.attention_sequence().unwrap();

    for channel in psu.channels() {
        println!("{}", channel.summary().unwrap());
    }

    // Power CH1 with over-current protection armed, and probe it while it is on.
    let measurement = psu
        .ch1()
        .run_active(OUTPUT, |ch| {
            ch.ocp().run_protected(OCP_LEVEL_A, |ocp| {
                std::thread::sleep(Duration::from_millis(STABILIZATION_DELAY_MS));
                if ocp.is_tripped()? {
                    println!("Over-current protection tripped!");
                }
                ch.probe()
            })
        })
        .unwrap();
    println!("Measured while active: {:#?}", measurement);
    println!("Output mode afterwards: {:?}", psu.ch1().get_output_mode().unwrap());

    // Log CH1 voltage and CH2 current with the analyzer for a few seconds.
    let config = CommonAnalysis {
        ch1: Some(CommonAnalysisType::Voltage),
        ch2: Some(CommonAnalysisType::Current),
        ch3: None,
    };
    psu.analyzer()
        .run_session(config, true, |analyzer| {
            println!("Logging to {}", analyzer.get_log_path()?);
            std::thread::sleep(Duration::from_secs(3));
            Ok(())
        })
        .unwrap();
    println!("Analyzer configuration: {:#?}", psu.analyzer().get_common_measure().unwrap());

    // Closes the socket.
    drop(psu.into_transport().unwrap().into_inner());
}
