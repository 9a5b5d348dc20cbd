use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use cursive::{views::Dialog, CbSink, Cursive};
use log::{error, info, LevelFilter};

use chip_8_vm::chip::{
    chip8::{constants::CHIP8_KEY_COUNT, cursive_display::Display, Chip8},
    Chip, ChipWithCursiveDisplay, ExecutionState, LoadProgramError,
};

/// The amount by which the instruction clock changes per speed key press.
const IPS_STEP: u32 = 60;

/// The most instructions executed in one pass of the event loop when it fell behind.
const MAX_CATCH_UP: u32 = 32;

/// Runs a CHIP-8 program in the terminal.
///
/// Keypad:  1 2 3 4 / q w e r / a s d f / z x c v
/// Space releases all keys, Up/Down change the speed, Esc quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the program to run.
    program: PathBuf,

    /// Instructions per second.
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(1..))]
    ips: u32,

    /// Seed for the random number instruction, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// How long a key counts as pressed after the terminal reported it.
    #[arg(long, default_value_t = 150)]
    key_hold_ms: u64,

    /// Write log output to this file. Without it nothing is logged.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Error type for errors that occur during setting up the emulator.
enum Error {
    InvalidLogFile(std::io::Error),
    InvalidProgram(LoadProgramError),
}

/// Represents an event to be processed by the event loop. It is generic
/// over the type representing the pressed key.
enum Event<T> {
    /// Occurs when the key passed in the enum value was pressed.
    Key(T),

    /// Indicates that all keys are released. Terminals do not report key
    /// releases, so keys are released after a timeout or when this is sent.
    KeyRelease,

    /// Increases the instruction clock.
    SpeedUp,

    /// Decreases the instruction clock.
    SlowDown,

    /// Shut down.
    Quit,
}

/// Represents the channels available to the event loop. It is generic
/// over the type representing the pressed keys.
#[derive(Clone)]
struct EventLoopChannels<T> {
    /// The channel to send the UI refresh messages to.
    gfx_sender: CbSink,

    /// The channel on which the Events are received.
    key_receiver: Receiver<Event<T>>,

    /// A channel to report that the thread has completed
    /// shutdown.
    shutdown_sender: Sender<()>,
}

/// Timing of the event loop.
struct Clock {
    ips: u32,
    key_hold: Duration,
}

impl Clock {
    fn period(&self) -> Duration {
        Duration::from_secs(1) / self.ips
    }
}

/// The event loop. Constantly loops over (1) process pending events. (2) Release
/// keys held for longer than the hold time. (3) Poll the timers. (4) Run the
/// instructions that are due at the current clock. (5) Update the UI. (6) Sleep
/// until the next instruction is due. (7) Start over.
fn event_loop<T>(mut chip: T, io_channels: EventLoopChannels<u8>, mut clock: Clock)
where
    T: Chip<PinAddress = u8, MemoryAddress = u16> + ChipWithCursiveDisplay,
{
    let mut pressed_at: [Option<Instant>; CHIP8_KEY_COUNT] = [None; CHIP8_KEY_COUNT];
    let mut next_cycle = Instant::now();
    let mut halted = false;

    loop {
        while let Ok(event) = io_channels.key_receiver.try_recv() {
            match event {
                Event::Key(key) => {
                    chip.press_key(key);
                    if let Some(pressed) = pressed_at.get_mut(key as usize) {
                        *pressed = Some(Instant::now());
                    }
                }
                Event::KeyRelease => {
                    chip.reset_input_pins();
                    pressed_at = [None; CHIP8_KEY_COUNT];
                }
                Event::Quit => {
                    if io_channels.shutdown_sender.send(()).is_err() {
                        error!("Failed to orderly shutdown");
                    }
                    return;
                }
                Event::SpeedUp => {
                    clock.ips += IPS_STEP;
                    info!("Running at {} instructions per second", clock.ips);
                }
                Event::SlowDown => {
                    if clock.ips > IPS_STEP {
                        clock.ips -= IPS_STEP;
                    }
                    info!("Running at {} instructions per second", clock.ips);
                }
            }
        }

        let now = Instant::now();
        for (key, pressed) in pressed_at.iter_mut().enumerate() {
            if let Some(at) = *pressed {
                if now.saturating_duration_since(at) >= clock.key_hold {
                    chip.release_key(key as u8);
                    *pressed = None;
                }
            }
        }

        chip.update_timers(now);

        if !halted {
            let mut executed = 0;
            while next_cycle <= now && executed < MAX_CATCH_UP {
                if let Err(e) = chip.cycle() {
                    error!("Execution halted: {}", e);
                    halted = true;
                    break;
                }
                next_cycle += clock.period();
                executed += 1;
            }
            // Drop the backlog instead of racing to catch up after a stall.
            if next_cycle < now {
                next_cycle = now;
            }
        }

        if !chip.update_ui(&io_channels.gfx_sender) {
            return;
        }

        if halted {
            let message = chip_halted_message(&chip);
            let sent = io_channels
                .gfx_sender
                .send(Box::new(move |s: &mut Cursive| {
                    s.add_layer(
                        Dialog::text(message)
                            .title("Execution halted")
                            .button("Quit", |s| s.quit()),
                    );
                }));
            if sent.is_err() {
                return;
            }
            wait_for_quit(&io_channels);
            return;
        }

        let sleep = next_cycle
            .saturating_duration_since(Instant::now())
            .min(Duration::from_millis(1));
        std::thread::sleep(sleep);
    }
}

fn chip_halted_message<T: Chip>(chip: &T) -> String {
    match chip.execution_state() {
        ExecutionState::Faulted(e) => format!("{}", e),
        state => format!("{:?}", state),
    }
}

/// Blocks until the UI asks for shutdown, then completes the handshake.
fn wait_for_quit<T>(io_channels: &EventLoopChannels<T>) {
    for event in io_channels.key_receiver.iter() {
        if let Event::Quit = event {
            let _ = io_channels.shutdown_sender.send(());
            return;
        }
    }
}

/// The terminal belongs to the UI, so log output is only written when it can go
/// to a file. The level then comes from `RUST_LOG`.
fn logger(log_file: Option<&PathBuf>) -> Result<env_logger::Builder, Error> {
    let mut builder = env_logger::Builder::new();
    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(Error::InvalidLogFile)?;
            builder
                .parse_default_env()
                .target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(LevelFilter::Off);
        }
    }
    Ok(builder)
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<(), Error> {
    logger(log_file)?.init();
    Ok(())
}

/// Constructs the UI and spawns the event loop and the UI thread.
fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.log_file.as_ref()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let mut chip8 = match args.seed {
        Some(seed) => Chip8::with_seed(seed),
        None => Chip8::new(),
    };

    if let Err(e) = chip8.load_program(&args.program).map_err(Error::InvalidProgram) {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
    info!(
        "Starting {} at {} instructions per second",
        args.program.display(),
        args.ips
    );

    let mut siv = cursive::crossterm();

    let cb_sink = siv.cb_sink().clone();
    let (key_sender, key_receiver) = bounded::<Event<u8>>(10);
    let (shutdown_sender, shutdown_receiver) = bounded::<()>(1);
    let clock = Clock {
        ips: args.ips,
        key_hold: Duration::from_millis(args.key_hold_ms),
    };

    std::thread::spawn(move || {
        event_loop(
            chip8,
            EventLoopChannels {
                gfx_sender: cb_sink,
                key_receiver,
                shutdown_sender,
            },
            clock,
        );
    });

    let sender = key_sender.clone();
    siv.add_global_callback(cursive::event::Key::Esc, move |s| {
        if sender.send(Event::Quit).is_ok() && shutdown_receiver.recv().is_err() {
            error!("Orderly shutdown failed");
        }
        s.quit();
    });

    for (i, j) in &[
        ('1', 0x1),
        ('2', 0x2),
        ('3', 0x3),
        ('4', 0xC),
        ('q', 0x4),
        ('w', 0x5),
        ('e', 0x6),
        ('r', 0xD),
        ('a', 0x7),
        ('s', 0x8),
        ('d', 0x9),
        ('f', 0xE),
        ('z', 0xA),
        ('x', 0x0),
        ('c', 0xB),
        ('v', 0xF),
    ] {
        let sender = key_sender.clone();
        let key = *j as u8;
        siv.add_global_callback(*i, move |_s| {
            let _ = sender.send(Event::Key(key));
        });
    }

    let sender = key_sender.clone();
    siv.add_global_callback(' ', move |_s| {
        let _ = sender.send(Event::KeyRelease);
    });

    let sender = key_sender.clone();
    siv.add_global_callback(cursive::event::Key::Up, move |_s| {
        let _ = sender.send(Event::SpeedUp);
    });

    let sender = key_sender;
    siv.add_global_callback(cursive::event::Key::Down, move |_s| {
        let _ = sender.send(Event::SlowDown);
    });

    siv.add_layer(Display::default());

    siv.run();
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidLogFile(error) => write!(f, "Could not open log file: {}", error),
            Error::InvalidProgram(error) => write!(f, "{}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_log_output_without_log_file() {
        match logger(None) {
            Ok(mut builder) => assert_eq!(builder.build().filter(), LevelFilter::Off),
            Err(e) => panic!("{}", e),
        }
    }

    #[test]
    fn test_log_file_is_created() {
        let path = std::env::temp_dir().join(format!("chip-8-vm-{}.log", std::process::id()));
        if let Err(e) = logger(Some(&path)) {
            panic!("{}", e);
        }
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_log_file() {
        let path = std::env::temp_dir().join("no-such-dir").join("chip-8-vm.log");
        assert!(matches!(logger(Some(&path)), Err(Error::InvalidLogFile(_))));
    }
}
