use clap::{Parser, ValueEnum};
use core::cell::RefCell;
use cutebot_core::utils::controllers::{Reading, SystemCommand, COMMAND_CHANNEL};
use cutebot_core::utils::sensors::{ir::IrCodeTable, tracking::TrackingCodec};
use cutebot_core::utils::{Board, BoardPeripherals, BusPolicy, Cutebot, CutebotConfig, PulseCapture};
use embassy_executor::{Executor, Spawner};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{self, I2c, Operation, SevenBitAddress};
use embedded_hal_mock::eh1::delay::NoopDelay;
use smart_leds_trait::{SmartLedsWrite, RGB8};
use static_cell::StaticCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use tracing::{error, info};

#[derive(Clone, Copy, ValueEnum)]
enum Remote {
    A,
    B,
}

#[derive(Clone, Copy, ValueEnum)]
enum Codec {
    Numeric,
    Digits,
}

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// JSON commands, e.g. '{"ct":"b","bc":"speed","l":50,"r":50}'
    #[clap(required = true)]
    commands: Vec<String>,
    /// echo width in ticks returned by the simulated ultrasonic sensor
    #[clap(long, default_value_t = 1000)]
    echo_ticks: u16,
    /// left line sensor sees the line
    #[clap(long)]
    left_on: bool,
    /// right line sensor sees the line
    #[clap(long)]
    right_on: bool,
    /// remote control key pressed for IR reads
    #[clap(long, default_value_t = 11)]
    ir_key: u8,
    #[clap(long, value_enum, default_value = "a")]
    remote: Remote,
    #[clap(long, value_enum, default_value = "numeric")]
    codec: Codec,
    /// drop commands instead of failing when the bus is busy
    #[clap(long)]
    skip_busy: bool,
}

/// I2C bus that logs every frame written to it.
struct SimBus;

impl i2c::ErrorType for SimBus {
    type Error = Infallible;
}

impl I2c<SevenBitAddress> for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => info!("I2C 0x{:02X} <- {:02X?}", address, bytes),
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

/// Fixed-level input or logging output pin.
struct SimPin {
    name: &'static str,
    level: bool,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level)
    }
}

impl OutputPin for SimPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level = true;
        tracing::debug!("{} high", self.name);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level = false;
        tracing::debug!("{} low", self.name);
        Ok(())
    }
}

/// Capture channel that records the same pulse train on every resume.
struct SimCapture {
    train: Vec<u16>,
    recorded: VecDeque<u16>,
}

impl SimCapture {
    fn new(train: Vec<u16>) -> Self {
        Self {
            train,
            recorded: VecDeque::new(),
        }
    }
}

impl PulseCapture for SimCapture {
    fn resume(&mut self) {
        self.recorded.extend(self.train.iter().copied());
    }

    fn pause(&mut self) {}

    fn len(&self) -> usize {
        self.recorded.len()
    }

    fn pop_front(&mut self) -> Option<u16> {
        self.recorded.pop_front()
    }

    fn clear(&mut self) {
        self.recorded.clear();
    }

    fn deinit(&mut self) {}
}

/// LED driver that logs to console
struct SerialLedDriver;

impl SmartLedsWrite for SerialLedDriver {
    type Color = RGB8;
    type Error = Infallible;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        for c in iterator {
            let c: RGB8 = c.into();
            info!("LED: {:?}", c);
        }
        Ok(())
    }
}

struct SimBoard;

impl Board for SimBoard {
    type TrackLeft = SimPin;
    type TrackRight = SimPin;
    type Trigger = SimPin;
    type Echo = SimCapture;
    type Ir = SimCapture;
    type Delay = NoopDelay;
    type Pixels = SerialLedDriver;
}

/// Pulse train a remote sends for `frame`.
fn ir_train(frame: [u8; 4]) -> Vec<u16> {
    let mut out = vec![9000, 4500];
    for i in 0..32 {
        let bit = frame[i / 8] & (0x80 >> (i % 8)) != 0;
        out.push(560);
        out.push(if bit { 1690 } else { 560 });
    }
    out.push(560);
    out
}

#[embassy_executor::task]
async fn cutebot_task(mut bot: Cutebot<'static, SimBus, SimBoard>, count: usize) {
    for _ in 0..count {
        match bot.handle_next().await {
            Ok(Some(Reading::Distance(d))) => info!("Distance: {}", d),
            Ok(Some(Reading::Tracking(code))) => info!("Tracking: {}", code),
            Ok(Some(Reading::Key(key))) => info!("IR key: {}", key),
            Ok(None) => info!("Command executed successfully"),
            Err(e) => error!("Command failed: {}", e),
        }
    }
    std::process::exit(0);
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();

    let table = match opts.remote {
        Remote::A => IrCodeTable::TableA,
        Remote::B => IrCodeTable::TableB,
    };
    let codec = match opts.codec {
        Codec::Numeric => TrackingCodec::Numeric,
        Codec::Digits => TrackingCodec::Digits,
    };
    let policy = if opts.skip_busy { BusPolicy::Skip } else { BusPolicy::Fail };
    let config = CutebotConfig::new()
        .with_ir_table(table)
        .with_tracking_codec(codec)
        .with_bus_policy(policy);

    let Some(data) = table.code_for(opts.ir_key) else {
        error!("Key {} is not on the selected remote", opts.ir_key);
        std::process::exit(2);
    };

    let commands: Vec<SystemCommand> = match opts
        .commands
        .iter()
        .map(|c| serde_json::from_str(c))
        .collect()
    {
        Ok(commands) => commands,
        Err(e) => {
            error!("Invalid command: {}", e);
            std::process::exit(2);
        }
    };

    static I2C_BUS: StaticCell<RefCell<SimBus>> = StaticCell::new();
    let i2c_bus = I2C_BUS.init(RefCell::new(SimBus));

    let peripherals = BoardPeripherals::<SimBoard> {
        track_left: SimPin { name: "P13", level: opts.left_on },
        track_right: SimPin { name: "P14", level: opts.right_on },
        trigger: SimPin { name: "P8", level: false },
        echo: SimCapture::new(vec![opts.echo_ticks]),
        ir: SimCapture::new(ir_train([255, table.marker(), 0, data])),
        delay: NoopDelay::new(),
    };

    let mut bot = match Cutebot::new(i2c_bus, peripherals, config) {
        Ok(bot) => bot,
        Err(e) => {
            error!("Cutebot init failed: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = bot.init_pixels(SerialLedDriver, 1.0, true) {
        error!("Pixel init failed: {}", e);
    }

    spawner.spawn(cutebot_task(bot, commands.len())).unwrap();
    for command in commands {
        COMMAND_CHANNEL.send(command).await;
    }
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
