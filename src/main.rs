#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, RM2_CLOCK_DIVIDER};
use defmt::unwrap;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{Config, IpAddress, IpEndpoint, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{DMA_CH0, PIO0, UART0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_time::{Duration, Timer};
use panic_persist as _;
use static_cell::StaticCell;

use simplebus_bridge::bus_log;
use simplebus_bridge::notify::{Alert, Color, Notifier};
use simplebus_bridge::protocol::{Message, BUS_BAUD_RATE};
use simplebus_bridge::time::EmbassyClock;
use simplebus_bridge::utility::{get_remote_peer_ip, get_remote_port, get_ssid, get_wifi_password, parse_ip};
use simplebus_bridge::{Bridge, BridgeConfig, SerialBusTransport};

// The firmware has no heap; JSON rendering needs one
#[cfg(feature = "json")]
compile_error!("the firmware has no global allocator: build it without the `json` feature");

#[cfg(feature = "usb-logger")]
use embassy_rp::peripherals::USB;
#[cfg(feature = "usb-logger")]
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"SimpleBus-Bridge"),
    embassy_rp::binary_info::rp_program_description!(
        c"SimpleBus intercom bridge for Raspberry Pico 2 W"
    ),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

// Interrupt handlers
bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

#[cfg(feature = "usb-logger")]
bind_interrupts!(struct UsbIrqs {
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
});

/// Durata del lampeggio di un avviso
const ALERT_FLASH: Duration = Duration::from_millis(500);

/// Durata del feedback sul pulsante
const BUTTON_FLASH: Duration = Duration::from_millis(100);

/// Intervallo di campionamento del pulsante.
///
/// Must stay above `FRAME_GAP_TIMEOUT`, otherwise the tick always cancels the
/// bus read before a partial frame can time out.
const BUTTON_SAMPLE: Duration = Duration::from_millis(20);

/// LED RGB e buzzer collegati a GPIO semplici.
///
/// Senza PWM un canale è acceso se il suo valore è diverso da zero.
struct GpioNotifier<'d> {
    red: Output<'d>,
    green: Output<'d>,
    blue: Output<'d>,
    buzzer: Output<'d>,
    idle: Color,
}

impl GpioNotifier<'_> {
    fn show(&mut self, color: Color) {
        let on = |channel: u8| if channel > 0 { Level::High } else { Level::Low };
        self.red.set_level(on(color.r));
        self.green.set_level(on(color.g));
        self.blue.set_level(on(color.b));
    }
}

impl Notifier for GpioNotifier<'_> {
    async fn alert(&mut self, alert: Alert) {
        self.show(alert.color);
        if alert.audible {
            self.buzzer.set_high();
        }
        Timer::after(ALERT_FLASH).await;
        self.buzzer.set_low();
        self.show(self.idle);
    }

    async fn set_idle_display(&mut self, color: Color) {
        self.idle = color;
        self.show(color);
    }

    async fn button_feedback(&mut self) {
        self.show(Color::GREEN);
        Timer::after(BUTTON_FLASH).await;
        self.show(self.idle);
    }
}

/// Entry point principale secondo Embassy
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // Parte il logger su USB
    #[cfg(feature = "usb-logger")]
    {
        let driver = Driver::new(p.USB, UsbIrqs);
        spawner.must_spawn(logger_task(driver));
    }

    if let Some(panic_message) = panic_persist::get_panic_message_utf8() {
        bus_log!(error, "Previous run panicked: {}", panic_message);
    }

    // Firmware files for the CYW43xxx WiFi chip
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        RM2_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;

    spawner.must_spawn(cyw43_task(runner));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    // Configure network stack with DHCP
    let config = Config::dhcpv4(Default::default());
    let seed: u64 = RoscRng.next_u64();

    static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        config,
        RESOURCES.init(StackResources::new()),
        seed,
    );

    unwrap!(spawner.spawn(net_task(runner)));

    let wifi_ssid = get_ssid();
    bus_log!(info, "Connecting to WiFi network: {}", wifi_ssid);

    loop {
        match control
            .join(wifi_ssid, cyw43::JoinOptions::new(get_wifi_password().as_bytes()))
            .await
        {
            Ok(()) => {
                bus_log!(info, "WiFi connected");
                break;
            }
            Err(e) => {
                bus_log!(error, "WiFi connection failed: status={}, retrying in 5s", e.status);
            }
        }
        Timer::after(Duration::from_secs(5)).await;
    }

    bus_log!(info, "Waiting for DHCP...");
    while !stack.is_config_up() {
        Timer::after_millis(100).await;
    }

    // Remote command channel
    let port = get_remote_port();
    let [a, b, c, d] = parse_ip(get_remote_peer_ip()).unwrap_or([192, 168, 1, 50]);
    let peer = IpEndpoint::new(IpAddress::v4(a, b, c, d), port);

    static RX_META: StaticCell<[PacketMetadata; 4]> = StaticCell::new();
    static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
    static TX_META: StaticCell<[PacketMetadata; 4]> = StaticCell::new();
    static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
    let mut socket = UdpSocket::new(
        stack,
        RX_META.init([PacketMetadata::EMPTY; 4]),
        RX_BUF.init([0; 512]),
        TX_META.init([PacketMetadata::EMPTY; 4]),
        TX_BUF.init([0; 512]),
    );
    if let Err(e) = socket.bind(port) {
        bus_log!(error, "UDP bind on {} failed: {:?}", port, e);
    }

    // SimpleBus line, 4800 8N1
    static UART_TX: StaticCell<[u8; 32]> = StaticCell::new();
    static UART_RX: StaticCell<[u8; 64]> = StaticCell::new();
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BUS_BAUD_RATE;
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        UART_TX.init([0; 32]),
        UART_RX.init([0; 64]),
        uart_config,
    );

    let notifier = GpioNotifier {
        red: Output::new(p.PIN_16, Level::Low),
        green: Output::new(p.PIN_17, Level::Low),
        blue: Output::new(p.PIN_18, Level::Low),
        buzzer: Output::new(p.PIN_19, Level::Low),
        idle: Color::BLACK,
    };
    let button = Input::new(p.PIN_15, Pull::Up);

    let bridge_config = BridgeConfig::from_build_config().unwrap_or_else(|e| {
        bus_log!(error, "Invalid configuration, using defaults: {}", e);
        BridgeConfig::default()
    });

    let mut bridge = Bridge::new(
        &bridge_config,
        SerialBusTransport::new(uart, EmbassyClock),
        notifier,
        EmbassyClock,
    );
    bridge.self_test().await;

    bus_log!(info, "SimpleBus bridge ready, unit address {}", bridge_config.address);

    let mut button_down = false;
    let mut payload = [0u8; 128];

    loop {
        // Handlers run outside the select so a settle delay is never cut short
        let event = select3(
            bridge.next_frame(),
            socket.recv_from(&mut payload),
            Timer::after(BUTTON_SAMPLE),
        )
        .await;

        match event {
            Either3::First(Ok(frame)) => match bridge.handle_frame(&frame).await {
                Ok(Some(message)) => forward(&socket, peer, &message).await,
                Ok(None) => {}
                Err(e) => bus_log!(error, "Automatic reopen failed: {}", e),
            },
            Either3::First(Err(e)) => {
                bus_log!(error, "Bus read failed: {}", e);
                Timer::after(BUTTON_SAMPLE).await;
            }
            Either3::Second(Ok((n, _meta))) => {
                // Rejections are already logged by the bridge
                let _ = bridge.remote_command(&payload[..n]).await;
            }
            Either3::Second(Err(e)) => bus_log!(warn, "UDP receive failed: {:?}", e),
            Either3::Third(()) => {}
        }

        let pressed = button.is_low();
        let result = match (button_down, pressed) {
            (false, true) => {
                bridge.button_pressed();
                Ok(())
            }
            (true, true) => bridge.button_held().await,
            (true, false) => bridge.button_released().await,
            (false, false) => Ok(()),
        };
        button_down = pressed;
        if let Err(e) = result {
            bus_log!(error, "Button action failed: {}", e);
        }
    }
}

/// Forward an observed bus message to the remote peer as `[code, address]`.
async fn forward(socket: &UdpSocket<'_>, peer: IpEndpoint, message: &Message) {
    if let Err(e) = socket.send_to(&[message.code, message.address], peer).await {
        bus_log!(warn, "Forwarding {} failed: {:?}", message, e);
    }
}

#[embassy_executor::task]
async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

#[cfg(feature = "usb-logger")]
#[embassy_executor::task]
async fn logger_task(driver: Driver<'static, USB>) {
    embassy_usb_logger::run!(1024, log::LevelFilter::Info, driver);
}
