//! User notification capability: LED colour, buzzer and button feedback.
//!
//! The call logic never touches hardware. It hands an [`Alert`] to whatever
//! implements [`Notifier`]; the firmware drives GPIO, tests use
//! [`MockNotifier`] and inspect what would have happened.

/// An RGB LED colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// LED off
    pub const BLACK: Color = Color::new(0, 0, 0);
    /// Entry-door and switchboard calls
    pub const RED: Color = Color::new(255, 0, 0);
    /// Start-up self test
    pub const GREEN: Color = Color::new(0, 255, 0);
    /// Floor-door calls
    pub const BLUE: Color = Color::new(0, 0, 255);
    /// Idle colour while silent mode is on
    pub const SILENT: Color = Color::new(60, 0, 20);

    /// Create a colour from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Colour the LED rests on between alerts.
pub const fn idle_color(silent: bool) -> Color {
    if silent {
        Color::SILENT
    } else {
        Color::BLACK
    }
}

/// A user-visible alert. The visual part always happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alert {
    /// Colour to flash
    pub color: Color,
    /// Whether the buzzer sounds as well
    pub audible: bool,
}

impl Alert {
    /// Alert in `color`, audible unless `silent`
    pub const fn new(color: Color, silent: bool) -> Self {
        Self {
            color,
            audible: !silent,
        }
    }
}

/// Output side of the bridge.
///
/// Implementations may take their time (a flash lasts half a second on the
/// board); the control loop awaits each call before handling the next event.
#[allow(async_fn_in_trait, reason = "single-threaded executors only")]
pub trait Notifier {
    /// Show an alert, then return the LED to its idle colour.
    async fn alert(&mut self, alert: Alert);

    /// Change the colour the LED rests on.
    async fn set_idle_display(&mut self, color: Color);

    /// Short acknowledgement of a button tap.
    async fn button_feedback(&mut self);
}

/// Something a [`MockNotifier`] was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyEvent {
    /// `alert` was called
    Alert(Alert),
    /// `set_idle_display` was called
    Idle(Color),
    /// `button_feedback` was called
    ButtonFeedback,
}

/// Maximum number of events a [`MockNotifier`] records.
pub const MOCK_NOTIFIER_CAPACITY: usize = 64;

/// Notifier that records every request, for tests.
#[derive(Debug, Default)]
pub struct MockNotifier {
    events: heapless::Vec<NotifyEvent, MOCK_NOTIFIER_CAPACITY>,
}

impl MockNotifier {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first
    pub fn events(&self) -> &[NotifyEvent] {
        &self.events
    }

    /// Only the alerts, oldest first
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.events.iter().filter_map(|event| match event {
            NotifyEvent::Alert(alert) => Some(alert),
            _ => None,
        })
    }

    /// The most recent idle colour, if any was set
    pub fn idle_display(&self) -> Option<Color> {
        self.events.iter().rev().find_map(|event| match event {
            NotifyEvent::Idle(color) => Some(*color),
            _ => None,
        })
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn record(&mut self, event: NotifyEvent) {
        // Full recorder: keep the first events, which is what tests assert on
        let _ = self.events.push(event);
    }
}

impl Notifier for MockNotifier {
    async fn alert(&mut self, alert: Alert) {
        self.record(NotifyEvent::Alert(alert));
    }

    async fn set_idle_display(&mut self, color: Color) {
        self.record(NotifyEvent::Idle(color));
    }

    async fn button_feedback(&mut self) {
        self.record(NotifyEvent::ButtonFeedback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_audible_unless_silent() {
        assert!(Alert::new(Color::RED, false).audible);
        assert!(!Alert::new(Color::RED, true).audible);
    }

    #[test]
    fn test_idle_color() {
        assert_eq!(idle_color(true), Color::new(60, 0, 20));
        assert_eq!(idle_color(false), Color::BLACK);
    }

    #[tokio::test]
    async fn test_mock_records_in_order() {
        let mut notifier = MockNotifier::new();
        notifier.alert(Alert::new(Color::BLUE, false)).await;
        notifier.set_idle_display(Color::SILENT).await;
        notifier.button_feedback().await;

        assert_eq!(
            notifier.events(),
            &[
                NotifyEvent::Alert(Alert::new(Color::BLUE, false)),
                NotifyEvent::Idle(Color::SILENT),
                NotifyEvent::ButtonFeedback,
            ]
        );
        assert_eq!(notifier.alerts().count(), 1);
        assert_eq!(notifier.idle_display(), Some(Color::SILENT));

        notifier.clear();
        assert!(notifier.events().is_empty());
    }
}
