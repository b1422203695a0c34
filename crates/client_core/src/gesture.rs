//! Pointer and touch input normalized into one horizontal drag stream.
//!
//! Both input sources go through [`GestureInput`], so the tracker only ever
//! sees press / drag / release signals carrying an x coordinate.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSignal {
    Press(f64),
    Drag(f64),
    Release,
}

pub trait GestureInput {
    fn source(&self) -> InputSource;
    /// `None` when the raw event carries nothing usable (e.g. a touch event
    /// with an empty touch list).
    fn signal(&self) -> Option<GestureSignal>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64 },
    Move { x: f64 },
    Up,
    /// Pointer left the card; ends the drag like a release.
    Leave,
}

impl GestureInput for PointerEvent {
    fn source(&self) -> InputSource {
        InputSource::Pointer
    }

    fn signal(&self) -> Option<GestureSignal> {
        Some(match *self {
            Self::Down { x } => GestureSignal::Press(x),
            Self::Move { x } => GestureSignal::Drag(x),
            Self::Up | Self::Leave => GestureSignal::Release,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    Start { touches: Vec<TouchPoint> },
    Move { touches: Vec<TouchPoint> },
    End,
}

impl GestureInput for TouchEvent {
    fn source(&self) -> InputSource {
        InputSource::Touch
    }

    fn signal(&self) -> Option<GestureSignal> {
        match self {
            Self::Start { touches } => touches.first().map(|t| GestureSignal::Press(t.x)),
            Self::Move { touches } => touches.first().map(|t| GestureSignal::Drag(t.x)),
            Self::End => Some(GestureSignal::Release),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Touch(TouchEvent),
}

impl GestureInput for InputEvent {
    fn source(&self) -> InputSource {
        match self {
            Self::Pointer(event) => event.source(),
            Self::Touch(event) => event.source(),
        }
    }

    fn signal(&self) -> Option<GestureSignal> {
        match self {
            Self::Pointer(event) => event.signal(),
            Self::Touch(event) => event.signal(),
        }
    }
}

impl From<PointerEvent> for InputEvent {
    fn from(value: PointerEvent) -> Self {
        Self::Pointer(value)
    }
}

impl From<TouchEvent> for InputEvent {
    fn from(value: TouchEvent) -> Self {
        Self::Touch(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Leaning {
    #[default]
    Neutral,
    Left,
    Right,
}

impl Leaning {
    pub fn from_delta(delta: f64, deadzone: f64) -> Self {
        if delta < -deadzone {
            Self::Left
        } else if delta > deadzone {
            Self::Right
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub origin_x: f64,
    pub delta_x: f64,
    pub source: InputSource,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerOutput {
    Ignored,
    Started,
    Moved { delta: f64, leaning: Leaning },
    Released { delta: f64 },
}

#[derive(Debug, Clone)]
pub struct GestureTracker {
    deadzone: f64,
    active: Option<GestureState>,
    leaning: Leaning,
}

impl GestureTracker {
    pub fn new(deadzone: f64) -> Self {
        Self {
            deadzone,
            active: None,
            leaning: Leaning::Neutral,
        }
    }

    pub fn leaning(&self) -> Leaning {
        self.leaning
    }

    pub fn active(&self) -> Option<&GestureState> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Feeds one raw event. `locked` is the animation lock: while it is held
    /// nothing is accepted.
    pub fn feed(&mut self, input: &impl GestureInput, locked: bool) -> TrackerOutput {
        if locked {
            return TrackerOutput::Ignored;
        }
        let Some(signal) = input.signal() else {
            return TrackerOutput::Ignored;
        };
        let source = input.source();

        match signal {
            GestureSignal::Press(x) => {
                if self.active.is_some() {
                    return TrackerOutput::Ignored;
                }
                self.active = Some(GestureState {
                    origin_x: x,
                    delta_x: 0.0,
                    source,
                });
                self.leaning = Leaning::Neutral;
                TrackerOutput::Started
            }
            GestureSignal::Drag(x) => {
                let Some(state) = self.active.as_mut().filter(|s| s.source == source) else {
                    return TrackerOutput::Ignored;
                };
                state.delta_x = x - state.origin_x;
                self.leaning = Leaning::from_delta(state.delta_x, self.deadzone);
                TrackerOutput::Moved {
                    delta: state.delta_x,
                    leaning: self.leaning,
                }
            }
            GestureSignal::Release => {
                match self.active {
                    Some(state) if state.source == source => {
                        self.reset();
                        TrackerOutput::Released {
                            delta: state.delta_x,
                        }
                    }
                    _ => TrackerOutput::Ignored,
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.leaning = Leaning::Neutral;
    }
}
