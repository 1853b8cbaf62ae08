//! Ultrasonic ranger (trigger/echo) for the Cutebot.
//!
//! One measurement drives the trigger high for the configured pulse, opens a
//! capture session on the echo line and waits a bounded number of polls for
//! the echo width. Timeouts, empty captures and lost echoes with no cached
//! reading are retried as whole measurements. A lost echo with a cached
//! reading returns the cached value, as does running out of attempts.

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::utils::{
    config::CutebotConfig,
    error::{DriverError, Result},
    math::distance::{in_range, ticks_to_cm, Unit},
    sensors::capture::{micros_u32, retry, Attempt, CancelToken, CaptureSession, PollBudget, PulseCapture},
};

/// Trigger/echo ranger with a cache of the last accepted reading.
pub struct Ultrasonic<T, E> {
    trigger: T,
    echo: E,
    /// Last accepted reading in centimetres.
    last_cm: Option<f32>,
}

impl<T, E> Ultrasonic<T, E>
where
    T: OutputPin,
    E: PulseCapture,
{
    pub fn new(
        trigger: T,
        echo: E,
    ) -> Self {
        Self {
            trigger,
            echo,
            last_cm: None,
        }
    }

    /// Last accepted reading in centimetres, if any.
    pub fn last_cm(&self) -> Option<f32> {
        self.last_cm
    }

    /// Measure the distance ahead in `unit`.
    pub fn measure<D: DelayNs>(
        &mut self,
        unit: Unit,
        config: &CutebotConfig,
        delay: &mut D,
        cancel: Option<&CancelToken>,
    ) -> Result<f32> {
        let budget = PollBudget {
            limit: config.echo_poll_limit,
            interval: config.echo_poll_interval,
        };
        let pulse_us = micros_u32(config.trigger_pulse);

        let measured = retry::<f32>("distance", config.distance_attempts, |_| {
            if let Err(e) = self.fire_trigger(pulse_us, delay) {
                return Attempt::Abort(e);
            }
            let ticks = {
                let mut session = CaptureSession::start(&mut self.echo);
                if let Err(e) = session.wait_for(1, budget, delay, cancel) {
                    return Attempt::from(e);
                }
                session.pop_front()
            };
            let Some(ticks) = ticks else {
                return Attempt::Retry;
            };

            let cm = ticks_to_cm(ticks);
            if in_range(cm) {
                return Attempt::Done(cm);
            }
            match self.last_cm {
                Some(cached) => {
                    tracing::warn!("echo lost ({} cm), using cached {} cm", cm, cached);
                    Attempt::Done(cached)
                }
                None => Attempt::Retry,
            }
        });
        let cm = match (measured, self.last_cm) {
            (Err(DriverError::RetriesExhausted), Some(cached)) => {
                tracing::warn!("no echo, using cached {} cm", cached);
                cached
            }
            (result, _) => result?,
        };

        self.last_cm = Some(cm);
        Ok(unit.from_cm(cm))
    }

    fn fire_trigger<D: DelayNs>(
        &mut self,
        pulse_us: u32,
        delay: &mut D,
    ) -> Result<()> {
        self.trigger.set_high().map_err(DriverError::pin)?;
        delay.delay_us(pulse_us);
        self.trigger.set_low().map_err(DriverError::pin)
    }
}
